use legacy_lens_core::render::render_tree;
use legacy_lens_core::tree::{DirectoryNode, FileContent, Node, TreeError, MAX_DEPTH};

fn text(s: &str) -> FileContent {
    FileContent::Text(s.to_string())
}

fn sample_tree() -> DirectoryNode {
    let mut root = DirectoryNode::root();
    root.insert_file("src/main.cbl", 120, text("PROCEDURE DIVISION.")).unwrap();
    root.insert_file("src/copy/CUST.cpy", 40, text("01 CUST.")).unwrap();
    root.insert_file("README.md", 10, text("# demo")).unwrap();
    root.insert_file("jcl/RUN.jcl", 30, text("//RUN JOB")).unwrap();
    root.insert_file("logo.png", 500, FileContent::NonText).unwrap();
    root
}

/// Looks a node up by its `/`-separated path below `dir`.
fn find<'a>(dir: &'a DirectoryNode, path: &str) -> Option<&'a Node> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.pop()?;
    let mut current = dir;
    for segment in segments {
        current = current.children.iter().find_map(|c| match c {
            Node::Directory(d) if d.name == segment => Some(d),
            _ => None,
        })?;
    }
    current.children.iter().find(|c| c.name() == last)
}

fn walk<'a>(dir: &'a DirectoryNode, out: &mut Vec<&'a Node>) {
    for child in &dir.children {
        out.push(child);
        if let Node::Directory(sub) = child {
            walk(sub, out);
        }
    }
}

#[test]
fn test_ensure_path_reuses_existing_directories() {
    let mut root = DirectoryNode::root();
    root.ensure_path(["a", "b"]).unwrap();
    root.ensure_path(["a", "", "b", "c"]).unwrap();
    root.insert_file("a/b/file.txt", 1, text("x")).unwrap();

    assert_eq!(root.children.len(), 1);
    let Some(Node::Directory(a)) = root.children.first() else {
        panic!("expected directory a");
    };
    assert_eq!(a.children.len(), 1);
    let Some(Node::Directory(b)) = find(a, "/b") else {
        panic!("expected directory b under a");
    };
    assert_eq!(b.path, "/a/b");
    assert_eq!(b.children.len(), 2, "c/ and file.txt");
}

#[test]
fn test_every_node_path_is_parent_path_plus_name() {
    let root = sample_tree();
    fn check(dir: &DirectoryNode) {
        for child in &dir.children {
            assert!(!child.name().is_empty());
            let expected = format!("{}/{}", dir.path.trim_end_matches('/'), child.name());
            assert_eq!(child.path(), expected);
            if let Node::Directory(sub) = child {
                check(sub);
            }
        }
    }
    check(&root);
    assert_eq!(root.path, "/");
    assert!(find(&root, "/README.md").is_some());
}

#[test]
fn test_duplicate_file_keeps_first_insertion() {
    let mut root = DirectoryNode::root();
    root.insert_file("a.txt", 1, text("first")).unwrap();
    root.insert_file("/a.txt", 2, text("second")).unwrap();

    assert_eq!(root.children.len(), 1);
    match find(&root, "/a.txt") {
        Some(Node::File(f)) => {
            assert_eq!(f.content, text("first"));
            assert_eq!(f.size, 1);
        }
        other => panic!("unexpected node {other:?}"),
    }
}

#[test]
fn test_file_and_directory_may_share_a_name() {
    let mut root = DirectoryNode::root();
    root.insert_file("build", 3, text("x")).unwrap();
    root.insert_file("build/out.txt", 3, text("y")).unwrap();
    assert_eq!(root.children.len(), 2);
}

#[test]
fn test_insert_rejects_empty_and_too_deep_paths() {
    let mut root = DirectoryNode::root();
    assert_eq!(
        root.insert_file("//", 0, FileContent::NonText),
        Err(TreeError::EmptyFileName {
            path: "//".to_string()
        })
    );

    let deep = vec!["d"; MAX_DEPTH + 1].join("/");
    assert!(matches!(
        root.insert_file(&deep, 1, text("x")),
        Err(TreeError::TooDeep { .. })
    ));
    assert!(matches!(
        root.ensure_path(vec!["d"; MAX_DEPTH + 1]),
        Err(TreeError::TooDeep { .. })
    ));
    assert!(root.children.is_empty(), "rejected paths leave no directories behind");

    assert!(root.ensure_path(vec!["d"; MAX_DEPTH]).is_ok());
}

#[test]
fn test_aggregate_counts_files_dirs_and_sizes() {
    let mut root = sample_tree();
    let stats = root.aggregate();

    assert_eq!(stats.file_count, 5);
    assert_eq!(stats.dir_count, 3, "src, src/copy, jcl");
    assert_eq!(stats.size, 120 + 40 + 10 + 30 + 500);

    match find(&root, "/src") {
        Some(Node::Directory(src)) => {
            assert_eq!(src.stats.file_count, 2);
            assert_eq!(src.stats.dir_count, 1);
            assert_eq!(src.stats.size, 160);
        }
        other => panic!("unexpected node {other:?}"),
    }
}

#[test]
fn test_aggregate_is_idempotent() {
    let mut root = sample_tree();
    root.aggregate();
    let first = root.clone();
    root.aggregate();
    assert_eq!(root, first);
}

#[test]
fn test_stats_match_subtree_leaves() {
    let mut root = sample_tree();
    root.aggregate();

    fn leaves(dir: &DirectoryNode) -> (u64, u64) {
        let mut all = Vec::new();
        walk(dir, &mut all);
        all.iter()
            .filter_map(|n| match n {
                Node::File(f) => Some(f.size),
                Node::Directory(_) => None,
            })
            .fold((0, 0), |(count, size), s| (count + 1, size + s))
    }

    let mut dirs = vec![&root];
    let mut all = Vec::new();
    walk(&root, &mut all);
    dirs.extend(all.iter().filter_map(|n| match n {
        Node::Directory(d) => Some(d),
        Node::File(_) => None,
    }));
    for dir in dirs {
        let (count, size) = leaves(dir);
        assert_eq!(dir.stats.file_count, count, "file_count of {}", dir.path);
        assert_eq!(dir.stats.size, size, "size of {}", dir.path);
    }
}

#[test]
fn test_render_sibling_order() {
    let mut root = DirectoryNode::root();
    root.insert_file("b.txt", 1, text("b")).unwrap();
    root.insert_file("a.txt", 1, text("a")).unwrap();
    root.ensure_path(["zdir"]).unwrap();
    root.insert_file("readme.md", 1, text("r")).unwrap();

    let rendered = render_tree(&root);
    let names: Vec<&str> = rendered
        .lines()
        .map(|l| l.trim_start_matches(['├', '└', '─', '│', ' ']))
        .collect();
    assert_eq!(names, vec!["readme.md", "a.txt", "b.txt", "zdir/"]);
}

#[test]
fn test_render_readme_first_case_insensitive_and_files_before_dirs() {
    let mut root = DirectoryNode::root();
    root.ensure_path(["Alpha"]).unwrap();
    root.insert_file("zeta.txt", 1, text("z")).unwrap();
    root.insert_file("ReadMe.MD", 1, text("r")).unwrap();
    root.insert_file("Beta.txt", 1, text("b")).unwrap();

    let expected = "├── ReadMe.MD\n├── Beta.txt\n├── zeta.txt\n└── Alpha/\n";
    assert_eq!(render_tree(&root), expected);
}

#[test]
fn test_render_box_drawing_layout() {
    let root = sample_tree();
    let expected = "\
├── README.md
├── logo.png
├── jcl/
│   └── RUN.jcl
└── src/
    ├── main.cbl
    └── copy/
        └── CUST.cpy
";
    assert_eq!(render_tree(&root), expected);
}

#[test]
fn test_every_inserted_path_renders_once_at_its_depth() {
    let paths = [
        "README.md",
        "src/main.cbl",
        "src/copy/CUST.cpy",
        "jcl/RUN.jcl",
        "deep/er/still/file.dat",
    ];
    let mut root = DirectoryNode::root();
    for p in paths {
        root.insert_file(p, 1, text("x")).unwrap();
    }
    let rendered = render_tree(&root);

    for p in paths {
        let segments: Vec<&str> = p.split('/').collect();
        let name = segments[segments.len() - 1];
        let depth = segments.len() - 1;
        let hits: Vec<&str> = rendered
            .lines()
            .filter(|l| l.ends_with(&format!("── {name}")))
            .collect();
        assert_eq!(hits.len(), 1, "{p} should render exactly once");
        let indent = hits[0].chars().take_while(|c| !matches!(c, '├' | '└')).count();
        assert_eq!(indent, depth * 4, "{p} rendered at the wrong depth");
    }
}
