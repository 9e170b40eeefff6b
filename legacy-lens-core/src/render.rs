//! Box-drawing directory listing with a fixed sibling order.

use crate::tree::{DirectoryNode, Node};
use std::cmp::Ordering;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Renders every descendant of `root`, one line each. The root itself is not
/// rendered, so its children start at column 0.
pub fn render_tree(root: &DirectoryNode) -> String {
    let mut out = String::new();
    render_children(root, "", &mut out);
    out
}

fn render_children(dir: &DirectoryNode, prefix: &str, out: &mut String) {
    let mut children: Vec<&Node> = dir.children.iter().collect();
    children.sort_by(|a, b| display_order(a, b));

    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let is_last = i + 1 == count;
        out.push_str(prefix);
        out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        match child {
            Node::File(file) => {
                out.push_str(&file.name);
                out.push('\n');
            }
            Node::Directory(sub) => {
                out.push_str(&sub.name);
                out.push_str("/\n");
                let child_prefix = format!("{prefix}{}", if is_last { SPACE } else { PIPE });
                render_children(sub, &child_prefix, out);
            }
        }
    }
}

fn is_readme(node: &Node) -> bool {
    node.is_file() && node.name().eq_ignore_ascii_case("readme.md")
}

/// `readme.md` first, then files before directories, then case-insensitive name.
pub fn display_order(a: &Node, b: &Node) -> Ordering {
    is_readme(b)
        .cmp(&is_readme(a))
        .then_with(|| b.is_file().cmp(&a.is_file()))
        .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
}
