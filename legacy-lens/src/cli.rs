//! # legacy-lens CLI
//!
//! Command parsing and orchestration only. Every command ingests its inputs
//! first (files, zip archives or directories), then either prints one of the
//! ingestion views or runs an LLM feature over the resulting corpus.
//!
//! Artifacts go to stdout, logs go to stderr. Ingestion logic lives in
//! `legacy-lens-core`; this module maps flags and config onto it.

use crate::llm::ChatClient;
use crate::load_config::{load_config_or_default, CliConfig};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use legacy_lens_core::ceiling::MAX_POSITION;
use legacy_lens_core::contract::LlmClient;
use legacy_lens_core::features::{self, BrdSection, DiagramKind, FeatureError, ItemKind};
use legacy_lens_core::ingest::{IngestOptions, IngestionResult, Ingestor};
use legacy_lens_core::input::load_inputs;
use legacy_lens_core::pattern::{split_patterns, PatternMode};
use std::path::{Path, PathBuf};

/// Ingest a legacy codebase and explore it with an LLM.
#[derive(Debug, Parser)]
#[clap(
    name = "legacy-lens",
    version,
    about = "Flatten a legacy codebase into a text corpus and run LLM-driven discovery over it"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Arguments shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct IngestArgs {
    /// Files, zip archives or directories to ingest
    pub inputs: Vec<PathBuf>,
    /// Keep only paths matching these patterns (comma or space separated)
    #[clap(long, value_name = "PATTERNS", conflicts_with = "exclude")]
    pub include: Option<String>,
    /// Skip paths matching these patterns, on top of the defaults
    #[clap(long, value_name = "PATTERNS")]
    pub exclude: Option<String>,
    /// Position on the file size ceiling scale
    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=(MAX_POSITION as i64)))]
    pub size_position: Option<u32>,
    /// Path to the YAML config file
    #[clap(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum View {
    Summary,
    Directory,
    Files,
    Corpus,
    #[default]
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ItemKindArg {
    Entity,
    Function,
}

impl From<ItemKindArg> for ItemKind {
    fn from(kind: ItemKindArg) -> Self {
        match kind {
            ItemKindArg::Entity => ItemKind::Entity,
            ItemKindArg::Function => ItemKind::Function,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiagramArg {
    Sequence,
    Dfd,
    Class,
    State,
}

impl From<DiagramArg> for DiagramKind {
    fn from(kind: DiagramArg) -> Self {
        match kind {
            DiagramArg::Sequence => DiagramKind::Sequence,
            DiagramArg::Dfd => DiagramKind::DataFlow,
            DiagramArg::Class => DiagramKind::Class,
            DiagramArg::State => DiagramKind::State,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest inputs and print the summary, directory listing, file report or corpus
    Ingest {
        #[clap(flatten)]
        ingest: IngestArgs,
        #[clap(long, value_enum, default_value_t = View::All)]
        view: View,
        /// Also write every view to this directory
        #[clap(long)]
        output_dir: Option<PathBuf>,
    },
    /// Ask a question about the ingested code
    Ask {
        #[clap(flatten)]
        ingest: IngestArgs,
        #[clap(long)]
        question: String,
    },
    /// Extract entities and function calls as JSON
    Components {
        #[clap(flatten)]
        ingest: IngestArgs,
    },
    /// Explain one entity or function
    Explain {
        #[clap(flatten)]
        ingest: IngestArgs,
        #[clap(long)]
        item: String,
        #[clap(long, value_enum)]
        kind: ItemKindArg,
    },
    /// Generate a business requirements document as HTML
    Brd {
        #[clap(flatten)]
        ingest: IngestArgs,
    },
    /// Generate plain-text test cases
    TestCases {
        #[clap(flatten)]
        ingest: IngestArgs,
    },
    /// Generate pseudo code
    PseudoCode {
        #[clap(flatten)]
        ingest: IngestArgs,
    },
    /// Describe the database structure as HTML
    Database {
        #[clap(flatten)]
        ingest: IngestArgs,
    },
    /// Propose a relational schema as HTML
    Schema {
        #[clap(flatten)]
        ingest: IngestArgs,
    },
    /// Generate Mermaid diagram source
    Diagram {
        #[clap(flatten)]
        ingest: IngestArgs,
        #[clap(long, value_enum)]
        kind: DiagramArg,
    },
}

/// An LLM feature with its own arguments, detached from the ingest flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    Ask { question: String },
    Components,
    Explain { item: String, kind: ItemKindArg },
    Brd,
    TestCases,
    PseudoCode,
    Database,
    Schema,
    Diagram { kind: DiagramArg },
}

impl Feature {
    fn name(&self) -> &'static str {
        match self {
            Feature::Ask { .. } => "ask",
            Feature::Components => "components",
            Feature::Explain { .. } => "explain",
            Feature::Brd => "brd",
            Feature::TestCases => "test-cases",
            Feature::PseudoCode => "pseudo-code",
            Feature::Database => "database",
            Feature::Schema => "schema",
            Feature::Diagram { .. } => "diagram",
        }
    }
}

enum Action {
    Show {
        view: View,
        output_dir: Option<PathBuf>,
    },
    Run(Feature),
}

impl Commands {
    fn into_parts(self) -> (IngestArgs, Action) {
        match self {
            Commands::Ingest {
                ingest,
                view,
                output_dir,
            } => (ingest, Action::Show { view, output_dir }),
            Commands::Ask { ingest, question } => (ingest, Action::Run(Feature::Ask { question })),
            Commands::Components { ingest } => (ingest, Action::Run(Feature::Components)),
            Commands::Explain { ingest, item, kind } => {
                (ingest, Action::Run(Feature::Explain { item, kind }))
            }
            Commands::Brd { ingest } => (ingest, Action::Run(Feature::Brd)),
            Commands::TestCases { ingest } => (ingest, Action::Run(Feature::TestCases)),
            Commands::PseudoCode { ingest } => (ingest, Action::Run(Feature::PseudoCode)),
            Commands::Database { ingest } => (ingest, Action::Run(Feature::Database)),
            Commands::Schema { ingest } => (ingest, Action::Run(Feature::Schema)),
            Commands::Diagram { ingest, kind } => (ingest, Action::Run(Feature::Diagram { kind })),
        }
    }
}

/// Async entrypoint shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    let (args, action) = cli.command.into_parts();
    // Rejected before any input is read or an API key is required.
    if let Action::Run(Feature::Ask { question }) = &action {
        if question.trim().is_empty() {
            return Err(FeatureError::EmptyQuestion.into());
        }
    }
    let config = load_config_or_default(args.config.as_deref())?;
    let result = ingest(&args, &config).await?;

    match action {
        Action::Show { view, output_dir } => {
            if let Some(dir) = output_dir {
                write_views(&dir, &result).await?;
            }
            println!("{}", view_text(&result, view));
        }
        Action::Run(feature) => {
            let client = ChatClient::new_from_config(&config.llm)?;
            let output = run_feature(&client, &feature, &result).await?;
            println!("{output}");
        }
    }
    Ok(())
}

/// Flags win over the config file. A pattern flag replaces both the mode and
/// the pattern list from the file.
pub fn ingest_options(args: &IngestArgs, base: &IngestOptions) -> IngestOptions {
    let mut options = base.clone();
    if let Some(raw) = &args.include {
        options.pattern_mode = PatternMode::Include;
        options.patterns = split_patterns(raw);
    } else if let Some(raw) = &args.exclude {
        options.pattern_mode = PatternMode::Exclude;
        options.patterns = split_patterns(raw);
    }
    if let Some(position) = args.size_position {
        options.size_position = position;
    }
    options
}

async fn ingest(args: &IngestArgs, config: &CliConfig) -> Result<IngestionResult> {
    let options = ingest_options(args, &config.ingest);
    let inputs = load_inputs(&args.inputs, &options.filter(), options.ceiling())
        .await
        .context("Failed to load inputs")?;
    let result = Ingestor::new(options).ingest(inputs).map_err(|e| {
        tracing::error!(error = %e, "Ingestion failed");
        e
    })?;
    tracing::info!(
        files = result.file_count,
        size = result.total_size,
        "Ingestion finished"
    );
    Ok(result)
}

pub fn view_text(result: &IngestionResult, view: View) -> String {
    match view {
        View::Summary => result.summary.trim_end().to_string(),
        View::Directory => result.directory.trim_end().to_string(),
        View::Files => result.files_report.clone(),
        View::Corpus => result.corpus.clone(),
        View::All => result.all_views(),
    }
}

async fn write_views(dir: &Path, result: &IngestionResult) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {dir:?}"))?;
    let views = [
        ("summary.txt", &result.summary),
        ("directory.txt", &result.directory),
        ("files.txt", &result.files_report),
        ("corpus.txt", &result.corpus),
    ];
    for (name, body) in views {
        let path = dir.join(name);
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write {path:?}"))?;
    }
    tracing::info!(output_dir = ?dir, "Wrote ingestion views");
    Ok(())
}

/// Runs one feature and renders its output as printable text.
pub async fn run_feature<C: LlmClient + ?Sized>(
    client: &C,
    feature: &Feature,
    result: &IngestionResult,
) -> Result<String> {
    tracing::info!(command = feature.name(), "Running feature");
    let output = match feature {
        Feature::Ask { question } => features::ask_question(client, result, question).await?,
        Feature::Components => {
            let analysis = features::analyze_components(client, result).await?;
            serde_json::to_string_pretty(&analysis)?
        }
        Feature::Explain { item, kind } => {
            features::explain_item(client, result, item, (*kind).into()).await?
        }
        Feature::Brd => brd_html(&features::generate_brd(client, result).await?),
        Feature::TestCases => features::generate_test_cases(client, result).await?,
        Feature::PseudoCode => features::generate_pseudo_code(client, result).await?,
        Feature::Database => features::analyze_database(client, result).await?,
        Feature::Schema => features::generate_schema(client, result).await?,
        Feature::Diagram { kind } => {
            features::generate_diagram(client, result, (*kind).into()).await?
        }
    };
    Ok(output)
}

fn brd_html(sections: &[BrdSection]) -> String {
    sections
        .iter()
        .map(|section| match &section.html {
            Ok(html) => html.clone(),
            Err(e) => format!("<p>Error generating {}: {e}</p>", section.title),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
