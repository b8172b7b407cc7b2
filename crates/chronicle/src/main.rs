use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chronicle_config::EngineConfig;
use chronicle_core::{
    frontmatter, split_patch, ChangeTracker, DiffOptions, Highlighter, UnifiedDiff, UnsavedDiff,
};
use clap::{Parser, Subcommand};

/// Line-level change tracking and markdown highlighting for Chronicle notes.
#[derive(Parser, Debug)]
#[command(name = "chronicle", version, about)]
struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the merged gutter status of CURRENT against BASELINE as JSON.
    Status {
        baseline: PathBuf,
        current: PathBuf,
        /// Uncommitted diff of the file, as produced by `git diff`.
        #[arg(long)]
        diff: Option<PathBuf>,
    },
    /// Print the unsaved hunk covering a body line.
    Hunk {
        baseline: PathBuf,
        current: PathBuf,
        /// 1-based body line, or a gap position with `--deletion`.
        #[arg(long)]
        line: usize,
        /// Look up a deletion marker instead of a changed line.
        #[arg(long)]
        deletion: bool,
    },
    /// Parse a unified diff and print its changes as JSON.
    ParseDiff {
        patch: PathBuf,
        /// Front-matter line count of the file the diff belongs to.
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Print the hunk covering this body line instead.
        #[arg(long)]
        line: Option<usize>,
    },
    /// List the files of a multi-file patch as JSON.
    Files { patch: PathBuf },
    /// Print the highlighted markup of a markdown file.
    Highlight { file: PathBuf },
    /// Print the front matter of a note as JSON, or one field with `--field`.
    FrontMatter {
        file: PathBuf,
        #[arg(long)]
        field: Option<String>,
    },
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(EngineConfig::config_path);
    let config = EngineConfig::load_or_create(&config_path);
    tracing::debug!("Using config from {}", config_path.display());

    match cli.command {
        Command::Status {
            baseline,
            current,
            diff,
        } => {
            let baseline = read(&baseline)?;
            let current = read(&current)?;
            let diff_text = diff.as_deref().map(read).transpose()?.unwrap_or_default();

            let mut tracker = ChangeTracker::new(&config);
            tracker.load(&baseline, diff_text);
            let report = tracker.refresh(frontmatter::split(&current).body);
            print_json(&report)
        }
        Command::Hunk {
            baseline,
            current,
            line,
            deletion,
        } => {
            let baseline = read(&baseline)?;
            let current = read(&current)?;
            let diff = UnsavedDiff::new(
                frontmatter::split(&baseline).body,
                frontmatter::split(&current).body,
            )
            .with_options(DiffOptions::from(&config));
            match diff.hunk_for_line(line, deletion) {
                Some(text) => println!("{text}"),
                None => tracing::info!("No unsaved change covers line {line}"),
            }
            Ok(())
        }
        Command::ParseDiff {
            patch,
            offset,
            line,
        } => {
            let text = read(&patch)?;
            let diff = UnifiedDiff::new(&text).with_frontmatter_offset(offset);
            match line {
                Some(line) => {
                    match diff.hunk_for_line(line, offset) {
                        Some(hunk) => println!("{hunk}"),
                        None => tracing::info!("No hunk covers line {line}"),
                    }
                    Ok(())
                }
                None => print_json(&diff.parse_body()),
            }
        }
        Command::Files { patch } => {
            let text = read(&patch)?;
            print_json(&split_patch(&text))
        }
        Command::Highlight { file } => {
            let text = read(&file)?;
            println!("{}", Highlighter::from_config(&config).highlight(&text));
            Ok(())
        }
        Command::FrontMatter { file, field } => {
            let text = read(&file)?;
            let split = frontmatter::split(&text);
            match field {
                Some(key) => {
                    match split.field(&key) {
                        Some(value) => println!("{value}"),
                        None => tracing::info!("No scalar field {key} in {}", file.display()),
                    }
                    Ok(())
                }
                None => print_json(&split.metadata()),
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    run(cli)
}
