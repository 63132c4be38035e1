//! ast-chunker CLI - split source files into syntax-aware chunks
//!
//! # Usage
//!
//! ```bash
//! # Split a single file, print JSON
//! ast-chunker split src/lib.rs --pretty
//!
//! # Split a directory, only TypeScript, no context prefixes
//! ast-chunker split web/ --include "*.ts" --no-context
//!
//! # Inspect supported languages and the effective configuration
//! ast-chunker languages
//! ast-chunker config
//! ```

use anyhow::{Context, Result};
use ast_chunker::indexer::{FileWalker, SourceFile};
use ast_chunker::splitter::registry;
use ast_chunker::{AstSplitter, Chunk, Config};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Split source code into context-enriched chunks for embedding
#[derive(Parser)]
#[command(name = "ast-chunker", version = VERSION, about)]
struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(long, global = true, env = "AST_CHUNKER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable info-level logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a file or directory and print the chunks as JSON
    Split(SplitArgs),
    /// List supported languages and their aliases
    Languages,
    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args)]
struct SplitArgs {
    /// File or directory to split
    path: PathBuf,

    /// Language id to use instead of extension detection
    #[arg(short, long)]
    language: Option<String>,

    /// Emit bare source slices without context prefixes
    #[arg(long)]
    no_context: bool,

    /// Maximum characters per fallback window
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters carried between fallback windows
    #[arg(long)]
    chunk_overlap: Option<usize>,

    /// Only split files matching this pattern (repeatable)
    #[arg(long = "include")]
    include: Vec<String>,

    /// Skip files matching this pattern (repeatable)
    #[arg(long = "exclude")]
    exclude: Vec<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct FileChunks<'a> {
    file: &'a str,
    hash: &'a str,
    chunks: Vec<Chunk>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Split(args) => run_split(config, args),
        Command::Languages => {
            let mut languages: Vec<_> = registry::all().iter().collect();
            languages.sort_by_key(|language| language.name);
            for language in languages {
                println!("{:<12} {}", language.name, language.aliases.join(", "));
            }
            Ok(())
        }
        Command::Config => {
            let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
            print!("{}", rendered);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default()?,
    };
    config.apply_env_overrides();
    Ok(config)
}

fn run_split(mut config: Config, args: SplitArgs) -> Result<()> {
    if let Some(chunk_size) = args.chunk_size {
        config.splitter.chunk_size = chunk_size;
    }
    if let Some(chunk_overlap) = args.chunk_overlap {
        config.splitter.chunk_overlap = chunk_overlap;
    }
    if args.no_context {
        config.splitter.include_context = false;
    }
    config.walk.include_patterns.extend(args.include);
    config.walk.exclude_patterns.extend(args.exclude);
    config.validate()?;

    let mut files = if args.path.is_dir() {
        FileWalker::from_config(&args.path, &config.walk).walk()?
    } else {
        vec![SourceFile::load(&args.path, args.path.to_string_lossy())?]
    };
    if let Some(language) = &args.language {
        for file in &mut files {
            file.language = language.clone();
        }
    }

    let splitter = AstSplitter::from_config(&config)?;
    let results = splitter.split_many(&files);

    let mut records = Vec::with_capacity(files.len());
    for (file, result) in files.iter().zip(results) {
        let chunks = result.with_context(|| format!("Failed to split {}", file.relative_path))?;
        records.push(FileChunks {
            file: &file.relative_path,
            hash: &file.hash,
            chunks,
        });
    }
    splitter.dispose();

    tracing::info!(
        "Split {} file(s) into {} chunk(s)",
        records.len(),
        records.iter().map(|r| r.chunks.len()).sum::<usize>()
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    println!("{}", output);
    Ok(())
}
