//! gentrie CLI - inspect and plan merges over trie generation files

use anyhow::Context;
use clap::{Parser, Subcommand};
use gentrie::{merge_plan, Config, Hash, HashTrie, OutputFormat, TrieFile, TriePath, TrieShape, TrieWriter};
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "gentrie")]
#[command(about = "Inspect hash trie generations and plan their merges")]
#[command(version)]
struct Cli {
    /// Path to a config file (default: ~/.config/gentrie/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format (json or text); overrides the config
    #[arg(short, long)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a trie file from a JSON shape description
    Import {
        /// JSON file holding the shape, e.g. {"branch": [{"leaf": 7}, null]}
        shape: PathBuf,
        /// Trie file to create
        out: PathBuf,
    },

    /// Show node counts and depth of a trie file
    Inspect {
        /// The trie file
        file: PathBuf,
    },

    /// Print a trie file as a JSON shape
    Dump {
        /// The trie file
        file: PathBuf,
    },

    /// Find the leaf whose partition holds a key
    Lookup {
        /// The trie file
        file: PathBuf,
        /// Row key (hashed with BLAKE3)
        #[arg(short, long, conflicts_with = "hash", required_unless_present = "hash")]
        key: Option<String>,
        /// Precomputed key hash, 64 hex characters
        #[arg(long)]
        hash: Option<String>,
    },

    /// List leaves, optionally under a path prefix such as 1.0.3
    Leaves {
        /// The trie file
        file: PathBuf,
        /// Path prefix, dot separated
        #[arg(short, long)]
        prefix: Option<TriePath>,
    },

    /// Plan the merge of several generations
    Plan {
        /// Trie files, oldest first
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;
    let format = cli.format.unwrap_or(config.output);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Import { shape, out } => {
            let content = std::fs::read_to_string(&shape)
                .with_context(|| format!("reading {}", shape.display()))?;
            let shape: TrieShape = serde_json::from_str(&content)?;
            let file = TrieFile::create(&out, TrieWriter::encode(&shape), config.compression_level)?;
            let stats = file.trie().stats();
            output(
                format,
                &serde_json::json!({
                    "status": "ok",
                    "file": out.display().to_string(),
                    "nodes": file.encoding().len(),
                    "leaves": stats.leaves
                }),
            );
        }

        Commands::Inspect { file } => {
            let trie_file = open_trie(&file)?;
            let stats = trie_file.trie().stats();
            output(
                format,
                &serde_json::json!({
                    "file": file.display().to_string(),
                    "nodes": trie_file.encoding().len(),
                    "branches": stats.branches,
                    "leaves": stats.leaves,
                    "empty_slots": stats.empty_slots,
                    "max_depth": stats.max_depth
                }),
            );
        }

        Commands::Dump { file } => {
            let trie_file = open_trie(&file)?;
            output(format, &serde_json::to_value(trie_file.trie().to_shape())?);
        }

        Commands::Lookup { file, key, hash } => {
            let trie_file = open_trie(&file)?;
            let hash = match (key, hash) {
                (Some(key), _) => Hash::digest(key.as_bytes()),
                (None, Some(hex)) => Hash::from_hex(&hex)
                    .map_err(|e| anyhow::anyhow!("Invalid hash {}: {}", hex, e))?,
                (None, None) => anyhow::bail!("either --key or --hash is required"),
            };
            let value = match trie_file.trie().find_leaf(&hash) {
                Some(leaf) => serde_json::json!({
                    "hash": hash.to_hex(),
                    "found": true,
                    "path": leaf.path().to_string(),
                    "data_page_idx": leaf.data_page_idx()
                }),
                None => serde_json::json!({
                    "hash": hash.to_hex(),
                    "found": false
                }),
            };
            output(format, &value);
        }

        Commands::Leaves { file, prefix } => {
            let prefix = prefix.unwrap_or_default();
            let trie_file = open_trie(&file)?;
            let items: Vec<_> = trie_file
                .trie()
                .leaves_under(&prefix)
                .iter()
                .map(|leaf| {
                    serde_json::json!({
                        "path": leaf.path().to_string(),
                        "data_page_idx": leaf.data_page_idx()
                    })
                })
                .collect();
            output(
                format,
                &serde_json::json!({
                    "prefix": prefix.to_string(),
                    "count": items.len(),
                    "leaves": items
                }),
            );
        }

        Commands::Plan { files } => {
            let trie_files = files
                .iter()
                .map(|f| open_trie(f))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let tries: Vec<HashTrie<'_>> = trie_files.iter().map(TrieFile::trie).collect();
            let plan = merge_plan(&tries);

            let tasks: Vec<_> = plan
                .tasks()
                .iter()
                .map(|task| {
                    serde_json::json!({
                        "path": task.path.to_string(),
                        "leaves": task.leaves.iter().map(|leaf| serde_json::json!({
                            "trie": leaf.trie,
                            "path": leaf.path.to_string(),
                            "data_page_idx": leaf.data_page_idx
                        })).collect::<Vec<_>>()
                    })
                })
                .collect();
            output(
                format,
                &serde_json::json!({
                    "tries": files.iter().map(|f| f.display().to_string()).collect::<Vec<_>>(),
                    "count": tasks.len(),
                    "pages": plan.page_refs().len(),
                    "tasks": tasks
                }),
            );
        }
    }

    Ok(())
}

fn open_trie(path: &Path) -> anyhow::Result<TrieFile> {
    TrieFile::open(path).with_context(|| format!("opening {}", path.display()))
}

fn output(format: OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", value);
        }
        OutputFormat::Text => {
            println!("{:#}", value);
        }
    }
}
