//! `anchormarks` command line
//!
//! parse   : print what a bookmark file contains, without storing it
//! import  : parse a bookmark file and add it to the library
//! export  : write the library as a bookmark file

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use anchormarks_core::{
    import_bytes, init_logging, Config, EmptyFolderPolicy, ExportLayout, Library, StrategyPolicy,
};

#[derive(Parser)]
#[command(name = "anchormarks", author, version, about)]
struct Cli {
    /// Config file (default: config.json in the data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a bookmark file and print the result as JSON
    Parse {
        file: PathBuf,
        /// strict, tolerant or auto
        #[arg(long)]
        strategy: Option<StrategyPolicy>,
    },
    /// Import a bookmark file into the library
    Import {
        file: PathBuf,
        /// strict, tolerant or auto
        #[arg(long)]
        strategy: Option<StrategyPolicy>,
    },
    /// Export the library as a bookmark file
    Export {
        file: PathBuf,
        /// Write folders as nested headings instead of a flat list
        #[arg(long, action = ArgAction::SetTrue)]
        nested: bool,
        /// Leave out folders that hold no bookmarks
        #[arg(long = "skip-empty", action = ArgAction::SetTrue)]
        skip_empty: bool,
        /// Document title
        #[arg(long)]
        title: Option<String>,
    },
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| Config::data_dir().join("config.json"));
        let mut config = Config::load(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?;

        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }

        match &self.command {
            Command::Parse { strategy, .. } | Command::Import { strategy, .. } => {
                if let Some(strategy) = strategy {
                    config.import.strategy = *strategy;
                }
            }
            Command::Export {
                nested,
                skip_empty,
                title,
                ..
            } => {
                if *nested {
                    config.export.layout = ExportLayout::Nested;
                }
                if *skip_empty {
                    config.export.empty_folders = EmptyFolderPolicy::SkipEmpty;
                }
                if let Some(title) = title {
                    config.export.title = title.clone();
                }
            }
        }

        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = cli.load_config()?;

    match &cli.command {
        Command::Parse { file, .. } => {
            let bytes =
                std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
            let parsed = import_bytes(&bytes, &config.import)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        Command::Import { file, .. } => {
            let library = Library::open(config)?;
            let report = library
                .import_file(file)
                .with_context(|| format!("failed to import {}", file.display()))?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Export { file, .. } => {
            let library = Library::open(config)?;
            library
                .export_file(file)
                .with_context(|| format!("failed to export to {}", file.display()))?;
            tracing::debug!(path = %file.display(), "Export finished");
        }
    }

    Ok(())
}
