use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use sitexml_core::ExtractionMode;

#[derive(Parser)]
#[command(name = "p2-sitexml")]
#[command(about = "Generate a p2 update-site site.xml from a features directory")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Config file (default: ./p2-sitexml.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Repository options when no subcommand is given (runs generate)
    #[command(flatten)]
    pub site: SiteArgs,

    /// Print the document instead of writing it
    #[arg(short, long)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Extractor {
    /// Read id/version from the feature.xml packaged in each jar
    Metadata,
    /// Parse id/version from <id>_<version>.jar file names
    Filename,
}

impl From<Extractor> for ExtractionMode {
    fn from(value: Extractor) -> Self {
        match value {
            Extractor::Metadata => ExtractionMode::Metadata,
            Extractor::Filename => ExtractionMode::Filename,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Options shared by commands that read a repository
#[derive(Args, Clone, Debug)]
pub struct SiteArgs {
    /// p2 repository directory (default: target/repository)
    #[arg(short, long, env = "P2_SITEXML_REPOSITORY", value_name = "DIR")]
    pub repository: Option<PathBuf>,

    /// Category for every feature (default: infer from content.xml)
    #[arg(short, long, env = "P2_SITEXML_CATEGORY")]
    pub category: Option<String>,

    /// How feature id/version are read
    #[arg(short, long, value_enum)]
    pub extractor: Option<Extractor>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate site.xml in the repository root (default)
    Generate {
        #[command(flatten)]
        site: SiteArgs,

        /// Print the document instead of writing it
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Show each feature's identity and category without writing anything
    Inspect {
        #[command(flatten)]
        site: SiteArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g., site.category)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g., site.category)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all config values
    List,

    /// Show config file path
    Path,

    /// Initialize config file with defaults
    Init,
}
