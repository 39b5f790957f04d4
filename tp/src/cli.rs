//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::domain::{BudgetBand, DurationBand};

/// Trip planner - AI-assisted Japan travel itineraries
#[derive(Parser)]
#[command(
    name = "tp",
    about = "AI-assisted travel itinerary planner for Japan",
    version,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a travel plan for a destination
    Plan {
        /// Departure location
        #[arg(long, default_value = "東京")]
        origin: String,

        /// Destination
        #[arg(short, long, default_value = "京都")]
        destination: String,

        /// Budget band
        #[arg(short, long, default_value = "~5万円")]
        budget: BudgetBand,

        /// Length of stay
        #[arg(long, default_value = "日帰り")]
        duration: DurationBand,

        /// Trip purpose, repeat the flag for several
        #[arg(short, long = "purpose", default_value = "観光")]
        purposes: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Rebuild the knowledge base index and report statistics
    Reindex {
        /// Directory containing knowledge documents
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Search the knowledge base
    Search {
        /// Query text
        query: String,

        /// Number of hits to return
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Directory containing knowledge documents
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tripplanner")
        .join("logs")
        .join("tripplanner.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Output format for plan/search commands
#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => {
                debug!("OutputFormat::from_str: matched Text");
                Ok(Self::Text)
            }
            "json" => {
                debug!("OutputFormat::from_str: matched Json");
                Ok(Self::Json)
            }
            _ => {
                debug!(%s, "OutputFormat::from_str: unknown format");
                Err(format!("Unknown format: {}. Use: text or json", s))
            }
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        debug!(?self, "OutputFormat::fmt: called");
        match self {
            Self::Text => {
                debug!("OutputFormat::fmt: writing text");
                write!(f, "text")
            }
            Self::Json => {
                debug!("OutputFormat::fmt: writing json");
                write!(f, "json")
            }
        }
    }
}
