//! Command-line interface definitions using clap
//!
//! Every command loads the id tables from a JSON state file before running
//! and writes them back afterwards when they may have changed, so codes issued
//! by one invocation decode in the next.

pub mod commands;
pub mod state;

use std::fmt;

use clap::{Args, Parser, Subcommand};

use crate::errors::TracklinkError;
use crate::tracking::{Strategy, TrackingParams};

pub use commands::run;

/// tracklink - compact tracking-link codes
#[derive(Parser, Debug)]
#[command(name = "tracklink")]
#[command(version)]
#[command(about = "Encode and decode compact tracking-link codes", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    /// Table state file (default: shortener.state_file from config)
    #[arg(long, global = true)]
    pub state: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Tracking fields shared by `encode` and `link`
#[derive(Args, Debug, Clone)]
pub struct ParamArgs {
    /// Campaign identifier
    #[arg(long)]
    pub campaign: String,
    #[arg(long)]
    pub sub1: Option<String>,
    #[arg(long)]
    pub sub2: Option<String>,
    #[arg(long)]
    pub sub3: Option<String>,
    #[arg(long)]
    pub sub4: Option<String>,
    #[arg(long)]
    pub sub5: Option<String>,
    #[arg(long)]
    pub click_id: Option<String>,

    /// sequential, compressed, hybrid or smart (default: chosen by field count)
    #[arg(long)]
    pub strategy: Option<Strategy>,
}

impl ParamArgs {
    pub fn to_params(&self) -> TrackingParams {
        let mut params = TrackingParams::new(self.campaign.clone());
        for (index, value) in [&self.sub1, &self.sub2, &self.sub3, &self.sub4, &self.sub5]
            .into_iter()
            .enumerate()
        {
            params.set_sub(index + 1, value.clone());
        }
        params.click_id = self.click_id.clone();
        params
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode tracking fields into a short code
    Encode(ParamArgs),

    /// Decode a short code into its tracking fields
    Decode {
        code: String,
    },

    /// Build a full tracking link `{base_url}/s/{code}`
    Link {
        /// Base URL (default: shortener.base_url from config)
        #[arg(long)]
        base_url: Option<String>,

        #[command(flatten)]
        params: ParamArgs,
    },

    /// Extract tracking fields from a tracking link
    Extract {
        short_url: String,
    },

    /// Shorten a landing URL carrying tracking query parameters
    Shorten {
        long_url: String,
    },

    /// Expand a short URL into the click redirect URL
    Expand {
        short_url: String,
    },

    /// Show table statistics
    Stats,

    /// Export the id tables as a JSON snapshot
    Export {
        /// Output file path (default: stdout)
        file_path: Option<String>,
    },

    /// Replace the id tables with a JSON snapshot
    Import {
        file_path: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,
    },
}

#[derive(Debug)]
pub enum CliError {
    StateError(String),
    CommandError(String),
    NotDecodable(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::StateError(msg) => write!(f, "State error: {}", msg),
            CliError::CommandError(msg) => write!(f, "Command error: {}", msg),
            CliError::NotDecodable(code) => write!(f, "Code '{}' does not decode", code),
        }
    }
}

impl std::error::Error for CliError {}

impl From<TracklinkError> for CliError {
    fn from(err: TracklinkError) -> Self {
        CliError::CommandError(err.to_string())
    }
}
