//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// AirCut server - gesture recognition and live hand detection
#[derive(Parser, Debug)]
#[command(name = "aircut")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the WebSocket and health server
    Serve {
        /// Override the listen host
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Recognize a gesture offline from a JSON request file
    ///
    /// The file has the shape of a `recognize_gesture` message:
    /// `{"trajectory": [...], "templates": [...], "confidence_threshold": 0.8}`
    Recognize {
        /// Request file
        #[arg(short, long)]
        input: PathBuf,

        /// Override the recognition threshold
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// View or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Print the default configuration path
    Path,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
