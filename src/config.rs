//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

/// File name of the persisted clock store inside the data directory
const STORE_FILE_NAME: &str = "store.json";

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "study-clock")]
#[command(about = "A persistent countdown timer and stopwatch with study session history")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Path of the persisted clock store (JSON)
    #[arg(short, long)]
    pub data_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve where the clock store lives.
    ///
    /// An explicit `--data-file` wins; otherwise the platform data directory
    /// is used, falling back to the working directory when none exists.
    pub fn store_path(&self) -> PathBuf {
        if let Some(path) = &self.data_file {
            return path.clone();
        }
        match dirs::data_dir() {
            Some(dir) => dir.join("study-clock").join(STORE_FILE_NAME),
            None => PathBuf::from(format!("study-clock-{}", STORE_FILE_NAME)),
        }
    }
}
