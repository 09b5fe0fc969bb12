//! Command-line interface
//!
//! - `chemviz shell` (default) - interactive session
//! - `chemviz upload <file>` - log in, upload, print the results
//! - `chemviz history` - log in, list recent uploads
//! - `chemviz config [--save]` - print the effective config, optionally saving it

pub mod render;
pub mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::config::AppConfig;
use crate::services::Credentials;

/// Chemviz - Chemical Equipment Parameter Visualizer client
#[derive(Debug, Parser)]
#[command(name = "chemviz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// API server URL (overrides the config file)
    #[arg(long, env = "CHEMVIZ_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(long, env = "CHEMVIZ_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Username for non-interactive commands
    #[arg(long, env = "CHEMVIZ_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for non-interactive commands
    #[arg(long, env = "CHEMVIZ_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive session
    Shell,
    /// Upload a CSV file and print its summary and charts
    Upload {
        /// CSV file to upload
        file: PathBuf,
    },
    /// List recently uploaded datasets
    History,
    /// Print the effective configuration
    Config {
        /// Also write it to the config file
        #[arg(long)]
        save: bool,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the file config
    pub fn apply_overrides(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        config
    }

    /// Credentials given on the command line or through the environment
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(Credentials::new(username, password)),
            _ => None,
        }
    }

    pub fn command(&self) -> &Commands {
        self.command.as_ref().unwrap_or(&Commands::Shell)
    }
}
