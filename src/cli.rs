use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use suitekit_config::{HarnessConfig, RunMode};

/// Run registered test suites
#[derive(Debug, Parser)]
#[command(name = "suitekit", version, about)]
pub struct Cli {
    /// Run only this suite, even if it is a manual one
    pub suite: Option<String>,

    /// List registered suites instead of running them
    #[arg(long)]
    pub list: bool,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter used when SUITEKIT_LOG is unset
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Command line beats environment, which beats the config file.
    pub fn resolve_config(&self) -> Result<HarnessConfig> {
        let base = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };
        let mut config = base.merge_with_env();

        if let Some(suite) = &self.suite {
            config.mode = RunMode::Named(suite.clone());
        }
        if let Some(filter) = &self.log {
            config.log_filter = filter.clone();
        }
        if self.list {
            config.list_only = true;
        }

        Ok(config)
    }
}
