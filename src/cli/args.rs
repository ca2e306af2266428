//! Command-line argument definitions
//!
//! Every configuration option can be given on the command line; options that
//! are omitted fall back to the process environment.

use crate::constants::env;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bucket-event-processor")]
#[command(about = "Validate and catalog objects named by a bucket write notification")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Notification JSON file, or `-` to read from stdin
    #[arg(value_name = "EVENT", default_value = "-")]
    pub event: String,

    /// Pipeline variant to run
    #[arg(long, value_enum, default_value_t = Mode::Validate)]
    pub mode: Mode,

    /// Object store backend
    #[arg(long, value_enum, default_value_t = StoreKind::S3)]
    pub store: StoreKind,

    /// Root directory of the local store, one subdirectory per container
    #[arg(long, value_name = "DIR", required_if_eq("store", "local"))]
    pub local_root: Option<PathBuf>,

    /// Comma-separated known key prefixes (overrides STATIC_PREFIXES)
    #[arg(long)]
    pub prefixes: Option<String>,

    /// Deployment environment name (overrides ENVIRONMENT_NAME)
    #[arg(long)]
    pub environment: Option<String>,

    /// Submissions container name (overrides SUBMISSIONS_BUCKET_NAME)
    #[arg(long)]
    pub submissions_container: Option<String>,

    /// Curated container name (overrides CURATED_BUCKET_NAME)
    #[arg(long)]
    pub curated_container: Option<String>,

    /// Search service endpoint (overrides ELASTICSEARCH_ENDPOINT)
    #[arg(long)]
    pub search_endpoint: Option<String>,

    /// Directory for staged downloads (overrides STAGING_DIR)
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Write emitted counters in Prometheus text format to this file
    #[arg(long, value_name = "FILE")]
    pub metrics_textfile: Option<PathBuf>,

    /// Suppress everything below error level
    #[arg(short, long)]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Validate records against the configuration under the matched prefix
    Validate,
    /// Derive metadata and counters from the key only
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    S3,
    Local,
}

impl Args {
    /// Log level, raised to debug when verbose output was requested in the environment
    pub fn get_log_level(&self, env_verbose: bool) -> &'static str {
        if self.quiet {
            return "error";
        }
        match (self.verbose, env_verbose) {
            (0, false) => "info",
            (0, true) | (1, _) => "debug",
            _ => "trace",
        }
    }

    /// Command-line value standing in for an environment variable
    pub fn override_for(&self, name: &str) -> Option<String> {
        match name {
            env::ENVIRONMENT_NAME => self.environment.clone(),
            env::SUBMISSIONS_BUCKET_NAME => self.submissions_container.clone(),
            env::CURATED_BUCKET_NAME => self.curated_container.clone(),
            env::STATIC_PREFIXES => self.prefixes.clone(),
            env::ELASTICSEARCH_ENDPOINT => self.search_endpoint.clone(),
            env::STAGING_DIR => self
                .staging_dir
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
            env::VERBOSE_OUTPUT if self.verbose > 0 => Some("TRUE".to_string()),
            _ => None,
        }
    }
}
