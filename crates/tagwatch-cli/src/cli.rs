//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tagwatch - Redeploy compose applications when their published version changes
#[derive(Parser, Debug)]
#[command(name = "tagwatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Watch file listing the applications
    #[arg(short, long, global = true, default_value = "watch.yml")]
    pub config: PathBuf,

    #[command(flatten)]
    pub pass: PassArgs,

    /// The command to run (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile every application once and exit
    Run,

    /// Reconcile repeatedly, remembering deployed versions between passes
    ///
    /// Examples:
    ///   tagwatch watch                  # Pass every 60 seconds
    ///   tagwatch watch --interval 300   # Pass every 5 minutes
    Watch {
        /// Seconds to sleep between passes
        #[arg(long, default_value_t = 60)]
        interval: u64,

        /// Stop after this many passes (at least 1)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_passes: Option<u64>,
    },

    /// Validate the watch file and list its applications
    Check,
}

/// Options shared by `run` and `watch`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PassArgs {
    /// Google Cloud project billed for version reads
    #[arg(long, global = true, env = "GOOGLE_CLOUD_PROJECT", hide_env_values = true)]
    pub project: Option<String>,

    /// Directory holding one manifest checkout per application
    #[arg(long, global = true, default_value = "tmp")]
    pub state_dir: PathBuf,

    /// Manifest file name inside each checkout
    #[arg(long, global = true, default_value = "docker-compose.yml")]
    pub manifest_name: String,

    /// Compose executable to run
    #[arg(long, global = true, default_value = "docker-compose")]
    pub compose_bin: String,

    /// Use the `docker compose` plugin instead of --compose-bin
    #[arg(long, global = true)]
    pub compose_plugin: bool,

    /// Keep reconciling other applications after one fails
    #[arg(long, global = true)]
    pub keep_going: bool,

    /// Read version markers from <dir>/<bucket>/<app> instead of Cloud Storage
    #[arg(long, global = true)]
    pub versions_dir: Option<PathBuf>,

    /// Timeout in seconds for each Cloud Storage read (default: none)
    #[arg(long, global = true)]
    pub read_timeout: Option<u64>,
}
