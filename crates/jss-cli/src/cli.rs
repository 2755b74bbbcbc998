use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "jss",
    about = "JSS: multi-tenant JSON document storage over HTTP",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Where configuration comes from, shared by every subcommand.
#[derive(Args, Default)]
pub struct ConfigSource {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Listen address (overrides PORT)
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Directory for file-backed storage (overrides DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    /// Administrative API key (overrides API_KEY)
    #[arg(long)]
    pub admin_key: Option<String>,
}

#[derive(Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub source: ConfigSource,
    /// Show the administrative key instead of masking it
    #[arg(long)]
    pub show_secrets: bool,
}
