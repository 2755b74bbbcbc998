use anyhow::Context;
use colored::Colorize;
use jss_server::{JssServer, ServerConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Config(args) => cmd_config(args),
    }
}

/// Defaults, then the config file, then the environment, then flags.
fn resolve_config(
    source: &ConfigSource,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ServerConfig> {
    let mut config = match &source.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    config.apply_overrides(env)?;
    if let Some(bind) = source.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = &source.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(key) = &source.admin_key {
        config.admin_api_key = Some(key.clone());
    }
    Ok(config)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.source, |name| std::env::var(name).ok())?;
    if config.admin_api_key.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("no administrative API key configured; only account keys will be accepted");
    }
    let storage = match &config.data_dir {
        Some(dir) => dir.display().to_string(),
        None => "in-memory".to_string(),
    };
    println!(
        "{} JSS server on {} (storage: {})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        storage.cyan()
    );

    let server = JssServer::new(config).context("failed to open storage")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.source, |name| std::env::var(name).ok())?;
    let shown = if args.show_secrets {
        config
    } else {
        config.redacted()
    };
    print!("{}", shown.to_toml()?);
    Ok(())
}
