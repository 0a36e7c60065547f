// redis-dump - dump a Redis database as replay commands or JSON

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value as JsonValue;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use redis_dump::{DumpConfig, RedisDump};

/// Get default config path (~/.redis-dump/config.yaml)
fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".redis-dump").join("config.yaml"))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 日志写到 stderr，stdout 只输出导出结果
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config file (explicit path, or the default one when it exists) and apply CLI overrides
fn resolve_config(cli: &Cli) -> Result<DumpConfig> {
    let mut config = match &cli.config {
        Some(path) => DumpConfig::from_file(shellexpand::tilde(path).to_string())?,
        None => match default_config_path() {
            Some(path) if path.exists() => DumpConfig::from_file(&path)?,
            _ => DumpConfig::default(),
        },
    };

    if cli.has_connection_overrides() {
        if config.client.type_name != "RedisStoreClient" {
            anyhow::bail!(
                "Connection flags require a RedisStoreClient, config uses '{}'",
                config.client.type_name
            );
        }

        if !config.client.options.is_object() {
            config.client.options = JsonValue::Object(serde_json::Map::new());
        }
        let options = config
            .client
            .options
            .as_object_mut()
            .context("client options must be an object")?;

        if let Some(host) = &cli.host {
            options.insert("host".to_string(), JsonValue::from(host.clone()));
            options.remove("endpoint");
        }
        if let Some(port) = cli.port {
            options.insert("port".to_string(), JsonValue::from(port));
            options.remove("endpoint");
        }
        if let Some(password) = &cli.password {
            options.insert("password".to_string(), JsonValue::from(password.clone()));
        }
        if let Some(username) = &cli.username {
            options.insert("username".to_string(), JsonValue::from(username.clone()));
        }
        if let Some(db) = cli.db {
            options.insert("db".to_string(), JsonValue::from(db));
        }
    }

    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(output) = &cli.output {
        config.output = Some(output.clone());
    }
    if cli.pretty {
        config.pretty = true;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    let dump = RedisDump::from_type_options(&config.client)
        .context("Failed to create store client")?;

    let output = dump.dump(config.format).await.context("Export failed")?;
    let text = output.to_text(config.pretty)?;

    match &config.output {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            fs::write(&path, text.as_bytes())
                .with_context(|| format!("Failed to write output file: {}", path))?;
            info!(path = %path, bytes = text.len(), "dump written");
        }
        None => {
            print!("{}", text);
            if config.pretty && !text.ends_with('\n') {
                println!();
            }
        }
    }

    Ok(())
}
