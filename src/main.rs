mod api;
mod config;
mod error;
mod session;
mod shell;
mod view;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::client::HttpClient;
use crate::config::{AppConfig, ServerConfig};
use crate::session::{RefreshPolicy, Session};

/// An interactive shell for a remote file management server.
#[derive(Parser, Debug)]
#[command(name = "rfm", version, about)]
struct Cli {
    /// Server base URL (overrides the configured one)
    url: Option<String>,

    /// Path prefix the server is mounted under, e.g. "/filesuploader"
    #[arg(long)]
    prefix: Option<String>,

    /// Explicit config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never interleave with the prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let overrides = AppConfig {
        server: ServerConfig {
            url: cli.url,
            prefix: cli.prefix,
            ..Default::default()
        },
        ..Default::default()
    };
    let cfg = AppConfig::load(cli.config.as_deref(), Some(&overrides));

    let client = HttpClient::new(cfg.server_url(), cfg.prefix(), cfg.connect_timeout())?;
    let policy = RefreshPolicy {
        attempts: cfg.refresh_attempts(),
        delay: cfg.refresh_delay(),
    };
    let session = Session::new(client, policy);

    println!("rfm {}{}", cfg.server_url(), cfg.prefix());
    shell::run(&session, cfg.confirm_delete()).await
}
