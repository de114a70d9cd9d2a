//! `orgdir` executable.
//!
//! # Responsibility
//! - Parse flags and environment into a validated [`ServerConfig`].
//! - Bootstrap logging and the database (migrations, optional seed).
//! - Run the HTTP server until Ctrl-C.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use orgdir_core::db::open_db;
use orgdir_core::{default_log_level, init_logging, init_stderr_logging, load_seed_file};
use orgdir_server::config::{DEFAULT_API_KEY, DEFAULT_BIND, DEFAULT_DB_PATH};
use orgdir_server::ServerConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "orgdir",
    about = "Organizations directory lookup service",
    version
)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "ORGDIR_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// SQLite database file (created and migrated when missing)
    #[arg(long, env = "ORGDIR_DB", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    /// Shared key expected in the X-API-Key header
    #[arg(long, env = "ORGDIR_API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    api_key: String,

    /// JSON seed document loaded before serving; the database must be empty
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ORGDIR_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write rolling log files here instead of stderr
    #[arg(long, env = "ORGDIR_LOG_DIR")]
    log_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    match &cli.log_dir {
        Some(dir) => init_logging(level, &dir.to_string_lossy()),
        None => init_stderr_logging(level),
    }
    .map_err(|e| anyhow!("{e}"))?;

    let config = ServerConfig {
        bind: cli.bind,
        db_path: cli.db,
        api_key: cli.api_key,
    };
    config.validate()?;

    let mut conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path.display()))?;
    if let Some(seed) = &cli.seed {
        let rows = load_seed_file(&mut conn, seed)?;
        info!(
            "event=seed_apply module=cli status=ok path={} rows={}",
            seed.display(),
            rows
        );
    }
    drop(conn);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(orgdir_server::serve(config))
        .context("server stopped with an error")
}
