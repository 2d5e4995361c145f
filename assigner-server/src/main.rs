//! Assigner CLI - runs the reviewer assignment service

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use assigner_core::{Config, InMemoryStore, ReviewerSelector, Services};
use assigner_db::Database;
use assigner_server::{router, server, AppState};
use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Reviewer assigner: random pull request reviewer assignment service
#[derive(Parser, Debug)]
#[command(name = "assigner")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ~/.config/assigner/config.toml)
    #[arg(long, global = true, env = "ASSIGNER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    #[command(visible_alias = "s")]
    Serve(ServeArgs),

    /// Apply database migrations and exit
    Migrate,

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Listen address (overrides config and env)
    #[arg(long)]
    addr: Option<String>,

    /// Keep all state in memory instead of PostgreSQL
    #[arg(long)]
    memory: bool,
}

const VERBOSE_FILTER: &str = "info,assigner=debug,assigner_core=debug,assigner_db=debug,assigner_server=debug";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { VERBOSE_FILTER } else { "info" })
    });
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let command = cli.command.unwrap_or(Commands::Serve(ServeArgs::default()));
    let addr = match &command {
        Commands::Serve(args) => args.addr.clone(),
        _ => None,
    };
    let config = Config::load_with_overrides(cli.config.as_deref(), addr)?;

    if cli.verbose {
        tracing::info!(
            addr = %config.server.addr,
            db_host = %config.database.host,
            db_name = %config.database.name,
            "Configuration loaded"
        );
    }

    match command {
        Commands::Serve(args) => serve(config, args.memory).await?,
        Commands::Migrate => {
            let db = Database::connect(&config.database)
                .await
                .context("Failed to connect to database")?;
            db.migrate().await.context("Failed to run migrations")?;
            tracing::info!("Migrations applied");
            db.close().await;
        }
        Commands::Config => print_config(&config, cli.config.as_deref()),
        Commands::Version => {
            println!("assigner {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

async fn serve(config: Config, memory: bool) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    server::spawn_signal_handler(shutdown.clone());

    let selector = ReviewerSelector::secure();
    let (services, db) = if memory {
        tracing::warn!("Using in-memory store, state is lost on exit");
        let store = Arc::new(InMemoryStore::new());
        (
            Services::from_store(store, selector, &config.assignment),
            None,
        )
    } else {
        let db = Database::connect(&config.database)
            .await
            .context("Failed to connect to database")?;
        db.migrate().await.context("Failed to run migrations")?;
        let services = Services::new(
            Arc::new(db.teams()),
            Arc::new(db.users()),
            Arc::new(db.pull_requests()),
            selector,
            &config.assignment,
        );
        (services, Some(db))
    };

    let health = db.as_ref().map(|db| {
        assigner_db::spawn_health_check(db.clone(), config.database.pool.health_check_interval)
    });

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let app = router(AppState::new(services), config.server.request_timeout);

    let result = server::run(listener, app, shutdown, config.server.shutdown_grace).await;

    if let Some(health) = health {
        health.abort();
    }
    if let Some(db) = db {
        db.close().await;
        tracing::info!("Database pool closed");
    }

    result.context("Server error")
}

fn print_config(config: &Config, path: Option<&std::path::Path>) {
    println!("Assigner Configuration");
    println!("======================");
    println!();
    println!("Server Settings:");
    println!("  addr: {}", config.server.addr);
    println!(
        "  request_timeout: {}s",
        config.server.request_timeout.as_secs()
    );
    println!("  shutdown_grace: {}s", config.server.shutdown_grace.as_secs());
    println!();
    println!("Database Settings:");
    println!("  host: {}", config.database.host);
    println!("  port: {}", config.database.port);
    println!("  user: {}", config.database.user);
    println!("  password: (hidden)");
    println!("  name: {}", config.database.name);
    println!("  ssl_mode: {}", config.database.ssl_mode);
    println!(
        "  pool: max {} / min {} connections",
        config.database.pool.max_connections, config.database.pool.min_connections
    );
    println!();
    println!("Assignment Settings:");
    println!("  reviewer_quota: {}", config.assignment.reviewer_quota);
    println!();

    let path = path.map(PathBuf::from).or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}
