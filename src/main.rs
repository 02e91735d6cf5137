use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use testdata_buddy::config::Config;
use testdata_buddy::db::{ArtifactKind, ArtifactStorage};
use testdata_buddy::{BuddyError, BuddyState, buddy_router, service};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "testdata-buddy", version, about = "Test data generation service")]
struct Cli {
    /// Overrides BUDDY_DATABASE_URL.
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Overrides BUDDY_LISTEN_ADDR.
        #[arg(long)]
        listen: Option<String>,
    },
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create missing tables and indexes.
    #[command(alias = "migrate")]
    Init,
    /// Drop every artifact table and recreate the schema.
    Reset,
    /// Delete expired rows.
    Cleanup,
    /// Row counts per table.
    Stats,
    /// Print the newest stored artifacts of one kind.
    Recent {
        /// password, uuid, personal-info or file.
        kind: ArtifactKind,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
    /// Copy the database to a new file.
    Backup { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let loaded = Config::load();
    let loglevel = loaded
        .as_ref()
        .map(|cfg| cfg.loglevel.clone())
        .unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let mut cfg = match loaded {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return Err(e.into());
        }
    };
    if let Some(url) = cli.database_url {
        cfg.database_url = url;
    }

    let result = match cli.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            if let Some(addr) = listen {
                cfg.listen_addr = addr;
            }
            serve(cfg).await
        }
        Command::Db { action } => db_command(&cfg, action).await,
    };

    if let Err(e) = &result {
        error!(error = %e, "command failed");
    }
    result.map_err(Into::into)
}

async fn serve(cfg: Config) -> Result<(), BuddyError> {
    info!(
        database_url = %cfg.database_url,
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        environment = %cfg.environment,
        admin_enabled = !cfg.admin_key.is_empty(),
        max_file_size = cfg.file_size_limit(),
    );

    let storage = ArtifactStorage::connect(&cfg.database_url).await?;
    let janitor = service::janitor_actor::spawn(
        storage.clone(),
        Duration::from_secs(cfg.cleanup_interval_secs),
    )
    .await?;

    match janitor.sweep_now().await {
        Ok(report) => info!(deleted = report.total(), "startup expiry sweep done"),
        Err(e) => error!(error = %e, "startup expiry sweep failed"),
    }

    let state = BuddyState::new(storage, janitor.clone(), &cfg);
    let app = buddy_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    janitor.stop();
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

async fn db_command(cfg: &Config, action: DbAction) -> Result<(), BuddyError> {
    let storage = ArtifactStorage::connect(&cfg.database_url).await?;
    match action {
        DbAction::Init => {
            info!(database_url = %cfg.database_url, "schema ready");
        }
        DbAction::Reset => {
            storage.reset().await?;
            info!(database_url = %cfg.database_url, "database reset");
        }
        DbAction::Cleanup => {
            let report = storage.cleanup_expired(Utc::now()).await?;
            for (kind, deleted) in &report.deleted {
                info!(table = kind.table(), deleted, "expired rows removed");
            }
            info!(total = report.total(), "cleanup finished");
        }
        DbAction::Stats => {
            let stats = storage.stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        DbAction::Recent { kind, limit } => {
            let rows = storage.list_recent(kind, limit).await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        DbAction::Backup { path } => {
            storage.backup(&path).await?;
            info!(path = %path.display(), "backup written");
        }
    }
    Ok(())
}
