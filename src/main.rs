use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liftlog::config::Config;
use liftlog::habits::ReminderJob;
use liftlog::notifications::Mailer;
use liftlog::AppState;

#[derive(Parser, Debug)]
#[command(name = "liftlog")]
#[command(author, version, about = "A lightweight fitness class scheduling and habit tracking server", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "liftlog.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Liftlog v{}", env!("CARGO_PKG_VERSION"));

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir)?;

    // Initialize database
    let db = liftlog::db::init(&config.server.data_dir).await?;

    // Build the mailer when SMTP is configured
    let mailer = match &config.reminders.smtp {
        Some(smtp) => Some(Arc::new(Mailer::from_config(smtp)?)),
        None => {
            tracing::info!("SMTP not configured; habit reminders will not be delivered");
            None
        }
    };

    // Start the habit reminder job
    let reminder_job = ReminderJob::new(db.clone(), config.reminders.clone(), mailer);
    tokio::spawn(async move {
        reminder_job.run().await;
    });

    // Create app state and API router
    let state = Arc::new(AppState::new(config.clone(), db));
    let app = liftlog::api::create_router(state);

    // Start API server
    let api_addr = format!("{}:{}", config.server.host, config.server.api_port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;

    tracing::info!("API server listening on http://{}", api_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
