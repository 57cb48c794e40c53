//! ldbt-upload - LookML to DBT Transformer archive upload form
//!
//! `serve` runs the upload form as a local web UI; `submit` runs the same
//! flow from the terminal for a single archive.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ldbt_common::config::{CliOverrides, ConfigResolver, UploaderConfig};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ldbt_upload::client::TransformerClient;
use ldbt_upload::store::{spawn_session_pruner, SessionStore};
use ldbt_upload::{build_router, AppState, FormState, UploadFormController};

/// How often expired sessions are swept
const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

/// Command-line arguments for ldbt-upload
#[derive(Parser, Debug)]
#[command(name = "ldbt-upload")]
#[command(about = "Upload a LookML project archive to the LookML to DBT transformation service")]
#[command(version)]
struct Args {
    /// TOML config file (default: <config dir>/ldbt/ldbt-upload.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Transformation service base URL
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Timeout for each request to the transformation service, in seconds
    #[arg(long, global = true)]
    request_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form as a local web UI
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Upload one archive from the terminal
    Submit {
        /// Path to the .zip archive
        archive: PathBuf,

        /// Email address to notify; prompted for when omitted
        #[arg(short, long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (host, port) = match &args.command {
        Command::Serve { host, port } => (host.clone(), *port),
        Command::Submit { .. } => (None, None),
    };
    let overrides = CliOverrides {
        config_path: args.config.clone(),
        api_base_url: args.api_base_url.clone(),
        host,
        port,
        request_timeout_secs: args.request_timeout_secs,
    };
    let config = ConfigResolver::new(overrides)
        .resolve()
        .context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ldbt_upload={0},ldbt_common={0},tower_http={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Starting ldbt-upload v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Transformation service: {}", config.api_base_url);

    let client = TransformerClient::new(config.api_base_url.clone(), config.request_timeout)
        .context("Failed to create transformation service client")?;
    let controller = UploadFormController::new(Arc::new(client), SessionStore::new());

    match args.command {
        Command::Serve { .. } => serve(controller, &config).await,
        Command::Submit { archive, email } => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout();
            let state = ldbt_upload::terminal::run_submit(
                &controller,
                &archive,
                email,
                &mut input,
                &mut out,
            )
            .await?;

            if matches!(state, FormState::Failed { .. }) {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn serve(controller: UploadFormController, config: &UploaderConfig) -> Result<()> {
    let _pruner = spawn_session_pruner(
        controller.sessions().clone(),
        config.session_ttl,
        PRUNE_INTERVAL,
    );

    let app = build_router(AppState::new(controller));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
