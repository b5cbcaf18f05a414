use axum::Router;
use chrono::Utc;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wind_banner::config::Config;
use wind_banner::db::{AppState, create_pool, init_db};
use wind_banner::handlers;

#[derive(Parser, Debug)]
#[command(name = "wind-banner")]
#[command(about = "Single-use license codes for the Wind Banner bot")]
struct Cli {
    /// Mint one license code of the given plan (7D, 30D, PERM, ...) as the host operator, print it, and exit
    #[arg(long, value_name = "PLAN")]
    generate: Option<String>,

    /// Delete the database on exit (dev mode only, useful for fresh starts)
    #[arg(long)]
    ephemeral: bool,
}

/// Mint a code from the host shell. Whoever runs the binary holds admin rights.
fn generate_from_cli(state: &AppState, plan: &str) -> Result<(), String> {
    let code = state
        .registry
        .create_code(plan, true, Utc::now().timestamp())
        .map_err(|e| format!("Failed to create license code: {}", e))?;

    println!("{}", code.code);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wind_banner=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let state = AppState::new(db_pool, &config.code_prefix, config.service_token.clone());

    if let Some(plan) = cli.generate.as_deref() {
        if let Err(e) = generate_from_cli(&state, plan) {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if config.service_token.is_none() {
        tracing::warn!("SERVICE_TOKEN not set: the interaction API is unauthenticated");
    }

    let app = Router::new()
        .merge(handlers::router(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let cleanup_on_exit = cli.ephemeral && config.dev_mode;
    let db_path = config.database_path.clone();

    if cli.ephemeral && !config.dev_mode {
        tracing::warn!("--ephemeral flag ignored: not in dev mode (set WIND_BANNER_ENV=dev)");
    }
    if cleanup_on_exit {
        tracing::info!("EPHEMERAL MODE: database will be deleted on exit");
    }

    tracing::info!("Wind Banner license service listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cleanup_on_exit {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
