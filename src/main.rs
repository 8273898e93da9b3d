use std::path::PathBuf;

use bookmarks::config::{Cli, Config, Environment};
use bookmarks::handler::AppState;
use bookmarks::routes;
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the real environment still applies.
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let config_path = args.config_path.map(PathBuf::from);
    let cfg = match Config::new(config_path.as_deref()) {
        Ok(cfg) => cfg.with_port(args.port),
        Err(e) => {
            eprintln!("failed to load config {:?}: {}", config_path, e);
            std::process::exit(1);
        }
    };

    init_tracing(cfg.app.environment);
    tracing::info!(environment = %cfg.app.environment, "bookmarks.svc starting");

    let state = AppState::from_config(&cfg);
    let app = routes::app(state);

    let address = format!("0.0.0.0:{}", cfg.app.get_port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to setup tcp listener");
        std::process::exit(1);
    });

    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl+c signal received, preparing to shutdown");
                signal_token.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl+c"),
        }
    });

    tracing::info!("bookmarks.svc running on {}", &address);
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(cancellation_token.cancelled_owned())
        .await;
    if let Err(err) = result {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }

    tracing::info!("bookmarks.svc going off, graceful shutdown complete");
}

fn init_tracing(environment: Environment) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if environment.is_production() {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
