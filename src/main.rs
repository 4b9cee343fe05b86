//! thumbpatch - session login, JSON Patch and remote thumbnails over HTTP.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use thumbpatch::{
    config::Config,
    server::{create_router, AppState, RouterConfig},
    session::{SessionService, TokenSigner},
    thumbnail::{HttpImageSource, ThumbnailService},
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("thumbpatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");

    let signer = match config.token_secret.as_deref() {
        Some(secret) => {
            info!("  Token secret: configured");
            TokenSigner::new(secret, config.token_ttl())
        }
        None => {
            warn!("  Token secret: random (sessions end on restart)");
            TokenSigner::random(config.token_ttl())
        }
    };
    match config.token_ttl {
        Some(ttl) => info!("  Token TTL: {}s", ttl),
        None => info!("  Token TTL: none"),
    }
    info!(
        "  Thumbnails: fetch timeout {}s, process timeout {}s, max {} bytes, quality {}",
        config.fetch_timeout, config.process_timeout, config.max_image_bytes, config.thumbnail_quality
    );

    let source = match HttpImageSource::new(config.fetch_timeout(), config.max_image_bytes) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let thumbnails = ThumbnailService::new(source)
        .with_quality(config.thumbnail_quality)
        .with_fetch_timeout(config.fetch_timeout())
        .with_process_timeout(config.process_timeout());

    let state = AppState::new(SessionService::new(signer), thumbnails);
    let router = create_router(state, build_router_config(&config));

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server stopped");
    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "thumbpatch=debug,tower_http=debug"
    } else {
        "thumbpatch=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

/// Resolve when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
