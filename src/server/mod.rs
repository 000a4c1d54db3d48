//! HTTP ingress
//!
//! One POST endpoint per task kind plus a static health page. Handlers
//! only translate between JSON bodies and the dispatcher.

mod handlers;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::RouterConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::types::TaskKind;

pub use handlers::outcome_response;

/// Body of `GET /`.
pub const HEALTH_PAGE: &str = "<h1>🚀 Glow Stack Mega Backend is ONLINE!</h1>";

/// Seconds suggested to clients after a transient backend failure.
pub const RETRY_AFTER_SECS: u64 = 30;

/// Build the application router around a dispatcher.
pub fn build_router(dispatcher: Dispatcher, body_limit_bytes: usize) -> Router {
    let mut router = Router::new().route("/", get(health));

    for kind in TaskKind::ALL {
        router = router.route(
            kind.path(),
            post(
                move |state: State<Dispatcher>, body: std::result::Result<Bytes, BytesRejection>| {
                    handlers::run_task(kind, state, body)
                },
            ),
        );
    }

    router
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(dispatcher)
}

async fn health() -> Html<&'static str> {
    Html(HEALTH_PAGE)
}

/// Bind the configured address and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &RouterConfig, dispatcher: Dispatcher) -> Result<()> {
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.map_err(|e| Error::ServerBind {
        addr: addr.clone(),
        source: e,
    })?;

    let app = build_router(dispatcher, config.body_limit_bytes());

    info!(
        addr = %addr,
        body_limit_mb = config.server.body_limit_mb,
        endpoints = TaskKind::ALL.len(),
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on the first shutdown signal. A handler that cannot be
/// installed never fires instead of aborting the server.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
