//! HTTP Server
//!
//! axum routes: `GET /` for the info text, `GET /{model}` (with or without a
//! trailing slash) for relaying, and a redirect to `/` for everything else.

use crate::api::NormalizedResult;
use crate::config::ServerConfig;
use crate::error::{RelayError, Result};
use crate::Relay;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Query string of a relay request
#[derive(Debug, Default, Deserialize)]
pub struct PromptQuery {
    pub prompt: Option<String>,
    pub key: Option<String>,
}

/// Build the router over a shared relay
pub fn app(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/", get(info).fallback(redirect_home))
        .route("/{model}", get(relay_prompt).fallback(redirect_home))
        .route("/{model}/", get(relay_prompt).fallback(redirect_home))
        .fallback(redirect_home)
        .with_state(relay)
}

/// Bind the listener and serve until Ctrl+C or SIGTERM
pub async fn serve(relay: Arc<Relay>, config: &ServerConfig) -> Result<()> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| RelayError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        routes = ?relay.endpoints().active_routes().collect::<Vec<_>>(),
        "relaygate listening"
    );

    axum::serve(listener, app(relay))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("relaygate stopped");
    Ok(())
}

async fn info(State(relay): State<Arc<Relay>>) -> String {
    relay.info_text().to_string()
}

async fn relay_prompt(
    State(relay): State<Arc<Relay>>,
    path: std::result::Result<Path<String>, PathRejection>,
    query: std::result::Result<Query<PromptQuery>, QueryRejection>,
) -> Response {
    // A segment that does not decode can never name a route
    let Ok(Path(model)) = path else {
        return redirect_home().await;
    };

    let query = match query {
        Ok(Query(query)) => query,
        // Unknown routes still redirect, whatever the query looks like
        Err(_) if !relay.endpoints().contains(&model) => return redirect_home().await,
        Err(rejection) => {
            tracing::debug!(route = %model, error = %rejection, "malformed query string");
            let details = rejection.body_text();
            let body = NormalizedResult::failure("Invalid query string", Some(details.as_str()));
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match relay
        .relay(&model, query.prompt.as_deref(), query.key.as_deref())
        .await
    {
        Ok(text) => (StatusCode::OK, Json(NormalizedResult::success(text))).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn redirect_home() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        match self {
            RelayError::UnknownRoute(_) => {
                (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
            }
            other => (other.status_code(), Json(other.to_result())).into_response(),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
