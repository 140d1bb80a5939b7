//! HTTP front end.
//!
//! ```text
//! /                       index
//! /{names}                shuffle now (legacy root route)
//! /shuffle/{names}        shuffle now
//! /shuffle-today/{names}  shuffle, stable for the day
//! /pick/{names}           pick one now
//! /pick-today/{names}     pick one, stable for the day
//! ```
//!
//! Everything after the mode segment is the name list, so names may
//! contain an encoded or literal `/`.

pub mod handlers;
pub mod views;

use anyhow::{Context, Result};
use axum::{http::HeaderMap, routing::get, Router};
use chrono::{DateTime, FixedOffset, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use url::Url;

use crate::core::config::Settings;
use crate::core::roulette::Mode;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub utc_offset: FixedOffset,
    clock: Clock,
}

impl AppState {
    pub fn new(utc_offset: FixedOffset) -> Self {
        AppState {
            utc_offset,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replace the wall clock to pin the instant.
    #[cfg(test)]
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        // One parameter name per position: the first segment is a name
        // list on the legacy route and a mode everywhere else.
        .route("/{first}", get(handlers::legacy_shuffle))
        .route("/{first}/", get(handlers::spin_without_names))
        .route("/{first}/{*names}", get(handlers::spin))
        .with_state(state)
}

/// Run the server until Ctrl-C.
pub async fn serve(settings: Settings) -> Result<()> {
    let addr = SocketAddr::new(settings.bind, settings.port);
    let app = build_router(AppState::new(settings.utc_offset));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(day_offset = %settings.utc_offset, "Server started at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Base URL of the incoming request, from `X-Forwarded-Proto` and `Host`.
/// A host with anything beyond name, port and IPv6 characters falls back
/// to `localhost`.
pub fn base_url(headers: &HeaderMap) -> Url {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    let proto = match header("x-forwarded-proto") {
        Some(p) if p.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };
    let host = header("host")
        .filter(|h| h.chars().all(is_host_char))
        .unwrap_or("localhost");

    Url::parse(&format!("{}://{}/", proto, host))
        .ok()
        .filter(|u| u.path() == "/" && u.query().is_none())
        .unwrap_or_else(fallback_base)
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']')
}

fn fallback_base() -> Url {
    Url::parse("http://localhost/").expect("static url parses")
}

/// Absolute link to `names` under `mode`. Path-segment encoding is applied.
pub fn mode_link(base: &Url, mode: Mode, names: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(mode.route()).push(names);
    }
    url.into()
}
