use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use super::views::{render_error, render_template, IndexView, ResultView};
use super::{base_url, AppState};
use crate::core::roulette::{self, Mode, RouletteError};

/// Errors a request can end in. Each maps to an HTML error page.
#[derive(Debug)]
pub enum AppError {
    Roulette(RouletteError),
    UnknownMode(String),
}

impl From<RouletteError> for AppError {
    fn from(e: RouletteError) -> Self {
        AppError::Roulette(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Roulette(e) => render_error(StatusCode::BAD_REQUEST, &e.to_string()),
            AppError::UnknownMode(mode) => {
                let message = format!("unknown mode '{}'", mode);
                render_error(StatusCode::NOT_FOUND, &message)
            }
        }
    }
}

pub async fn index(headers: HeaderMap) -> Response {
    render_template(StatusCode::OK, IndexView::new(&base_url(&headers)))
}

/// `/{names}`: the original root route, always a fresh shuffle.
pub async fn legacy_shuffle(
    State(state): State<AppState>,
    Path(names): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    respond(&state, Mode::ShuffleNow, &names, &headers)
}

/// `/{mode}/{*names}`. The names may themselves contain `/`.
pub async fn spin(
    State(state): State<AppState>,
    Path((mode, names)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let mode = Mode::from_route(&mode).ok_or(AppError::UnknownMode(mode))?;
    respond(&state, mode, &names, &headers)
}

/// `/{mode}/` with nothing after the slash.
pub async fn spin_without_names(Path(mode): Path<String>) -> AppError {
    match Mode::from_route(&mode) {
        Some(_) => {
            tracing::warn!(%mode, "Rejected request without names");
            AppError::Roulette(RouletteError::EmptyInput)
        }
        None => AppError::UnknownMode(mode),
    }
}

fn respond(
    state: &AppState,
    mode: Mode,
    names: &str,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let now = state.now();
    let outcome = roulette::spin(names, mode, now, state.utc_offset).map_err(|e| {
        tracing::warn!(%mode, "Rejected names {:?}: {}", names, e);
        e
    })?;
    tracing::debug!(%mode, seed = outcome.seed(), "Spun");

    let view = ResultView::new(outcome, names, &base_url(headers), now, state.utc_offset);
    Ok(render_template(StatusCode::OK, view))
}
