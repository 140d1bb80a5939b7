//! Askama view models. Templates live in `templates/` and escape every
//! name before it reaches the markup.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset, Utc};
use url::Url;

use super::mode_link;
use crate::core::roulette::{Mode, Outcome};

/// Example list shown on the index page.
pub const EXAMPLE_NAMES: &str = "klaus,linus,jonas,julia";

pub struct ModeLink {
    pub label: &'static str,
    pub href: String,
}

impl ModeLink {
    fn new(base: &Url, mode: Mode, names: &str) -> Self {
        ModeLink {
            label: label(mode),
            href: mode_link(base, mode, names),
        }
    }
}

pub fn label(mode: Mode) -> &'static str {
    match mode {
        Mode::ShuffleNow => "Shuffle",
        Mode::ShuffleDaily => "Shuffle (today)",
        Mode::PickNow => "Pick one",
        Mode::PickDaily => "Pick one (today)",
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexView {
    pub examples: Vec<ModeLink>,
}

impl IndexView {
    pub fn new(base: &Url) -> Self {
        IndexView {
            examples: Mode::ALL
                .into_iter()
                .map(|m| ModeLink::new(base, m, EXAMPLE_NAMES))
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultView {
    pub heading: &'static str,
    pub names: Vec<String>,
    pub picked: Option<String>,
    /// Set for daily modes: the day the result is pinned to.
    pub day: Option<String>,
    pub others: Vec<ModeLink>,
}

impl ResultView {
    /// `raw` is the name list as requested; it feeds the links to the other modes.
    pub fn new(
        outcome: Outcome,
        raw: &str,
        base: &Url,
        now: DateTime<Utc>,
        day_offset: FixedOffset,
    ) -> Self {
        let mode = outcome.mode();
        let day = mode.is_daily().then(|| {
            format!(
                "{} (UTC{})",
                now.with_timezone(&day_offset).format("%Y-%m-%d"),
                day_offset
            )
        });
        let others = Mode::ALL
            .into_iter()
            .filter(|m| *m != mode)
            .map(|m| ModeLink::new(base, m, raw))
            .collect();

        let (names, picked) = match outcome {
            Outcome::Shuffled { names, .. } => (names, None),
            Outcome::Picked { name, .. } => (Vec::new(), Some(name)),
        };

        ResultView {
            heading: label(mode),
            names,
            picked,
            day,
            others,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    pub status: u16,
    pub message: String,
}

/// Render a template, falling back to a plain 500 if rendering fails.
pub fn render_template<T: Template>(status: StatusCode, template: T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Template rendering failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template rendering error").into_response()
        }
    }
}

pub fn render_error(status: StatusCode, message: &str) -> Response {
    render_template(
        status,
        ErrorView {
            status: status.as_u16(),
            message: message.to_string(),
        },
    )
}
