//! HTML pages rendered with `minijinja`.
//!
//! Templates are compiled into the binary and registered under `.html`
//! names, so `minijinja` HTML-escapes every interpolated value.

use minijinja::{Environment, context};
use serde::Serialize;
use skywatch_tracker::TrackerStatus;

/// A template failed to load or render.
#[derive(Debug, thiserror::Error)]
#[error("template {template}: {source}")]
pub struct PageError {
    /// The template involved.
    template: &'static str,
    /// The underlying template error.
    source: minijinja::Error,
}

/// Values shown on the status page.
#[derive(Debug, Serialize)]
pub struct IndexContext<'a> {
    /// Live trackers.
    pub trackers: &'a [TrackerStatus],
    /// Connected `WebSocket` clients.
    pub subscribers: usize,
    /// Poll interval in milliseconds.
    pub poll_interval_ms: u128,
}

/// The relay's HTML pages.
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    /// Register the built-in templates.
    pub fn new() -> Result<Self, PageError> {
        let mut env = Environment::new();
        for (name, source) in [
            ("login.html", include_str!("../templates/login.html")),
            ("index.html", include_str!("../templates/index.html")),
        ] {
            env.add_template(name, source).map_err(|source| PageError {
                template: name,
                source,
            })?;
        }
        Ok(Self { env })
    }

    /// Render the login form, optionally with an error banner.
    pub fn login(&self, error: Option<&str>, next: &str) -> Result<String, PageError> {
        self.render("login.html", context! { error => error, next => next })
    }

    /// Render the status page.
    pub fn index(&self, ctx: &IndexContext<'_>) -> Result<String, PageError> {
        self.render("index.html", context! { page => ctx })
    }

    fn render(&self, template: &'static str, ctx: minijinja::Value) -> Result<String, PageError> {
        self.env
            .get_template(template)
            .and_then(|tpl| tpl.render(ctx))
            .map_err(|source| PageError { template, source })
    }
}
