//! Relay server for the SkyWatch live aircraft tracker.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Login gate** (`/login`, `/logout`, `/api/check_auth`) guarding
//!   everything else behind a single shared password
//! - **One-shot lookup** (`POST /api/aircraft`) against the ADS-B provider
//! - **`WebSocket` endpoint** (`/ws`) accepting `start_tracking` /
//!   `stop_tracking` commands and pushing every aircraft update to every
//!   connected client via the tracker's [`UpdateHub`]
//! - **Status** (`GET /api/tracking`, `GET /`) showing active trackers
//!
//! # Architecture
//!
//! All tracking state lives in the [`TrackingRegistry`] held by
//! [`AppState`]. Handlers only call its start/stop/status operations;
//! pollers run on their own Tokio tasks and never touch the HTTP layer.
//!
//! [`UpdateHub`]: skywatch_tracker::UpdateHub
//! [`TrackingRegistry`]: skywatch_tracker::TrackingRegistry

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod pages;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use config::{AppConfig, ConfigError};
pub use router::build_router;
pub use server::{ServerConfig, ServerError, serve, start_server};
pub use state::{AppState, AuthSettings};
