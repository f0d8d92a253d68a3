//! Herald is a notification dispatch gateway.
//!
//! It accepts an inbound message over HTTP (`POST /send`) and relays it to
//! one or more pre-configured notification channels by invoking an external
//! sender binary (shoutrrr-compatible) as a subprocess, once per selected
//! channel. Routing is tag-based: untagged requests go to the channels
//! marked `is_default`, tagged requests go to every channel whose tag set
//! intersects the requested tags.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, health).
//! - [`config`] -- Channel configuration loading and validation.
//! - [`dispatch`] -- Core routing: channel selection, per-channel message
//!   formatting, concurrent fan-out, and outcome aggregation.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`health`] -- `GET /health` endpoint handler returning runtime diagnostics.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- API-key authentication for the dispatch endpoint.
//! - [`sender`] -- The delivery port: subprocess invocation of the sender binary.
//! - [`server`] -- Axum server setup, shared application state, and graceful
//!   shutdown.
//! - [`verify`] -- Startup verification of the sender binary and channel URLs.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `sentry-integration` | Sentry error tracking |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod sender;
pub mod server;
pub mod verify;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
