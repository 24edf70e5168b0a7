//! Wakeward is a Wake-on-LAN HTTP reverse proxy.
//!
//! It receives incoming HTTP requests, resolves the `Host` header to a
//! configured backend service, and — if the backend does not answer its
//! health endpoint — sends Wake-on-LAN magic packets and polls until the
//! machine comes up or a retry budget is exhausted. The original request
//! is then forwarded and the response streamed back to the caller.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate).
//! - [`config`] -- Service registry loading from file and environment via
//!   the [`ConfigSource`](config::ConfigSource) trait.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`probe`] -- Bounded-timeout health probing of backends.
//! - [`proxy`] -- Core request pipeline: host resolution, the wake/probe
//!   retry loop, and streaming request forwarding.
//! - [`server`] -- Axum server setup, shared application state, HTTP client,
//!   and graceful shutdown.
//! - [`wake`] -- MAC address parsing and Wake-on-LAN magic packet delivery.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod probe;
pub mod proxy;
pub mod server;
pub mod wake;
