//! HTTP front end for the `hexbot` color service.
//!
//! - [`config`]: CLI and environment configuration.
//! - [`request`]: query decoding and seed filtering.
//! - [`handler`]: the axum router and its single route.
//! - [`error`]: request-level errors and their HTTP mapping.
//! - [`telemetry`]: structured logging.

pub mod config;
pub mod error;
pub mod handler;
pub mod request;
pub mod telemetry;
