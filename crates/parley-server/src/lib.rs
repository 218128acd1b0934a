//! HTTP server hosting the Parley OAuth 2.0 authorization server.
//!
//! Loads [`AppConfig`], seeds the in-memory stores and serves the router
//! built by [`build_app`].

pub mod bootstrap;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use observability::init_tracing;
pub use server::{ParleyServer, ServerBuilder, build_app};
