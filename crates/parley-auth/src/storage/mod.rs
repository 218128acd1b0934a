//! Storage traits for the authorization server's collaborators.
//!
//! Backends implement these traits; the in-memory backend lives in the
//! `parley-auth-memory` crate.

pub mod client;
pub mod code;
pub mod session;
pub mod token;
pub mod user;

pub use client::ClientStorage;
pub use code::AuthorizationCodeStorage;
pub use session::{BrowserSession, SessionStore};
pub use token::TokenStorage;
pub use user::UserDirectory;
