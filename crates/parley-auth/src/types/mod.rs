//! Domain types shared by the storage traits, grant handlers and endpoints.
//!
//! - [`Client`] - OAuth 2.0 client registration
//! - [`GrantType`] - Supported OAuth grant types
//! - [`AuthorizationCode`] - Single-use authorization code
//! - [`Token`] - Access token with optional refresh token
//! - [`User`] - End-user identity

pub mod client;
pub mod code;
pub mod token;
pub mod user;

pub use client::{Client, GrantType};
pub use code::AuthorizationCode;
pub use token::Token;
pub use user::User;
