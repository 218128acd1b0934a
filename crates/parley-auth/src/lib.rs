//! # parley-auth
//!
//! Embedded OAuth 2.0 authorization server for Parley.
//!
//! This crate provides:
//! - The authorization endpoint with a consent (decide) step
//! - The token endpoint with the `authorization_code` (plus PKCE),
//!   `password`, `client_credentials` and `refresh_token` grants
//! - Token revocation
//! - Browser login/logout backing the consent flow
//!
//! Persistence is abstracted behind the traits in [`storage`]; the
//! `parley-auth-memory` crate implements them in memory.
//!
//! ## Modules
//!
//! - [`config`] - OAuth configuration
//! - [`error`] - Infrastructure errors
//! - [`scope`] - Scopes and scope sets
//! - [`types`] - Clients, codes, tokens and users
//! - [`storage`] - Storage traits
//! - [`token`] - Secret generation and token minting
//! - [`oauth`] - Authorization logic, PKCE, client authentication, protocol errors
//! - [`grant`] - Token endpoint grants
//! - [`http`] - Axum handlers and router

pub mod config;
pub mod error;
pub mod grant;
pub mod http;
pub mod oauth;
pub mod scope;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{ConfigError, OAuthConfig, SessionConfig};
pub use error::AuthError;
pub use http::{AuthBackends, AuthState, oauth_router};
pub use scope::{Scope, ScopeSet};
pub use storage::{
    AuthorizationCodeStorage, BrowserSession, ClientStorage, SessionStore, TokenStorage,
    UserDirectory,
};
pub use types::{AuthorizationCode, Client, GrantType, Token, User};

/// Type alias for authentication/authorization results.
pub type AuthResult<T> = Result<T, AuthError>;
