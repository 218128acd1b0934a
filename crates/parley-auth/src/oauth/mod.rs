//! OAuth 2.0 authorization server core.
//!
//! - [`authorize`] - Request/response types for the authorization endpoint
//! - [`service`] - Authorization and decision logic
//! - [`pending`] - Requests staged between authorize and decide
//! - [`consent`] - Silent consent for `prompt=none`
//! - [`client_auth`] - Client authentication at the token endpoint
//! - [`pkce`] - PKCE challenge acceptance and verification
//! - [`response_type`] - `response_type` decoding
//! - [`token`] - Token endpoint request/response types
//! - [`error`] - Protocol error taxonomy and its two transports

pub mod authorize;
pub mod client_auth;
pub mod consent;
pub mod error;
pub mod pending;
pub mod pkce;
pub mod response_type;
pub mod service;
pub mod token;

pub use authorize::{AuthorizationRequest, AuthorizationResponse};
pub use client_auth::{ClientCredentials, authenticate_client, extract_credentials, parse_basic_auth};
pub use consent::ConsentEvaluator;
pub use error::{AuthorizationError, ErrorCode, TokenError, TokenErrorBody};
pub use pending::PendingAuthorization;
pub use pkce::{CodeChallenge, PkceError, PkceMethod};
pub use response_type::{ResponseType, ResponseTypeError};
pub use service::{AuthorizationService, AuthorizeOutcome, Decision};
pub use token::{TokenRequest, TokenResponse};
