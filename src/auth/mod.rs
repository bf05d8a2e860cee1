//! Authentication module
//!
//! Supports: static bearer, OAuth2 refresh token, refresh proxy
//!
//! The `Authenticator` is the credential cache: it asks a `TokenProvider`
//! for a new token only when the cached one has expired.

mod authenticator;
mod types;

pub use authenticator::{Authenticator, OAuthTokenProvider, TokenProvider};
pub use types::{AuthConfig, CachedToken, DEFAULT_TOKEN_URL};

#[cfg(test)]
mod tests;
