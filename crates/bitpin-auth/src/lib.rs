//! Bearer token decoding and credential state for the Bitpin API
//!
//! This crate holds everything the REST client needs to know about its
//! credentials without touching the network:
//!
//! - [`DecodedToken`] reads the claims of an access or refresh token (expiry,
//!   subject, token id) without verifying its signature.
//! - [`CredentialStore`] keeps the current tokens and API key pair behind a
//!   lock and answers "can this request be authenticated" questions.
//!
//! # Example
//!
//! ```no_run
//! use bitpin_auth::{CredentialStore, TokenStatus};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load API key and secret from the environment
//!     let store = CredentialStore::from_env()?;
//!
//!     match store.status() {
//!         TokenStatus::AccessValid => println!("ready"),
//!         status => println!("needs attention: {:?}", status),
//!     }
//!
//!     Ok(())
//! }
//! ```

mod credentials;
mod error;
mod token;

pub use credentials::{
    ApiKeyPair, CredentialStore, TokenStatus, ACCESS_TOKEN_ENV, API_KEY_ENV, REFRESH_TOKEN_ENV,
    SECRET_KEY_ENV,
};
pub use error::{AuthError, AuthResult};
pub use token::{DecodedToken, TokenKind};
