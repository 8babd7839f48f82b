//! Authentication module for the session credential.
//!
//! This module provides:
//! - `SessionContext`: the shared, injectable holder of the session token
//! - `CredentialStore`: optional OS-level password storage via keyring
//!
//! The token is opaque to the client. It is set on login and cleared on
//! logout or when the server answers 401.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{SessionContext, SessionData, SessionState};
