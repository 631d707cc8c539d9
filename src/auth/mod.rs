//! Session and credential handling
//!
//! - [`token`] -- token wire format and the in-memory [`Session`].
//! - [`manager`] -- [`SessionManager`], the session lifecycle and refresh
//!   timer.
//! - [`validation`] -- client-side checks run before credentials are sent.

pub mod manager;
pub mod token;
pub mod validation;

pub use manager::SessionManager;
pub use token::{Session, TokenResponse};
pub use validation::{AuthMode, CredentialsForm};
