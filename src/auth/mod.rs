//! # Authentication & Authorization
//!
//! Session-backed access control for the web ingress:
//! - Static credential table (provisioned at startup, never mutated)
//! - Fixed-capacity session store keyed by opaque tokens
//! - Role-derived permission sets
//!
//! The MQTT ingress deliberately bypasses this module; see `mqtt`.

mod credentials;
mod errors;
mod role;
mod session;
mod token;

pub use credentials::{Credential, CredentialStore};
pub use errors::{AuthError, AuthResult};
pub use role::{permissions_for, Permissions, Role};
pub use session::{Session, SessionStore, DEFAULT_CAPACITY, DEFAULT_TIMEOUT_SECS};
pub use token::generate_session_token;
