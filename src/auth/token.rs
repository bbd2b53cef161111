//! # Session Tokens
//!
//! Opaque session identifiers: 128 bits of OS randomness rendered as hex.
//! Practically unguessable within a session's lifetime; collisions among
//! live sessions are accepted as negligible rather than eliminated.

use rand::rngs::OsRng;
use rand::RngCore;

/// Generates a fresh 32-character hex session token.
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
