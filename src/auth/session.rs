//! # Session Store
//!
//! Fixed-capacity pool of authenticated sessions keyed by opaque token.
//!
//! ## Invariants
//! - At most `capacity` live sessions at any time.
//! - A new login never fails: when the pool is full, the session with the
//!   oldest creation time is evicted and overwritten (availability over
//!   fairness).
//! - Expired sessions are indistinguishable from absent ones: validation
//!   clears the slot and reports "not found".

use chrono::{DateTime, Duration, Utc};
use subtle::ConstantTimeEq;

use super::role::Role;
use super::token::generate_session_token;

/// Default number of session slots.
pub const DEFAULT_CAPACITY: usize = 10;

/// Default session lifetime in seconds (1 hour).
pub const DEFAULT_TIMEOUT_SECS: i64 = 3600;

/// Server-held proof of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Fixed-capacity session pool with oldest-creation eviction.
#[derive(Debug)]
pub struct SessionStore {
    slots: Vec<Option<Session>>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(capacity: usize, timeout: Duration) -> Self {
        Self {
            slots: vec![None; capacity],
            timeout,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CAPACITY, Duration::seconds(DEFAULT_TIMEOUT_SECS))
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots. Expired-but-unswept sessions count until
    /// a lookup or sweep clears them.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Mints a session for a freshly authenticated user and returns its
    /// token. Placement: first empty slot, else evict the session with the
    /// strictly oldest creation time. Never rejects a login.
    pub fn create_session(&mut self, username: &str, role: Role) -> String {
        self.create_session_at(username, role, Utc::now())
    }

    pub fn create_session_at(&mut self, username: &str, role: Role, now: DateTime<Utc>) -> String {
        let token = generate_session_token();
        let session = Session {
            token: token.clone(),
            username: username.to_string(),
            role,
            created_at: now,
        };

        let slot = match self.slots.iter().position(|s| s.is_none()) {
            Some(empty) => empty,
            None => self.oldest_slot(),
        };
        self.slots[slot] = Some(session);
        token
    }

    /// Looks up a live session by token. Expired sessions are cleared
    /// during lookup and report as absent, not as "found but expired".
    pub fn validate(&mut self, token: &str) -> Option<&Session> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&mut self, token: &str, now: DateTime<Utc>) -> Option<&Session> {
        let idx = self.find_slot(token)?;

        let expired = {
            let session = self.slots[idx].as_ref()?;
            now - session.created_at > self.timeout
        };
        if expired {
            self.slots[idx] = None;
            return None;
        }
        self.slots[idx].as_ref()
    }

    /// Clears the slot holding `token` (logout). No-op on an absent token.
    pub fn invalidate(&mut self, token: &str) {
        if let Some(idx) = self.find_slot(token) {
            self.slots[idx] = None;
        }
    }

    /// Proactively clears every expired slot, independent of lookups.
    /// Bounds slot pressure from abandoned sessions; returns how many
    /// slots were cleared.
    pub fn sweep_expired(&mut self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    pub fn sweep_expired_at(&mut self, now: DateTime<Utc>) -> usize {
        let timeout = self.timeout;
        let mut cleared = 0;
        for slot in &mut self.slots {
            let expired = slot
                .as_ref()
                .is_some_and(|s| now - s.created_at > timeout);
            if expired {
                *slot = None;
                cleared += 1;
            }
        }
        cleared
    }

    fn find_slot(&self, token: &str) -> Option<usize> {
        self.slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|s| token_eq(&s.token, token))
        })
    }

    /// Index of the session with the smallest creation time. Only called
    /// when every slot is occupied.
    fn oldest_slot(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (i, s.created_at)))
            .min_by_key(|&(_, created)| created)
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Constant-time token comparison. Length mismatch short-circuits; token
/// length is not a secret.
fn token_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}
