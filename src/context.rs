//! # Application Context
//!
//! Every process-wide singleton (device state, session store, activity
//! log, credential table, hardware driver) constructed once at boot and
//! handed to each component by reference. There are no ambient globals;
//! single-instance semantics come from ownership, not statics.

use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use chrono::Duration;

use crate::auth::{CredentialStore, SessionStore};
use crate::config::AppConfig;
use crate::device::{ActivityLog, ActuatorDriver, LedState};

/// Shared handles for both ingress paths and the resilience loop.
pub struct AppContext {
    pub config: AppConfig,
    pub credentials: CredentialStore,
    sessions: Mutex<SessionStore>,
    led: RwLock<LedState>,
    activity: RwLock<ActivityLog>,
    pub driver: Arc<dyn ActuatorDriver>,
    started: Instant,
}

impl AppContext {
    pub fn new(config: AppConfig, driver: Arc<dyn ActuatorDriver>) -> Arc<Self> {
        let credentials = if config.users.is_empty() {
            CredentialStore::builtin()
        } else {
            CredentialStore::new(config.users.clone())
        };
        let sessions = SessionStore::new(
            config.session.capacity,
            Duration::seconds(config.session.timeout_secs),
        );
        let led = LedState::new(config.device.brightness);
        let activity = ActivityLog::new(config.device.log_capacity);

        Arc::new(Self {
            config,
            credentials,
            sessions: Mutex::new(sessions),
            led: RwLock::new(led),
            activity: RwLock::new(activity),
            driver,
            started: Instant::now(),
        })
    }

    /// Session store guard. Validation mutates (lazy expiry), so even
    /// lookups take the exclusive lock.
    pub fn sessions(&self) -> MutexGuard<'_, SessionStore> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn led(&self) -> RwLockReadGuard<'_, LedState> {
        self.led.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn led_mut(&self) -> RwLockWriteGuard<'_, LedState> {
        self.led.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn activity(&self) -> RwLockReadGuard<'_, ActivityLog> {
        self.activity.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn activity_mut(&self) -> RwLockWriteGuard<'_, ActivityLog> {
        self.activity.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// Test wiring helpers, also used by the integration suites.
pub mod testing {
    use super::*;
    use crate::device::LoopbackDriver;

    /// Context wired to a loopback driver, for handler and loop tests.
    pub fn loopback_context() -> (Arc<AppContext>, Arc<LoopbackDriver>) {
        let driver = Arc::new(LoopbackDriver::new());
        let ctx = AppContext::new(AppConfig::default(), driver.clone());
        (ctx, driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_users_override_builtin() {
        use crate::auth::{Credential, Role};

        let mut config = AppConfig::default();
        config.users = vec![Credential {
            username: "ops".to_string(),
            password: "s3cret".to_string(),
            role: Role::Admin,
        }];
        let ctx = AppContext::new(config, Arc::new(crate::device::LoopbackDriver::new()));

        assert!(ctx.credentials.authenticate("ops", "s3cret").is_some());
        assert!(ctx.credentials.authenticate("admin", "admin123").is_none());
    }

    #[test]
    fn test_singletons_shared_not_copied() {
        let (ctx, _driver) = testing::loopback_context();

        ctx.activity_mut().record("admin", "login");
        assert_eq!(ctx.activity().len(), 1);
    }
}
