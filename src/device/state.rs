//! # LED State
//!
//! The single mutable record describing current actuator output, shared
//! by both ingress paths.
//!
//! ## Invariants
//! - `set` is the only legal write path from any ingress; the `changed`
//!   flag cannot be bypassed by a new caller.
//! - `changed` is set by any effective mutation and cleared only by a
//!   confirmed status publish, so announcements are at-least-once.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::driver::ActuatorDriver;

/// Current actuator output plus the announcement-pending flag.
#[derive(Debug, Clone)]
pub struct LedState {
    pub power: bool,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Set at boot from config; not exposed for external mutation.
    pub brightness: u8,
    /// True while a state change awaits outward announcement.
    pub changed: bool,
}

/// Retained status message published on the outbound topic.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusAnnouncement {
    pub state: &'static str,
    pub color: &'static str,
    pub timestamp: String,
}

impl LedState {
    pub fn new(brightness: u8) -> Self {
        Self {
            power: false,
            red: 0,
            green: 0,
            blue: 0,
            brightness,
            changed: false,
        }
    }

    /// The single mutation entry point for both ingress paths.
    ///
    /// No-op when the requested state equals the current one (power, and
    /// when powering on, color channels too). Explicit channel values are
    /// stored exactly as requested, all-zero included. Returns whether
    /// anything changed.
    pub fn set(&mut self, power: bool, r: u8, g: u8, b: u8, driver: &dyn ActuatorDriver) -> bool {
        let differs =
            self.power != power || (power && (self.red, self.green, self.blue) != (r, g, b));
        if !differs {
            return false;
        }

        self.power = power;
        if power {
            self.red = r;
            self.green = g;
            self.blue = b;
            driver.show(r, g, b, self.brightness);
        } else {
            // Stored color survives power-off so "on" restores it.
            driver.clear();
        }
        self.changed = true;
        true
    }

    /// Turns the LED on with its last configured color. A stored color of
    /// all-zero means none was ever configured; it defaults to full white,
    /// since a black "on" would be indistinguishable from off.
    pub fn turn_on(&mut self, driver: &dyn ActuatorDriver) -> bool {
        let (r, g, b) = match (self.red, self.green, self.blue) {
            (0, 0, 0) => (255, 255, 255),
            stored => stored,
        };
        self.set(true, r, g, b, driver)
    }

    pub fn turn_off(&mut self, driver: &dyn ActuatorDriver) -> bool {
        self.set(false, 0, 0, 0, driver)
    }

    /// Builds the retained announcement for the current state.
    pub fn announcement(&self, now: DateTime<Utc>) -> StatusAnnouncement {
        StatusAnnouncement {
            state: if self.power { "on" } else { "off" },
            color: color_name(self.red, self.green, self.blue),
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Called by the publish step after a confirmed emission. On publish
    /// failure the flag is left set so the next opportunity retries.
    pub fn clear_changed(&mut self) {
        self.changed = false;
    }
}

impl StatusAnnouncement {
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "state": self.state,
            "color": self.color,
            "timestamp": self.timestamp,
        })
        .to_string()
    }
}

/// Symbolic name for a channel triple; "custom" for anything unnamed.
pub fn color_name(r: u8, g: u8, b: u8) -> &'static str {
    match (r, g, b) {
        (255, 0, 0) => "red",
        (0, 255, 0) => "green",
        (0, 0, 255) => "blue",
        (255, 255, 255) => "white",
        (255, 255, 0) => "yellow",
        (0, 255, 255) => "cyan",
        (255, 0, 255) => "magenta",
        _ => "custom",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::driver::{DriverEffect, LoopbackDriver};

    #[test]
    fn test_set_updates_state_and_driver() {
        let driver = LoopbackDriver::new();
        let mut state = LedState::new(50);

        assert!(state.set(true, 255, 0, 0, &driver));
        assert!(state.power);
        assert_eq!((state.red, state.green, state.blue), (255, 0, 0));
        assert!(state.changed);
        assert_eq!(
            driver.effects(),
            vec![DriverEffect::Show { r: 255, g: 0, b: 0, brightness: 50 }]
        );
    }

    #[test]
    fn test_identical_set_is_noop() {
        let driver = LoopbackDriver::new();
        let mut state = LedState::new(50);

        assert!(state.set(true, 0, 255, 0, &driver));
        state.clear_changed();

        // Second identical call: no flag, no driver work.
        assert!(!state.set(true, 0, 255, 0, &driver));
        assert!(!state.changed);
        assert_eq!(driver.effect_count(), 1);
    }

    #[test]
    fn test_power_on_from_black_defaults_to_white() {
        let driver = LoopbackDriver::new();
        let mut state = LedState::new(50);

        assert!(state.turn_on(&driver));
        assert_eq!((state.red, state.green, state.blue), (255, 255, 255));
    }

    #[test]
    fn test_explicit_zero_channels_stored_as_black() {
        let driver = LoopbackDriver::new();
        let mut state = LedState::new(50);
        state.set(true, 255, 0, 0, &driver);

        // An explicit all-zero request is honored, not rewritten to white.
        assert!(state.set(true, 0, 0, 0, &driver));
        assert!(state.power);
        assert_eq!((state.red, state.green, state.blue), (0, 0, 0));
        assert_eq!(
            driver.effects().last(),
            Some(&DriverEffect::Show { r: 0, g: 0, b: 0, brightness: 50 })
        );
    }

    #[test]
    fn test_power_on_restores_last_color() {
        let driver = LoopbackDriver::new();
        let mut state = LedState::new(50);

        state.set(true, 0, 0, 255, &driver);
        state.turn_off(&driver);
        assert!(!state.power);

        state.turn_on(&driver);
        assert_eq!((state.red, state.green, state.blue), (0, 0, 255));
    }

    #[test]
    fn test_off_when_already_off_is_noop() {
        let driver = LoopbackDriver::new();
        let mut state = LedState::new(50);

        state.set(true, 255, 0, 0, &driver);
        state.turn_off(&driver);
        state.clear_changed();

        assert!(!state.turn_off(&driver));
        assert!(!state.changed);
    }

    #[test]
    fn test_announcement_format() {
        let driver = LoopbackDriver::new();
        let mut state = LedState::new(50);
        state.set(true, 255, 255, 0, &driver);

        let now = Utc::now();
        let ann = state.announcement(now);
        assert_eq!(ann.state, "on");
        assert_eq!(ann.color, "yellow");
        assert_eq!(ann.timestamp, now.format("%Y-%m-%d %H:%M:%S").to_string());
    }

    #[test]
    fn test_color_names() {
        assert_eq!(color_name(255, 0, 0), "red");
        assert_eq!(color_name(0, 255, 255), "cyan");
        assert_eq!(color_name(12, 34, 56), "custom");
    }
}
