//! # Actuator Driver
//!
//! Seam between device state and physical hardware. The real LED strip
//! and buzzer wiring live outside this crate; `LoopbackDriver` records
//! the effects so the controller can run (and be tested) without any
//! hardware attached.

use std::sync::Mutex;

/// Physical side effects requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverEffect {
    /// Light the strip with the given color at the given brightness.
    Show { r: u8, g: u8, b: u8, brightness: u8 },
    /// Turn the strip off.
    Clear,
    /// Drive the buzzer pin high or low.
    Buzzer { on: bool },
}

/// Hardware output boundary for the LED strip and buzzer.
pub trait ActuatorDriver: Send + Sync {
    fn show(&self, r: u8, g: u8, b: u8, brightness: u8);
    fn clear(&self);
    fn set_buzzer(&self, on: bool);
}

/// Driver that records effects instead of touching hardware.
#[derive(Debug, Default)]
pub struct LoopbackDriver {
    effects: Mutex<Vec<DriverEffect>>,
}

impl LoopbackDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effects recorded so far, oldest first.
    pub fn effects(&self) -> Vec<DriverEffect> {
        self.effects.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn effect_count(&self) -> usize {
        self.effects.lock().map(|e| e.len()).unwrap_or(0)
    }

    fn record(&self, effect: DriverEffect) {
        if let Ok(mut effects) = self.effects.lock() {
            effects.push(effect);
        }
    }
}

impl ActuatorDriver for LoopbackDriver {
    fn show(&self, r: u8, g: u8, b: u8, brightness: u8) {
        self.record(DriverEffect::Show { r, g, b, brightness });
    }

    fn clear(&self) {
        self.record(DriverEffect::Clear);
    }

    fn set_buzzer(&self, on: bool) {
        self.record(DriverEffect::Buzzer { on });
    }
}
