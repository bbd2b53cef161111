//! # LED Command Vocabulary
//!
//! The actuator commands both ingress paths speak: symbolic color names
//! and structured channel payloads. Every variant resolves to the single
//! mutation entry point on `LedState`.

use super::driver::ActuatorDriver;
use super::state::{color_name, LedState};

/// A request to change the actuator output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCommand {
    /// Turn on with the last configured color (white when none).
    On,
    Off,
    /// Turn on with explicit channels.
    Color { r: u8, g: u8, b: u8 },
}

impl LedCommand {
    /// Parses the full bus vocabulary: a symbolic name or a JSON payload
    /// `{"r":N,"g":N,"b":N}`. A structured payload missing any channel is
    /// malformed and yields `None`; callers drop it without an error.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.starts_with('{') {
            return Self::parse_payload(text);
        }
        Self::parse_symbolic(text)
    }

    /// Parses only the fixed symbolic names (the web route vocabulary).
    pub fn parse_symbolic(name: &str) -> Option<Self> {
        let color = |r, g, b| Some(LedCommand::Color { r, g, b });
        match name {
            "on" => Some(LedCommand::On),
            "off" => Some(LedCommand::Off),
            "red" => color(255, 0, 0),
            "green" => color(0, 255, 0),
            "blue" => color(0, 0, 255),
            "white" => color(255, 255, 255),
            "yellow" => color(255, 255, 0),
            "cyan" => color(0, 255, 255),
            "magenta" => color(255, 0, 255),
            _ => None,
        }
    }

    fn parse_payload(text: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        let channel = |key: &str| value.get(key)?.as_u64().map(|v| v.min(255) as u8);
        Some(LedCommand::Color {
            r: channel("r")?,
            g: channel("g")?,
            b: channel("b")?,
        })
    }

    /// Applies the command through the single mutation entry point.
    /// Returns whether the device state actually changed.
    pub fn apply(&self, state: &mut LedState, driver: &dyn ActuatorDriver) -> bool {
        match *self {
            LedCommand::On => state.turn_on(driver),
            LedCommand::Off => state.turn_off(driver),
            LedCommand::Color { r, g, b } => state.set(true, r, g, b, driver),
        }
    }

    /// Human-readable confirmation, also used as the activity log action.
    pub fn describe(&self) -> String {
        match *self {
            LedCommand::On => "LED turned ON".to_string(),
            LedCommand::Off => "LED turned OFF".to_string(),
            LedCommand::Color { r, g, b } => match color_name(r, g, b) {
                "custom" => format!("LED set to RGB({r}, {g}, {b})"),
                name => format!("LED set to {}", name.to_uppercase()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_symbolic_name() {
        for name in ["on", "off", "red", "green", "blue", "white", "yellow", "cyan", "magenta"] {
            assert!(LedCommand::parse(name).is_some(), "{name} must parse");
        }
        assert_eq!(LedCommand::parse("red"), Some(LedCommand::Color { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn test_parse_unknown_name() {
        assert_eq!(LedCommand::parse("purple"), None);
    }

    #[test]
    fn test_parse_structured_payload() {
        assert_eq!(
            LedCommand::parse(r#"{"r":10,"g":20,"b":30}"#),
            Some(LedCommand::Color { r: 10, g: 20, b: 30 })
        );
    }

    #[test]
    fn test_payload_channels_clamped() {
        assert_eq!(
            LedCommand::parse(r#"{"r":999,"g":0,"b":0}"#),
            Some(LedCommand::Color { r: 255, g: 0, b: 0 })
        );
    }

    #[test]
    fn test_payload_missing_any_channel_is_malformed() {
        assert_eq!(LedCommand::parse(r#"{"r":1,"g":2}"#), None);
        assert_eq!(LedCommand::parse(r#"{"g":2,"b":3}"#), None);
        assert_eq!(LedCommand::parse(r#"{"r":1,"b":3}"#), None);
        assert_eq!(LedCommand::parse("{not json"), None);
    }

    #[test]
    fn test_describe() {
        assert_eq!(LedCommand::parse("red").unwrap().describe(), "LED set to RED");
        assert_eq!(LedCommand::On.describe(), "LED turned ON");
        assert_eq!(
            LedCommand::Color { r: 1, g: 2, b: 3 }.describe(),
            "LED set to RGB(1, 2, 3)"
        );
    }
}
