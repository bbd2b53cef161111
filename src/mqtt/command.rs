//! Operational command vocabulary for the bus ingress.
//!
//! Disjoint from the LED vocabulary (`device::LedCommand`): these are
//! side-effecting device operations, dispatched by topic.

/// Free-text commands accepted on the operational topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationalCommand {
    BuzzerOn,
    BuzzerOff,
    /// Publish a telemetry snapshot.
    Status,
    /// Publish the LED state announcement.
    LedStatus,
    Restart,
    /// Run the network diagnostics probe.
    TestNetwork,
}

impl OperationalCommand {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "buzzer_on" => Some(Self::BuzzerOn),
            "buzzer_off" => Some(Self::BuzzerOff),
            "status" => Some(Self::Status),
            "led_status" => Some(Self::LedStatus),
            "restart" => Some(Self::Restart),
            "test_network" => Some(Self::TestNetwork),
            _ => None,
        }
    }
}
