//! # MQTT Ingress & Resilience
//!
//! The message-bus side of the controller: command dispatch, outward
//! status/telemetry publication, and the loop that keeps the broker
//! session alive.
//!
//! Trust boundary: bus-originated commands carry no authentication,
//! while the web surface requires a full session. The broker connection
//! itself is the credential here; anyone who can publish to the command
//! topics can drive the device. This asymmetry is deliberate and must
//! not be papered over by adding ad-hoc auth that changes behavior.

mod client;
mod command;
mod diagnostics;
mod resilience;

pub use client::{MqttError, MqttLink, Outbound, Telemetry};
pub use command::OperationalCommand;
pub use resilience::{run_control_loop, LoopExit, ResilienceLoop};
