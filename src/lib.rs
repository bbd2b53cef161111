//! glowd - a network-connected LED device controller
//!
//! One shared actuator state (RGB LED + buzzer), two ingress paths
//! (cookie-session web UI and MQTT), and a resilience loop that keeps
//! the device addressable and the broker session alive.

pub mod auth;
pub mod cli;
pub mod config;
pub mod context;
pub mod device;
pub mod http_server;
pub mod mqtt;
pub mod net;
pub mod observability;
