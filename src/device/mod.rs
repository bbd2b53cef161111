//! # Device
//!
//! The single shared actuator state and its collaborators: the LED state
//! record with its one legal mutation entry point, the hardware driver
//! seam, and the activity ring buffer.

mod activity;
mod command;
mod driver;
mod state;

pub use activity::{ActivityEntry, ActivityLog, DEFAULT_LOG_CAPACITY};
pub use command::LedCommand;
pub use driver::{ActuatorDriver, DriverEffect, LoopbackDriver};
pub use state::{color_name, LedState, StatusAnnouncement};
