//! # Roles & Permissions
//!
//! Coarse-grained identity classes and the capability sets derived from
//! them. Permissions are never stored; they are a pure function of the
//! role, so the two can never drift apart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity classification, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control: LED, buzzer, logs, settings, API.
    Admin,
    /// LED control and log access, no settings.
    Moderator,
    /// Read-only: status and logs.
    Viewer,
    /// Status only.
    Guest,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Moderator, Role::Viewer, Role::Guest];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::Viewer => "Viewer",
            Role::Guest => "Guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capability set derived from a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    pub can_control_led: bool,
    pub can_view_status: bool,
    pub can_view_log: bool,
    pub can_change_settings: bool,
    pub can_use_api: bool,
}

/// Returns the capability set for a role. Total over all variants.
pub fn permissions_for(role: Role) -> Permissions {
    match role {
        Role::Admin => Permissions {
            can_control_led: true,
            can_view_status: true,
            can_view_log: true,
            can_change_settings: true,
            can_use_api: true,
        },
        Role::Moderator => Permissions {
            can_control_led: true,
            can_view_status: true,
            can_view_log: true,
            can_change_settings: false,
            can_use_api: true,
        },
        Role::Viewer => Permissions {
            can_control_led: false,
            can_view_status: true,
            can_view_log: true,
            can_change_settings: false,
            can_use_api: false,
        },
        Role::Guest => Permissions {
            can_control_led: false,
            can_view_status: true,
            can_view_log: false,
            can_change_settings: false,
            can_use_api: false,
        },
    }
}
