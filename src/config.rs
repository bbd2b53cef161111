//! # Configuration
//!
//! Process-wide configuration: network identity, broker address, topic
//! names, HTTP bind address, session policy. Loaded once at startup and
//! immutable thereafter. Every field has a default so a missing file or
//! a partial file still yields a runnable device.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::Credential;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration tree (TOML).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub mqtt: MqttConfig,

    #[serde(default)]
    pub device: DeviceConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    /// Optional override of the built-in credential table.
    #[serde(default)]
    pub users: Vec<Credential>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    #[serde(default = "default_http_host")]
    pub host: String,

    #[serde(default = "default_http_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MqttConfig {
    #[serde(default = "default_broker")]
    pub broker: String,

    #[serde(default = "default_mqtt_port")]
    pub port: u16,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Empty means connect without authentication.
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    #[serde(default = "default_topic_command")]
    pub topic_command: String,

    #[serde(default = "default_topic_led_control")]
    pub topic_led_control: String,

    #[serde(default = "default_topic_status")]
    pub topic_status: String,

    /// Minimum spacing between reconnect attempts, in seconds.
    #[serde(default = "default_reconnect_secs")]
    pub reconnect_secs: u64,

    /// Run a diagnostics probe every Nth consecutive failed reconnect.
    #[serde(default = "default_diagnostics_every")]
    pub diagnostics_every: u32,

    /// Telemetry publish cadence, in seconds.
    #[serde(default = "default_publish_interval_secs")]
    pub publish_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,

    /// LED strip brightness, 0-255. Applied at boot.
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Activity log ring capacity.
    #[serde(default = "default_log_capacity")]
    pub log_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default = "default_session_capacity")]
    pub capacity: usize,

    #[serde(default = "default_session_timeout_secs")]
    pub timeout_secs: i64,

    /// Expired-session sweep cadence, in seconds.
    #[serde(default = "default_sweep_secs")]
    pub sweep_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Address probed to decide whether network attachment is alive,
    /// e.g. the gateway. Empty disables the attachment gate.
    #[serde(default)]
    pub probe_addr: String,

    /// Per-probe timeout, in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_broker() -> String {
    "broker.hivemq.com".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "glowd".to_string()
}

fn default_topic_command() -> String {
    "home/led/command".to_string()
}

fn default_topic_led_control() -> String {
    "homeled/control".to_string()
}

fn default_topic_status() -> String {
    "home/led/status".to_string()
}

fn default_reconnect_secs() -> u64 {
    5
}

fn default_diagnostics_every() -> u32 {
    10
}

fn default_publish_interval_secs() -> u64 {
    5
}

fn default_device_name() -> String {
    "glowd-device".to_string()
}

fn default_brightness() -> u8 {
    50
}

fn default_log_capacity() -> usize {
    crate::device::DEFAULT_LOG_CAPACITY
}

fn default_session_capacity() -> usize {
    crate::auth::DEFAULT_CAPACITY
}

fn default_session_timeout_secs() -> i64 {
    crate::auth::DEFAULT_TIMEOUT_SECS
}

fn default_sweep_secs() -> u64 {
    300
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
        }
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker: default_broker(),
            port: default_mqtt_port(),
            client_id: default_client_id(),
            username: String::new(),
            password: String::new(),
            topic_command: default_topic_command(),
            topic_led_control: default_topic_led_control(),
            topic_status: default_topic_status(),
            reconnect_secs: default_reconnect_secs(),
            diagnostics_every: default_diagnostics_every(),
            publish_interval_secs: default_publish_interval_secs(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            brightness: default_brightness(),
            log_capacity: default_log_capacity(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: default_session_capacity(),
            timeout_secs: default_session_timeout_secs(),
            sweep_secs: default_sweep_secs(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_addr: String::new(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file. A missing file yields the
    /// full default configuration; a present-but-invalid file is a boot
    /// failure.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// A typo here would otherwise silently disable the network
    /// attachment gate, so an unparseable probe address is a boot failure.
    fn validate(&self) -> Result<(), ConfigError> {
        let probe_addr = &self.network.probe_addr;
        if !probe_addr.is_empty() && probe_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "network.probe_addr is not a socket address: {probe_addr}"
            )));
        }
        Ok(())
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    pub fn broker_addr(&self) -> String {
        format!("{}:{}", self.mqtt.broker, self.mqtt.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.http_addr(), "0.0.0.0:8080");
        assert_eq!(config.mqtt.topic_status, "home/led/status");
        assert_eq!(config.mqtt.reconnect_secs, 5);
        assert_eq!(config.session.capacity, 10);
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.mqtt.port, 1883);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[mqtt]\nbroker = \"10.0.0.5\"\n\n[device]\nname = \"bench-rig\"\nbrightness = 200"
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.broker_addr(), "10.0.0.5:1883");
        assert_eq!(config.device.name, "bench-rig");
        assert_eq!(config.device.brightness, 200);
        // Untouched sections keep defaults.
        assert_eq!(config.http.port, 8080);
    }

    #[test]
    fn test_user_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[users]]\nusername = \"ops\"\npassword = \"s3cret\"\nrole = \"admin\""
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.users.len(), 1);
        assert_eq!(config.users[0].username, "ops");
    }

    #[test]
    fn test_invalid_probe_addr_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\nprobe_addr = \"gateway\"").unwrap();
        assert!(AppConfig::load(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[network]\nprobe_addr = \"192.168.1.1:80\"").unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.network.probe_addr, "192.168.1.1:80");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mqtt]\nbrokerr = \"typo\"").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }
}
