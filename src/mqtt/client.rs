//! Broker link: the outbound publish/subscribe seam and its rumqttc
//! implementation.

use std::net::IpAddr;
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use serde::Serialize;
use thiserror::Error;

use crate::config::MqttConfig;

#[derive(Debug, Error)]
pub enum MqttError {
    #[error("broker request failed: {0}")]
    Client(#[from] rumqttc::ClientError),

    #[error("broker session not connected")]
    NotConnected,
}

/// Outbound bus surface. A trait seam so the resilience loop can be
/// exercised against a recording fake.
pub trait Outbound: Send + Sync {
    fn subscribe(
        &self,
        topic: &str,
    ) -> impl std::future::Future<Output = Result<(), MqttError>> + Send;

    fn publish(
        &self,
        topic: &str,
        payload: String,
        retain: bool,
    ) -> impl std::future::Future<Output = Result<(), MqttError>> + Send;
}

/// Periodic device telemetry published on the status topic.
#[derive(Debug, Clone, Serialize)]
pub struct Telemetry {
    pub device: String,
    pub ip: Option<IpAddr>,
    pub rssi: Option<i32>,
    pub uptime: u64,
    pub free_heap: u64,
    pub reconnects: u32,
}

impl Telemetry {
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "device": self.device,
            "ip": self.ip,
            "rssi": self.rssi,
            "uptime": self.uptime,
            "free_heap": self.free_heap,
            "reconnects": self.reconnects,
        })
        .to_string()
    }
}

/// rumqttc-backed broker link.
pub struct MqttLink {
    client: AsyncClient,
}

impl MqttLink {
    /// Builds the client and its event loop. The client id gets a random
    /// suffix so a stale broker-side session never collides with ours.
    pub fn connect(cfg: &MqttConfig) -> (Self, EventLoop) {
        let client_id = format!("{}-{:04x}", cfg.client_id, rand::random::<u16>());
        let mut options = MqttOptions::new(client_id, &cfg.broker, cfg.port);
        options.set_keep_alive(Duration::from_secs(15));
        if !cfg.username.is_empty() {
            options.set_credentials(&cfg.username, &cfg.password);
        }

        let (client, eventloop) = AsyncClient::new(options, 64);
        (Self { client }, eventloop)
    }
}

impl Outbound for MqttLink {
    async fn subscribe(&self, topic: &str) -> Result<(), MqttError> {
        self.client.subscribe(topic, QoS::AtLeastOnce).await?;
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: String, retain: bool) -> Result<(), MqttError> {
        self.client
            .publish(topic, QoS::AtLeastOnce, retain, payload)
            .await?;
        Ok(())
    }
}

/// Recording fake for loop tests: remembers every publish and can be
/// told to fail.
pub mod testing {
    use std::sync::Mutex;

    use super::{MqttError, Outbound};

    #[derive(Debug, Default)]
    pub struct RecordingOutbound {
        pub published: Mutex<Vec<(String, String, bool)>>,
        pub subscribed: Mutex<Vec<String>>,
        pub fail_publishes: Mutex<bool>,
    }

    impl RecordingOutbound {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_failing(&self, failing: bool) {
            *self.fail_publishes.lock().unwrap_or_else(|e| e.into_inner()) = failing;
        }

        pub fn published(&self) -> Vec<(String, String, bool)> {
            self.published
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        pub fn subscribed(&self) -> Vec<String> {
            self.subscribed
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }
    }

    impl Outbound for RecordingOutbound {
        async fn subscribe(&self, topic: &str) -> Result<(), MqttError> {
            self.subscribed
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(topic.to_string());
            Ok(())
        }

        async fn publish(
            &self,
            topic: &str,
            payload: String,
            retain: bool,
        ) -> Result<(), MqttError> {
            if *self.fail_publishes.lock().unwrap_or_else(|e| e.into_inner()) {
                return Err(MqttError::NotConnected);
            }
            self.published
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((topic.to_string(), payload, retain));
            Ok(())
        }
    }
}
