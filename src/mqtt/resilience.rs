//! # Connectivity Resilience Loop
//!
//! The device's single control task. Each iteration does one bounded
//! slice of work: repair network attachment first, service at most one
//! broker event, then the outward duties (changed-flag publish, paced
//! telemetry, session sweep) before yielding.
//!
//! ## Invariants
//! - Attachment repair precedes everything else in an iteration, so no
//!   duty ever observes a torn network state.
//! - Broker reconnect attempts are spaced at least `reconnect_secs`
//!   apart; a diagnostics probe runs every Nth consecutive failure and
//!   never alters retry behavior.
//! - Immediately after a (re)connect both command topics are subscribed
//!   and a full state snapshot is published, so a restarted broker
//!   session reaches a consistent view without waiting for a change.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rumqttc::{Event, Packet};
use tokio::time::timeout;

use crate::context::AppContext;
use crate::device::LedCommand;
use crate::net::NetworkMonitor;
use crate::observability::{log_event, log_warn};

use super::client::{MqttError, MqttLink, Outbound, Telemetry};
use super::command::OperationalCommand;
use super::diagnostics;

/// Time slice given to inbound event processing per iteration. Bounds
/// every non-blocking duty so control always returns to the loop.
const POLL_SLICE: Duration = Duration::from_millis(250);

/// Why the control loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// A `restart` bus command asked the supervisor to restart us.
    RestartRequested,
}

/// Per-iteration state of the control task. Generic over the outbound
/// seam so the whole reconnect/publish protocol is testable without a
/// broker.
pub struct ResilienceLoop<'a, O: Outbound> {
    ctx: Arc<AppContext>,
    outbound: &'a O,
    monitor: Arc<dyn NetworkMonitor>,
    connected: bool,
    consecutive_failures: u32,
    lifetime_reconnects: u32,
    last_telemetry: Option<Instant>,
    last_sweep: Instant,
}

impl<'a, O: Outbound> ResilienceLoop<'a, O> {
    pub fn new(ctx: Arc<AppContext>, outbound: &'a O, monitor: Arc<dyn NetworkMonitor>) -> Self {
        Self {
            ctx,
            outbound,
            monitor,
            connected: false,
            consecutive_failures: 0,
            lifetime_reconnects: 0,
            last_telemetry: None,
            last_sweep: Instant::now(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Broker session established: resubscribe both command topics and
    /// bring the session to a consistent view with a full snapshot.
    pub async fn on_connected(&mut self) -> Result<(), MqttError> {
        let mqtt = &self.ctx.config.mqtt;
        self.outbound.subscribe(&mqtt.topic_command).await?;
        self.outbound.subscribe(&mqtt.topic_led_control).await?;

        self.connected = true;
        self.consecutive_failures = 0;
        log_event("mqtt_connected", &[("broker", &self.ctx.config.broker_addr())]);

        // Snapshot regardless of the changed flag.
        self.publish_state().await?;
        self.publish_telemetry().await?;
        Ok(())
    }

    /// Broker session lost. Counts the failure and runs the diagnostics
    /// probe every Nth consecutive one, purely for observability.
    pub async fn on_disconnected(&mut self, error: &str) {
        self.connected = false;
        self.consecutive_failures += 1;
        self.lifetime_reconnects += 1;
        log_warn(
            "mqtt_disconnected",
            &[
                ("error", error),
                ("consecutive_failures", &self.consecutive_failures.to_string()),
            ],
        );

        let every = self.ctx.config.mqtt.diagnostics_every;
        if every > 0 && self.consecutive_failures % every == 0 {
            let mqtt = &self.ctx.config.mqtt;
            diagnostics::run_probe(&mqtt.broker, mqtt.port).await;
        }
    }

    /// Dispatches one inbound message by topic. The bus is implicitly
    /// trusted; there is no session or role check on this path.
    pub async fn on_message(&mut self, topic: &str, payload: &str) -> Option<LoopExit> {
        let mqtt = self.ctx.config.mqtt.clone();

        if topic == mqtt.topic_led_control {
            // Malformed payloads are dropped without an error.
            let command = LedCommand::parse(payload)?;
            {
                let mut led = self.ctx.led_mut();
                command.apply(&mut led, self.ctx.driver.as_ref());
            }
            log_event("bus_led_control", &[("action", &command.describe())]);
            return None;
        }

        if topic == mqtt.topic_command {
            let Some(command) = OperationalCommand::parse(payload) else {
                log_warn("bus_command_unknown", &[("payload", payload.trim())]);
                return None;
            };
            match command {
                OperationalCommand::BuzzerOn => {
                    self.ctx.driver.set_buzzer(true);
                    log_event("bus_buzzer", &[("state", "on")]);
                }
                OperationalCommand::BuzzerOff => {
                    self.ctx.driver.set_buzzer(false);
                    log_event("bus_buzzer", &[("state", "off")]);
                }
                OperationalCommand::Status => {
                    if let Err(e) = self.publish_telemetry().await {
                        log_warn("telemetry_publish_failed", &[("error", &e.to_string())]);
                    }
                }
                OperationalCommand::LedStatus => {
                    if let Err(e) = self.publish_state().await {
                        log_warn("status_publish_failed", &[("error", &e.to_string())]);
                    }
                }
                OperationalCommand::TestNetwork => {
                    diagnostics::run_probe(&mqtt.broker, mqtt.port).await;
                }
                OperationalCommand::Restart => {
                    log_warn("restart_requested", &[("source", "bus")]);
                    return Some(LoopExit::RestartRequested);
                }
            }
        }
        None
    }

    /// Publishes the retained state announcement unconditionally. The
    /// changed flag is cleared only on confirmed emission; on failure it
    /// stays set so the next opportunity retries (at-least-once).
    pub async fn publish_state(&mut self) -> Result<(), MqttError> {
        let announcement = self.ctx.led().announcement(Utc::now());
        let topic = self.ctx.config.mqtt.topic_status.clone();

        self.outbound
            .publish(&topic, announcement.to_json(), true)
            .await?;
        self.ctx.led_mut().clear_changed();
        log_event(
            "status_published",
            &[("state", announcement.state), ("color", announcement.color)],
        );
        Ok(())
    }

    /// Announces the state if a mutation is pending. Failures are
    /// absorbed: the flag stays set and the next iteration retries.
    pub async fn publish_if_changed(&mut self) {
        if !self.connected || !self.ctx.led().changed {
            return;
        }
        if let Err(e) = self.publish_state().await {
            log_warn("status_publish_failed", &[("error", &e.to_string())]);
        }
    }

    pub async fn publish_telemetry(&mut self) -> Result<(), MqttError> {
        let telemetry = Telemetry {
            device: self.ctx.config.device.name.clone(),
            ip: self.monitor.local_ip(),
            rssi: self.monitor.rssi(),
            uptime: self.ctx.uptime_secs(),
            free_heap: 0,
            reconnects: self.lifetime_reconnects,
        };
        let topic = self.ctx.config.mqtt.topic_status.clone();
        self.outbound
            .publish(&topic, telemetry.to_json(), false)
            .await?;
        self.last_telemetry = Some(Instant::now());
        Ok(())
    }

    /// Outward duties run at the tail of every iteration: pending-change
    /// announcement, paced telemetry, periodic session sweep.
    pub async fn service_outward_duties(&mut self) {
        self.publish_if_changed().await;

        if self.connected && self.telemetry_due() {
            if let Err(e) = self.publish_telemetry().await {
                log_warn("telemetry_publish_failed", &[("error", &e.to_string())]);
            }
        }

        self.maybe_sweep_sessions();
    }

    fn telemetry_due(&self) -> bool {
        let interval = Duration::from_secs(self.ctx.config.mqtt.publish_interval_secs);
        match self.last_telemetry {
            Some(at) => at.elapsed() >= interval,
            None => true,
        }
    }

    fn maybe_sweep_sessions(&mut self) {
        let interval = Duration::from_secs(self.ctx.config.session.sweep_secs);
        if self.last_sweep.elapsed() < interval {
            return;
        }
        self.last_sweep = Instant::now();
        let cleared = self.ctx.sessions().sweep_expired();
        if cleared > 0 {
            log_event("sessions_swept", &[("cleared", &cleared.to_string())]);
        }
    }
}

/// Runs the control task until a bus command requests a restart.
pub async fn run_control_loop(ctx: Arc<AppContext>, monitor: Arc<dyn NetworkMonitor>) -> LoopExit {
    let (link, mut eventloop) = MqttLink::connect(&ctx.config.mqtt);
    let reconnect_pause = Duration::from_secs(ctx.config.mqtt.reconnect_secs);
    let mut state = ResilienceLoop::new(ctx, &link, monitor.clone());

    loop {
        // Attachment repair comes first so nothing below observes a torn
        // network state. This is the one deliberately blocking step.
        if !monitor.is_attached() {
            tokio::task::block_in_place(|| monitor.reattach());
            log_event("network_attached", &[]);
        }

        match timeout(POLL_SLICE, eventloop.poll()).await {
            // No inbound traffic this slice.
            Err(_) => {}
            Ok(Ok(Event::Incoming(Packet::ConnAck(_)))) => {
                if let Err(e) = state.on_connected().await {
                    log_warn("mqtt_session_setup_failed", &[("error", &e.to_string())]);
                }
            }
            Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                if let Some(exit) = state.on_message(&publish.topic, &payload).await {
                    return exit;
                }
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                state.on_disconnected(&e.to_string()).await;
                // Rate-limit retry storms; the next poll re-dials.
                tokio::time::sleep(reconnect_pause).await;
            }
        }

        state.service_outward_duties().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::testing::loopback_context;
    use crate::device::DriverEffect;
    use crate::mqtt::client::testing::RecordingOutbound;
    use crate::net::testing::AlwaysAttached;

    fn loop_under_test(
        outbound: &RecordingOutbound,
    ) -> (ResilienceLoop<'_, RecordingOutbound>, Arc<AppContext>) {
        let (ctx, _driver) = loopback_context();
        let state = ResilienceLoop::new(ctx.clone(), outbound, Arc::new(AlwaysAttached));
        (state, ctx)
    }

    #[tokio::test]
    async fn test_reconnect_resubscribes_and_snapshots() {
        let outbound = RecordingOutbound::new();
        let (mut state, _ctx) = loop_under_test(&outbound);

        state.on_connected().await.unwrap();

        assert_eq!(outbound.subscribed(), vec!["home/led/command", "homeled/control"]);

        // Exactly one retained state announcement, plus telemetry, even
        // though nothing changed during the outage.
        let published = outbound.published();
        let retained: Vec<_> = published.iter().filter(|(_, _, retain)| *retain).collect();
        assert_eq!(retained.len(), 1);
        let (topic, payload, _) = retained[0];
        assert_eq!(topic, "home/led/status");
        let value: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(value["state"], "off");

        // No pending announcement afterwards.
        state.publish_if_changed().await;
        assert_eq!(outbound.published().len(), published.len());
    }

    #[tokio::test]
    async fn test_failed_publish_keeps_changed_flag() {
        let outbound = RecordingOutbound::new();
        let (mut state, ctx) = loop_under_test(&outbound);
        state.connected = true;

        state.on_message("homeled/control", "red").await;
        assert!(ctx.led().changed);

        outbound.set_failing(true);
        state.publish_if_changed().await;
        assert!(ctx.led().changed, "flag must survive a failed publish");

        outbound.set_failing(false);
        state.publish_if_changed().await;
        assert!(!ctx.led().changed);

        let retained: Vec<_> = outbound
            .published()
            .into_iter()
            .filter(|(_, _, retain)| *retain)
            .collect();
        assert_eq!(retained.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&retained[0].1).unwrap();
        assert_eq!(value["color"], "red");
    }

    #[tokio::test]
    async fn test_bus_led_command_mutates_state() {
        let outbound = RecordingOutbound::new();
        let (mut state, ctx) = loop_under_test(&outbound);

        state.on_message("homeled/control", "cyan").await;

        let led = ctx.led();
        assert!(led.power);
        assert_eq!((led.red, led.green, led.blue), (0, 255, 255));
        assert!(led.changed);
    }

    #[tokio::test]
    async fn test_bus_zero_channel_payload_passes_through() {
        let outbound = RecordingOutbound::new();
        let (ctx, driver) = loopback_context();
        let mut state = ResilienceLoop::new(ctx.clone(), &outbound, Arc::new(AlwaysAttached));

        state.on_message("homeled/control", "red").await;
        state
            .on_message("homeled/control", r#"{"r":0,"g":0,"b":0}"#)
            .await;

        // Explicit zeros mean black-with-power-on, not the white default.
        {
            let led = ctx.led();
            assert!(led.power);
            assert_eq!((led.red, led.green, led.blue), (0, 0, 0));
        }
        assert_eq!(
            driver.effects().last(),
            Some(&DriverEffect::Show { r: 0, g: 0, b: 0, brightness: 50 })
        );
    }

    #[tokio::test]
    async fn test_bus_malformed_payload_dropped_silently() {
        let outbound = RecordingOutbound::new();
        let (mut state, ctx) = loop_under_test(&outbound);

        state.on_message("homeled/control", r#"{"r":1,"g":2}"#).await;
        state.on_message("homeled/control", "purple").await;

        let led = ctx.led();
        assert!(!led.power);
        assert!(!led.changed);
    }

    #[tokio::test]
    async fn test_bus_buzzer_commands_reach_driver() {
        let outbound = RecordingOutbound::new();
        let (ctx, driver) = loopback_context();
        let mut state = ResilienceLoop::new(ctx, &outbound, Arc::new(AlwaysAttached));

        state.on_message("home/led/command", "buzzer_on").await;
        state.on_message("home/led/command", "buzzer_off").await;

        assert_eq!(
            driver.effects(),
            vec![DriverEffect::Buzzer { on: true }, DriverEffect::Buzzer { on: false }]
        );
    }

    #[tokio::test]
    async fn test_restart_command_exits_loop() {
        let outbound = RecordingOutbound::new();
        let (mut state, _ctx) = loop_under_test(&outbound);

        let exit = state.on_message("home/led/command", "restart").await;
        assert_eq!(exit, Some(LoopExit::RestartRequested));
    }

    #[tokio::test]
    async fn test_status_command_publishes_telemetry() {
        let outbound = RecordingOutbound::new();
        let (mut state, _ctx) = loop_under_test(&outbound);

        state.on_message("home/led/command", "status").await;

        let published = outbound.published();
        assert_eq!(published.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(value["device"], "glowd-device");
        assert!(value["reconnects"].is_number());
        assert!(value["rssi"].is_null());
    }
}
