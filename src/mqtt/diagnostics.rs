//! Network diagnostics probe.
//!
//! Run after repeated reconnect failures, purely for observability: the
//! results are logged and never alter retry behavior.

use std::time::{Duration, Instant};

use tokio::net::{lookup_host, TcpStream};
use tokio::time::timeout;

use crate::observability::{log_event, log_warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Checks DNS resolution of the broker host and raw TCP reachability of
/// the broker port.
pub async fn run_probe(broker: &str, port: u16) {
    match lookup_host((broker, port)).await {
        Ok(mut addrs) => match addrs.next() {
            Some(addr) => log_event(
                "diag_dns_ok",
                &[("host", broker), ("resolved", &addr.ip().to_string())],
            ),
            None => log_warn("diag_dns_empty", &[("host", broker)]),
        },
        Err(e) => {
            log_warn("diag_dns_failed", &[("host", broker), ("error", &e.to_string())]);
            return;
        }
    }

    let started = Instant::now();
    match timeout(PROBE_TIMEOUT, TcpStream::connect((broker, port))).await {
        Ok(Ok(_stream)) => log_event(
            "diag_tcp_ok",
            &[
                ("host", broker),
                ("port", &port.to_string()),
                ("elapsed_ms", &started.elapsed().as_millis().to_string()),
            ],
        ),
        Ok(Err(e)) => log_warn(
            "diag_tcp_failed",
            &[("host", broker), ("port", &port.to_string()), ("error", &e.to_string())],
        ),
        Err(_) => log_warn(
            "diag_tcp_timeout",
            &[
                ("host", broker),
                ("port", &port.to_string()),
                ("timeout_ms", &PROBE_TIMEOUT.as_millis().to_string()),
            ],
        ),
    }
}
