//! CLI command implementations.
//!
//! `start` performs the whole boot sequence: load configuration, build
//! the shared context, then run the HTTP surface and the control loop
//! side by side until one of them asks to stop.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::device::LoopbackDriver;
use crate::http_server::HttpServer;
use crate::mqtt::{run_control_loop, LoopExit};
use crate::net::GatewayProbe;
use crate::observability::{log_event, log_warn};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Exit code asking the supervisor to start us again. Distinct from the
/// generic failure code so restart-on-command is not treated as a crash.
pub const RESTART_EXIT_CODE: i32 = 10;

/// Parses arguments and dispatches to the matching command.
pub fn run() -> CliResult<()> {
    match Cli::parse_args().command {
        Command::Start { config, port } => start(&config, port),
        Command::CheckConfig { config } => check_config(&config),
    }
}

/// Boots the controller and serves until shutdown or restart.
pub fn start(config_path: &Path, port_override: Option<u16>) -> CliResult<()> {
    let mut config = AppConfig::load(config_path)?;
    if let Some(port) = port_override {
        config.http.port = port;
    }

    // Hosted builds drive a loopback actuator; a hardware target would
    // substitute its own driver here.
    let driver = Arc::new(LoopbackDriver::new());
    let monitor = Arc::new(GatewayProbe::new(
        &config.network.probe_addr,
        std::time::Duration::from_millis(config.network.probe_timeout_ms),
    ));

    log_event(
        "boot",
        &[
            ("http", &config.http_addr()),
            ("broker", &config.broker_addr()),
        ],
    );

    let ctx = AppContext::new(config, driver);
    let runtime = Runtime::new().map_err(CliError::Runtime)?;

    let exit = runtime.block_on(async move {
        let server = HttpServer::new(ctx.clone());
        let control = run_control_loop(ctx, monitor);

        tokio::select! {
            result = server.start() => match result {
                Ok(()) => Ok(None),
                Err(e) => Err(CliError::Http(e)),
            },
            exit = control => Ok(Some(exit)),
        }
    })?;

    if let Some(LoopExit::RestartRequested) = exit {
        log_warn("restarting", &[]);
        std::process::exit(RESTART_EXIT_CODE);
    }
    Ok(())
}

/// Parses and validates a configuration file, printing a short summary.
pub fn check_config(config_path: &Path) -> CliResult<()> {
    let config = AppConfig::load(config_path)?;
    println!("configuration OK");
    println!("  http:    {}", config.http_addr());
    println!("  broker:  {}", config.broker_addr());
    println!(
        "  users:   {}",
        if config.users.is_empty() {
            "builtin".to_string()
        } else {
            config.users.len().to_string()
        }
    );
    Ok(())
}
