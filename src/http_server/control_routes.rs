//! Device control and inspection routes.
//!
//! All mutation goes through `LedCommand::apply`, the single legal write
//! path into the device state.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::auth::Role;
use crate::context::AppContext;
use crate::device::{ActivityEntry, LedCommand};
use crate::observability::log_event;

use super::response::{not_found, require_capability, require_session, ApiError};

/// How long a `beep` holds the buzzer pin high.
const BEEP_DURATION: Duration = Duration::from_millis(200);

pub fn control_routes(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/led/:color", get(led_handler))
        .route("/buzzer/:action", get(buzzer_handler))
        .route("/status", get(status_handler))
        .route("/logs", get(logs_handler))
        .with_state(ctx)
}

async fn led_handler(
    State(ctx): State<Arc<AppContext>>,
    Path(color): Path<String>,
    headers: HeaderMap,
) -> Result<String, ApiError> {
    let identity = require_session(&ctx, &headers)?;
    require_capability(identity.permissions().can_control_led)?;

    let command = LedCommand::parse_symbolic(&color)
        .ok_or_else(|| not_found(&format!("unknown LED command: {color}")))?;

    {
        let mut led = ctx.led_mut();
        command.apply(&mut led, ctx.driver.as_ref());
    }
    let action = command.describe();
    ctx.activity_mut().record(&identity.username, &action);
    log_event("led_control", &[("user", &identity.username), ("action", &action)]);

    Ok(action)
}

/// Buzzer control requires the Admin role specifically, stricter than
/// the general LED-control capability.
async fn buzzer_handler(
    State(ctx): State<Arc<AppContext>>,
    Path(action): Path<String>,
    headers: HeaderMap,
) -> Result<String, ApiError> {
    let identity = require_session(&ctx, &headers)?;
    require_capability(identity.role == Role::Admin)?;

    let confirmation = match action.as_str() {
        "on" => {
            ctx.driver.set_buzzer(true);
            "Buzzer ON"
        }
        "off" => {
            ctx.driver.set_buzzer(false);
            "Buzzer OFF"
        }
        "beep" => {
            ctx.driver.set_buzzer(true);
            tokio::time::sleep(BEEP_DURATION).await;
            ctx.driver.set_buzzer(false);
            "Buzzer BEEP"
        }
        _ => return Err(not_found(&format!("unknown buzzer action: {action}"))),
    };

    ctx.activity_mut().record(&identity.username, confirmation);
    log_event(
        "buzzer_control",
        &[("user", &identity.username), ("action", confirmation)],
    );
    Ok(confirmation.to_string())
}

async fn status_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&ctx, &headers)?;

    let led = ctx.led();
    Ok(Json(json!({
        "state": if led.power { "on" } else { "off" },
        "red": led.red,
        "green": led.green,
        "blue": led.blue,
        "brightness": led.brightness,
    })))
}

async fn logs_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ActivityEntry>>, ApiError> {
    let identity = require_session(&ctx, &headers)?;
    require_capability(identity.permissions().can_view_log)?;

    Ok(Json(ctx.activity().entries()))
}

/// Fallback for unknown routes.
pub async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"error": "not found", "code": 404})),
    )
}
