//! Device Control Flow Tests
//!
//! Drive the HTTP surface end to end against a loopback actuator and
//! prove the full chain: request, permission check, state mutation,
//! driver effect, activity record, pending announcement.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;

use glowd::context::testing::loopback_context;
use glowd::device::DriverEffect;
use glowd::http_server::build_router;

async fn login(router: &axum::Router, username: &str, password: &str) -> String {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("username={username}&password={password}")))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    value["token"].as_str().unwrap().to_string()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, format!("session={token}"))
        .body(Body::empty())
        .unwrap()
}

async fn get_text(router: &axum::Router, uri: &str, token: &str) -> (StatusCode, String) {
    let response = router.clone().oneshot(get(uri, token)).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_led_color_command_full_chain() {
    let (ctx, driver) = loopback_context();
    let router = build_router(ctx.clone());
    let token = login(&router, "moderator", "mod123").await;

    let (status, body) = get_text(&router, "/led/red", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "LED set to RED");

    {
        let led = ctx.led();
        assert!(led.power);
        assert_eq!((led.red, led.green, led.blue), (255, 0, 0));
        // A mutation leaves an announcement pending for the bus loop.
        assert!(led.changed);
    }
    assert_eq!(
        driver.effects(),
        vec![DriverEffect::Show { r: 255, g: 0, b: 0, brightness: 50 }]
    );

    let entries = ctx.activity().entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "login");
    assert_eq!(entries[1].action, "LED set to RED");
    assert_eq!(entries[1].username, "moderator");

    // An anonymous retry bounces off without touching anything.
    let response = router
        .clone()
        .oneshot(Request::builder().uri("/led/red").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(driver.effect_count(), 1);
    assert_eq!(ctx.activity().len(), 2);
}

#[tokio::test]
async fn test_status_reflects_led_state() {
    let (ctx, _driver) = loopback_context();
    let router = build_router(ctx);
    let token = login(&router, "admin", "admin123").await;

    let (_, _) = get_text(&router, "/led/blue", &token).await;
    let (status, body) = get_text(&router, "/status", &token).await;
    assert_eq!(status, StatusCode::OK);

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["state"], "on");
    assert_eq!(value["red"], 0);
    assert_eq!(value["green"], 0);
    assert_eq!(value["blue"], 255);
    assert_eq!(value["brightness"], 50);
}

#[tokio::test]
async fn test_off_then_on_restores_color() {
    let (ctx, _driver) = loopback_context();
    let router = build_router(ctx.clone());
    let token = login(&router, "admin", "admin123").await;

    get_text(&router, "/led/cyan", &token).await;
    get_text(&router, "/led/off", &token).await;
    assert!(!ctx.led().power);

    let (_, body) = get_text(&router, "/led/on", &token).await;
    assert_eq!(body, "LED turned ON");
    let led = ctx.led();
    assert!(led.power);
    assert_eq!((led.red, led.green, led.blue), (0, 255, 255));
}

#[tokio::test]
async fn test_unknown_color_is_not_found() {
    let (ctx, driver) = loopback_context();
    let router = build_router(ctx);
    let token = login(&router, "admin", "admin123").await;

    let (status, _) = get_text(&router, "/led/purple", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(driver.effect_count(), 0);
}

#[tokio::test]
async fn test_buzzer_beep_pulses_driver() {
    let (ctx, driver) = loopback_context();
    let router = build_router(ctx);
    let token = login(&router, "admin", "admin123").await;

    let (status, body) = get_text(&router, "/buzzer/beep", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Buzzer BEEP");
    assert_eq!(
        driver.effects(),
        vec![DriverEffect::Buzzer { on: true }, DriverEffect::Buzzer { on: false }]
    );
}

#[tokio::test]
async fn test_logs_report_activity_oldest_first() {
    let (ctx, _driver) = loopback_context();
    let router = build_router(ctx);
    let token = login(&router, "admin", "admin123").await;

    get_text(&router, "/led/green", &token).await;
    get_text(&router, "/led/off", &token).await;

    let (status, body) = get_text(&router, "/logs", &token).await;
    assert_eq!(status, StatusCode::OK);
    let entries: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    let actions: Vec<&str> = entries.iter().map(|e| e["action"].as_str().unwrap()).collect();
    assert_eq!(actions, vec!["login", "LED set to GREEN", "LED turned OFF"]);
}

#[tokio::test]
async fn test_unknown_route_hits_fallback() {
    let (ctx, _driver) = loopback_context();
    let router = build_router(ctx);
    let token = login(&router, "admin", "admin123").await;

    let (status, body) = get_text(&router, "/nonexistent", &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["error"], "not found");
}
