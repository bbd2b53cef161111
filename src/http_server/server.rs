//! Router assembly and the HTTP server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::context::AppContext;
use crate::observability::log_event;

use super::auth_routes::auth_routes;
use super::control_routes::{control_routes, not_found_handler};

/// Builds the full route tree. Exposed separately from `HttpServer` so
/// tests can drive the router in-process.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(auth_routes(ctx.clone()))
        .merge(control_routes(ctx))
        .fallback(not_found_handler)
        .layer(cors)
}

/// The interactive control surface.
pub struct HttpServer {
    addr: String,
    router: Router,
}

impl HttpServer {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            addr: ctx.config.http_addr(),
            router: build_router(ctx),
        }
    }

    pub fn socket_addr(&self) -> &str {
        &self.addr
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .addr
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        log_event("http_listening", &[("addr", &addr.to_string())]);
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await
    }
}
