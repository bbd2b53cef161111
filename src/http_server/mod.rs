//! # HTTP Server
//!
//! The interactive control surface: per-request session authentication,
//! role-based authorization, and the handlers that mutate device state.
//!
//! Every request follows the same state machine: extract the `session`
//! cookie, validate it against the session store, derive permissions
//! from the session's role, and only then touch the device.

mod auth_routes;
mod control_routes;
mod cookie;
mod pages;
mod response;
mod server;

pub use cookie::{clear_session_cookie, session_cookie, token_from_headers, SESSION_COOKIE};
pub use response::ErrorResponse;
pub use server::{build_router, HttpServer};
