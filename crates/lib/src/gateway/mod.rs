//! Gateway: the HTTP front door.
//!
//! Single port serves the liveness probe (`GET /index`) and the LINE webhook (`POST /callback`).
//! Dispatch errors are mapped to status codes here and nowhere else.

mod server;

pub use server::{router, run_gateway, GatewayState, INDEX_BODY};
