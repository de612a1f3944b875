//! HTTP API: router, auth gate and request/response mapping.

pub mod app;
pub mod context;
pub mod middleware;
