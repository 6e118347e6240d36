//! HTTP API: server wiring, session handling and request authorization.

pub mod app;
pub mod authz;
pub mod client_ip;
pub mod config;
pub mod context;
pub mod cookies;
pub mod middleware;
pub mod session;
pub mod state;
