//! HTTP server module.
//!
//! The server speaks plain HTTP; the cluster network and any ingress in front of
//! it handle TLS. On SIGTERM/SIGINT it drains connections and aborts pending
//! probe restore timers.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
