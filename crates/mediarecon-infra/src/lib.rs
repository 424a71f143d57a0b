//! Mediarecon Infrastructure Library
//!
//! Process-level plumbing shared by the binary:
//! - Tracing initialization
//! - SSH local-forward tunnel to the stage database

pub mod telemetry;
pub mod tunnel;

pub use telemetry::init_tracing;
pub use tunnel::{SshTunnel, TunnelError, TunnelSpec};
