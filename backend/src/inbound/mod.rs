//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! REST handlers live under [`http`]; the real-time recognition socket lives
//! under [`ws`].

pub mod http;
pub mod ws;
