//! Middleware shared by every gateway route.
//!
//! [`Trace`] stamps each request with a trace identifier, echoed back in the
//! `trace-id` response header and carried by domain errors raised in scope.

pub mod trace;

pub use trace::Trace;
