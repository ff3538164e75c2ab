//! Identity provider adapters.
//!
//! - [`LocalIdentityProvider`]: process-local accounts with salted digests,
//!   used when no hosted provider is configured.
//! - [`GoTrueIdentityProvider`]: a GoTrue-compatible hosted auth service.

mod gotrue;
mod local;

pub use gotrue::GoTrueIdentityProvider;
pub use local::LocalIdentityProvider;
