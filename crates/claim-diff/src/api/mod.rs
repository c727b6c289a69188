//! Public entry points for the claim-diff crate.
//!
//! [`compare`] is the one-call form. [`ClaimComparer`] bundles palette,
//! detection settings and optional preprocessing into a reusable value.
//! [`ClaimDiffError`] unifies every error the crate returns.

mod builder;
mod compare;
mod error;

pub use builder::ClaimComparer;
pub use compare::{compare, Comparison};
pub use error::{ClaimDiffError, ConfigError};
