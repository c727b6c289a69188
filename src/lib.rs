//! Claimwatch - watch dynmap claim screenshots for disappeared claims
//!
//! Runs the `claim-diff` engine against a per-map baseline, writes change
//! artifacts, and exposes the results over HTTP.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
