//! # canon-observability
//!
//! Structured tracing for Canon: subscriber setup, one event function per
//! pipeline milestone, and span macros for claim and stage scopes.

pub mod tracing_setup;

pub use tracing_setup::{events, init_tracing, init_tracing_with_filter};
