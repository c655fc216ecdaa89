//! Third-party relay subsystem.
//!
//! # Data Flow
//! ```text
//! /mixpanel/* /ga/* /posthog/*
//!     → analytics.rs (prefix table → proxy handler per collector)
//!
//! POST /sentry
//!     → sentry.rs (parse envelope header → project id → ingest URL)
//! ```
//!
//! # Design Decisions
//! - Analytics relays reuse the proxy handler; only the resolver differs
//! - The envelope relay is bespoke because it must read the body before
//!   it knows the destination

pub mod analytics;
pub mod sentry;

pub use analytics::{build_relays, RelayRoute};
