//! Core order engine for the café backend.
//!
//! This crate holds the business rules: input validation, the pickup-time
//! window, the order and payment state machines, notifications, and the
//! analytics aggregations. Everything is reached through [`CafeEngine`],
//! which [`CafeBuilder`] assembles from configuration.

pub mod analytics;
pub mod builder;
pub mod clock;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod seed;
pub mod state;
pub mod validation;

pub use analytics::AnalyticsAggregator;
pub use builder::{BuilderError, CafeBuilder, CafeFactories};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use engine::CafeEngine;
pub use error::CafeError;
