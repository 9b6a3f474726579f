//! Common types for the café order backend.
//!
//! This crate defines the entities, status machines, API payloads and
//! configuration validation primitives shared by every other crate in the
//! workspace, so storage, engine and HTTP layers agree on a single data model.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Menu item entity.
pub mod menu;
/// Notification entity delivered to customers on order changes.
pub mod notification;
/// Order entity together with its status machines.
pub mod order;
/// Payment entity and accepted payment methods.
pub mod payment;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Storage namespaces and the entity contract used by the store.
pub mod storage;
/// User entity and roles.
pub mod user;
/// Utility functions for time-of-day handling.
pub mod utils;
/// Configuration validation types for backend-specific settings.
pub mod validation;

pub use api::*;
pub use menu::*;
pub use notification::*;
pub use order::*;
pub use payment::*;
pub use registry::*;
pub use storage::*;
pub use user::*;
pub use utils::{format_clock_time, parse_clock_time};
pub use validation::*;
