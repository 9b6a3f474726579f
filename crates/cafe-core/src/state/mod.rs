//! State management for orders.

pub mod order;

pub use order::{OrderStateError, OrderStateMachine, StatusChange};
