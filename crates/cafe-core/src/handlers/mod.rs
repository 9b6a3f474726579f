//! Handlers for the café's entity collections.
//!
//! Each handler owns the business rules for one collection. The engine
//! composes them and serializes their writes.

pub mod menu;
pub mod notification;
pub mod order;
pub mod payment;
pub mod user;

pub use menu::MenuHandler;
pub use notification::NotificationHandler;
pub use order::OrderHandler;
pub use payment::PaymentHandler;
pub use user::UserHandler;
