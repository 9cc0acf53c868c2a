//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle database transactions, validation, and complex operations.

pub mod notification_service;
pub mod payment_service;
pub mod purchase_service;
pub mod session;
