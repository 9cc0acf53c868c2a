//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (database queries, validation)
//! 3. Returns HTTP response (JSON, status code)

/// Admin endpoints (user suspension, reports, fees)
pub mod admin;
/// Signup, login, logout
pub mod auth;
/// Health check endpoint
pub mod health;
/// Listing CRUD and search
pub mod listings;
/// Notification log endpoint
pub mod notifications;
/// Payment provider webhook and payment lookup
pub mod payments;
/// Purchase creation and lifecycle endpoints
pub mod purchases;
/// Rating endpoints
pub mod ratings;
/// User report endpoints
pub mod reports;
/// Messaging rooms and messages
pub mod rooms;
/// User profile endpoints
pub mod users;
