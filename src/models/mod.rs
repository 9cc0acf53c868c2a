//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request/response types for the JSON API.

/// Platform fee model
pub mod fee;
/// Listing (ticket post) models
pub mod listing;
/// Notification log model
pub mod notification;
/// Payment and provider webhook models
pub mod payment;
/// Purchase (order) models
pub mod purchase;
/// Rating models
pub mod rating;
/// Report models
pub mod report;
/// Messaging room and message models
pub mod room;
/// User account models
pub mod user;
