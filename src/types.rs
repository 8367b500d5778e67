//! Common type definitions shared across the API and database layers.
//!
//! # ID Types
//!
//! All entity IDs are UUIDs wrapped in type aliases for better readability:
//!
//! - [`RestaurantId`]: Restaurant account identifier
//! - [`WineId`]: Wine inventory item identifier
//! - [`SaleId`]: Sale transaction identifier
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use uuid::Uuid;

// Type aliases for IDs
pub type RestaurantId = Uuid;
pub type WineId = Uuid;
pub type SaleId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
