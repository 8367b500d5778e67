//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`restaurants`]: Restaurant registration and lookup
//! - [`wines`]: Wine inventory CRUD and CSV bulk upload
//! - [`sales`]: Sale recording, deletion, and CSV bulk upload
//! - [`analytics`]: Dashboard, sales trend, inventory, and profit reports
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and JSON error responses.

pub mod analytics;
pub mod restaurants;
pub mod sales;
pub mod wines;
