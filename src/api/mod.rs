//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! Everything is served under `/api/v1`:
//!
//! - **Restaurants** (`/api/v1/restaurants/*`): Registration and lookup
//! - **Wines** (`/api/v1/wines/*`): Inventory management and bulk upload
//! - **Sales** (`/api/v1/sales/*`): Sale recording and bulk upload
//! - **Analytics** (`/api/v1/analytics/*`): Reporting endpoints
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! Interactive documentation is served at `/docs` when the server is running.

pub mod handlers;
pub mod models;
