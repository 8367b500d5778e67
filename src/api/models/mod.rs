//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Validation**: Cross-field rules live in `validate()` methods on the
//!   request models; handlers report violations as 400s
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//! - **Derived Fields**: Response models compute pricing figures (margin,
//!   markup, profit) from stored columns at serialization time
//!
//! # Model Categories
//!
//! ## Resource Models
//!
//! - [`restaurants`]: Restaurant accounts and registration requests
//! - [`wines`]: Wine inventory entries, list filters, and bulk upload results
//! - [`sales`]: Recorded sales, list filters, and bulk upload results
//!
//! ## Reporting Models
//!
//! - [`analytics`]: Dashboard, trend, inventory health, and profit reports
//! - [`pagination`]: Shared page/page_size parameters and the list envelope
//!
//! # Example
//!
//! ```ignore
//! use sommelier::api::models::wines::{WineCreate, WineResponse};
//!
//! // Deserialize from JSON
//! let create_req: WineCreate = serde_json::from_str(json_str)?;
//! create_req.validate()?;
//! ```

pub mod analytics;
pub mod pagination;
pub mod restaurants;
pub mod sales;
pub mod wines;
