//! Database record models matching table schemas.
//!
//! This module contains struct definitions that directly correspond to database
//! table rows. These models are used by repositories to return query results
//! and accept insertion/update data.
//!
//! # Design Principles
//!
//! - **Schema Mapping**: Each model struct matches a database table schema
//! - **SQLx Integration**: Models derive `sqlx::FromRow` for query results
//! - **Separation**: Database models are distinct from API models to allow
//!   independent evolution of storage and API representations
//! - **Type Safety**: Uses type aliases for IDs (RestaurantId, WineId, SaleId)
//!
//! # Model Categories
//!
//! - [`restaurants`]: Restaurant tenants owning all other entities
//! - [`wines`]: Wine inventory items with pricing and stock counters
//! - [`sales`]: Immutable sale transactions with price/cost snapshots
//!
//! # Conversion to API Models
//!
//! Database models typically implement `From` or `Into` conversions to API models:
//!
//! ```ignore
//! use sommelier::db::models::wines::WineDBResponse;
//! use sommelier::api::models::wines::WineResponse;
//!
//! let db_wine: WineDBResponse = /* ... */;
//! let api_response: WineResponse = db_wine.into();
//! ```

pub mod restaurants;
pub mod sales;
pub mod wines;
