//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern; entities with a full CRUD surface
//! implement the [`Repository`] trait, the rest expose inherent methods.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//! - Uses the connection's transaction for ACID guarantees
//!
//! # Available Repositories
//!
//! - [`Restaurants`]: Restaurant accounts (tenant roots)
//! - [`Wines`]: Wine inventory management
//! - [`Sales`]: Sale records and their wine counter updates
//! - [`analytics`]: Aggregate reporting queries (not a repository; takes the pool)
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use sommelier::db::handlers::{Repository, Wines};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     // Start a transaction
//!     let mut tx = pool.begin().await?;
//!
//!     // Create repository from transaction
//!     let mut repo = Wines::new(&mut tx);
//!
//!     // Perform operations
//!     let wine = repo.get_by_id(wine_id).await?;
//!
//!     // Commit or rollback
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod repository;
pub mod restaurants;
pub mod sales;
pub mod wines;

pub use repository::Repository;
pub use restaurants::Restaurants;
pub use sales::Sales;
pub use wines::Wines;
