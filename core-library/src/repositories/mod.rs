//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations.
//!
//! - Traits define the interface so services can be tested against doubles
//! - SQLite implementations use `sqlx` for async database access
//! - All operations return [`Result<T>`](crate::Result)

pub mod favorites;

pub use favorites::{FavoritesRepository, SqliteFavoritesRepository};
