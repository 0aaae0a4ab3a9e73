//! # Library Module
//!
//! Domain models shared across Moodify and the local favorites store.
//!
//! ## Overview
//!
//! This crate owns:
//! - [`Track`](models::Track), decoded straight from catalog search payloads
//! - [`Favorite`](models::Favorite), a persisted snapshot of a track
//! - SQLite pool setup and schema ([`db`])
//! - The [`FavoritesRepository`](repositories::FavoritesRepository) abstraction
//!   with a `sqlx` implementation

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use error::{LibraryError, Result};
pub use models::{dedup_by_id, Favorite, FavoriteFilter, Track, TrackId};
pub use repositories::{FavoritesRepository, SqliteFavoritesRepository};
