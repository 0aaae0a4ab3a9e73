//! # iTunes Catalog Provider
//!
//! Catalog search against the public iTunes Search API.
//!
//! ## Overview
//!
//! - [`CatalogSearch`] is the seam the rest of the core depends on
//! - [`ItunesCatalogClient`] implements it over any [`HttpClient`](bridge_traits::HttpClient)
//! - [`Mood`] maps the six mood presets onto search terms
//!
//! Requests are plain GETs with no authentication. Results decode straight
//! into [`core_library::Track`] and are de-duplicated by track id.

mod client;
mod error;
mod mood;
mod types;

pub use client::{CatalogSearch, ItunesCatalogClient};
pub use error::{CatalogError, Result};
pub use mood::Mood;
pub use types::SearchResponse;
