//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` with rustls and retry/backoff
//!
//! Audio output is host-specific and is injected as a
//! [`MediaBackend`](bridge_traits::playback::MediaBackend) by the application.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//!
//! let http_client = Arc::new(ReqwestHttpClient::new()?);
//! // Hand it to `AppConfig::builder().http_client(http_client)`
//! ```

mod http;

pub use http::ReqwestHttpClient;
