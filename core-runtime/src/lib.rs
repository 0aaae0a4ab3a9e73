//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure shared by every Moodify crate:
//! - Logging and tracing infrastructure
//! - Application configuration with fail-fast validation
//! - Typed event bus for playback, catalog and favorites events
//!
//! ## Overview
//!
//! This crate establishes the logging conventions and event broadcasting
//! mechanisms used throughout the system. It has no knowledge of playback
//! semantics; the event payloads are plain data.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
