//! # Playback Session Module
//!
//! Single-session preview playback for the discovery client.
//!
//! ## Overview
//!
//! This module handles:
//! - The playback state machine (`Idle`, `Loading`, `Playing`, `Paused`)
//! - Fan-out of immutable state snapshots to any number of observers
//! - Periodic position sampling while audio is playing
//!
//! Audio output itself is delegated to a host
//! [`MediaBackend`](bridge_traits::playback::MediaBackend).

pub mod broadcast;
pub mod config;
pub mod controller;
pub mod error;
pub mod sampler;
pub mod state;

pub use broadcast::{StateBroadcaster, Subscription};
pub use config::PlaybackConfig;
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use sampler::ProgressSampler;
pub use state::{format_clock, PlaybackPhase, PlaybackSnapshot};
