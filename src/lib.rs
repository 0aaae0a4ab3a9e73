//! Workspace facade crate.
//!
//! Host applications depend on `moodify` and get the composition root
//! (`core-service`), the playback controller types and the desktop HTTP
//! bridge without wiring each workspace crate individually.

#[cfg(feature = "desktop")]
pub use bridge_desktop::ReqwestHttpClient;
#[cfg(feature = "desktop")]
pub use core_playback::{PlaybackController, PlaybackPhase, PlaybackSnapshot, Subscription};
#[cfg(feature = "desktop")]
pub use core_service::{CoreDependencies, CoreError, CoreService, FavoritesService, SearchSession};
