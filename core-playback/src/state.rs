//! Playback state snapshots.
//!
//! A [`PlaybackSnapshot`] is an immutable view of the controller at one
//! instant. Every transition publishes a fresh one; consumers derive their
//! own views (progress bars, "is this row playing") from it.

use core_library::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Controller state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No active track.
    #[default]
    Idle,
    /// Session requested, backend not yet playing.
    Loading,
    Playing,
    Paused,
}

impl PlaybackPhase {
    pub fn has_session(self) -> bool {
        !matches!(self, PlaybackPhase::Idle)
    }
}

/// Immutable playback state.
///
/// Invariants upheld by the controller:
/// - `phase == Playing` implies `track` is present
/// - `elapsed_secs <= duration_secs` once `duration_secs > 0`
/// - `track` absent implies both times are `0.0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub track: Option<Track>,
    pub elapsed_secs: f64,
    /// `0.0` while unknown.
    pub duration_secs: f64,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

impl PlaybackSnapshot {
    pub fn idle() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            track: None,
            elapsed_secs: 0.0,
            duration_secs: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn active_track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    /// Fraction of the track played, in `0.0..=1.0`. `0.0` while the duration
    /// is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn elapsed_label(&self) -> String {
        format_clock(self.elapsed_secs)
    }

    pub fn duration_label(&self) -> String {
        format_clock(self.duration_secs)
    }

    /// Whether `track_id` is the active track and audio is currently playing.
    ///
    /// List rows call this with their own id to decide which icon to show.
    pub fn is_track_playing(&self, track_id: TrackId) -> bool {
        self.is_playing() && self.track.as_ref().is_some_and(|t| t.id == track_id)
    }
}

/// Render seconds as `m:ss`. Negative and non-finite inputs render `0:00`.
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(phase: PlaybackPhase, id: i64) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase,
            track: Some(Track::new(id, "Song", "Artist")),
            elapsed_secs: 12.0,
            duration_secs: 30.0,
        }
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(9.9), "0:09");
        assert_eq!(format_clock(75.0), "1:15");
        assert_eq!(format_clock(-3.0), "0:00");
        assert_eq!(format_clock(f64::NAN), "0:00");
    }

    #[test]
    fn test_progress() {
        assert_eq!(snapshot(PlaybackPhase::Playing, 1).progress(), 0.4);
        assert_eq!(PlaybackSnapshot::idle().progress(), 0.0);
    }

    #[test]
    fn test_is_track_playing_requires_playing_phase() {
        let playing = snapshot(PlaybackPhase::Playing, 1);
        assert!(playing.is_track_playing(TrackId(1)));
        assert!(!playing.is_track_playing(TrackId(2)));

        let paused = snapshot(PlaybackPhase::Paused, 1);
        assert!(!paused.is_track_playing(TrackId(1)));
        assert!(!PlaybackSnapshot::idle().is_track_playing(TrackId(1)));
    }

    #[test]
    fn test_labels() {
        let s = snapshot(PlaybackPhase::Paused, 1);
        assert_eq!(s.elapsed_label(), "0:12");
        assert_eq!(s.duration_label(), "0:30");
    }
}
