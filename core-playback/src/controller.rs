//! # Playback Session Controller
//!
//! Owns the single active preview session and drives the [`MediaBackend`].
//!
//! ## State machine
//!
//! ```text
//!          play(track)              backend playing
//!  Idle ─────────────────► Loading ─────────────────► Playing ◄──┐
//!   ▲                                                  │  ▲      │
//!   │  stop / completion / failure                pause│  │resume│ play(same)
//!   └──────────────────────────────────────────────────┤  │      │
//!                                                      ▼  │      │
//!                                                     Paused ────┘
//! ```
//!
//! ## Serialization
//!
//! Commands and internal events (sampler ticks, resolved durations, backend
//! notifications) all run under one async mutex, so no two transitions
//! interleave. Internal events are queued on a channel and tagged with the
//! session generation they belong to. The generation is bumped whenever a
//! session is torn down or replaced, and any event carrying an older
//! generation is discarded on arrival.

use crate::broadcast::{StateBroadcaster, Subscription};
use crate::config::PlaybackConfig;
use crate::error::{PlaybackError, Result};
use crate::sampler::ProgressSampler;
use crate::state::{PlaybackPhase, PlaybackSnapshot};
use bridge_traits::error::BridgeError;
use bridge_traits::playback::{
    BackendEvent, BackendEventSink, MediaBackend, PlaybackMetadata, PlaybackRequest,
    PlaybackSessionId,
};
use core_library::Track;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Internal events, each tagged with the generation of the session that
/// produced it.
#[derive(Debug)]
pub(crate) enum ControllerEvent {
    Tick {
        generation: u64,
    },
    DurationResolved {
        generation: u64,
        result: std::result::Result<Option<Duration>, String>,
    },
    Backend {
        generation: u64,
        event: BackendEvent,
    },
}

/// Mutable session state. Only touched with the controller lock held.
#[derive(Default)]
struct Session {
    generation: u64,
    phase: PlaybackPhase,
    track: Option<Track>,
    backend_session: Option<PlaybackSessionId>,
    elapsed_secs: f64,
    duration_secs: f64,
    sampler: Option<ProgressSampler>,
    duration_task: Option<JoinHandle<()>>,
}

impl Session {
    fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            phase: self.phase,
            track: self.track.clone(),
            elapsed_secs: self.elapsed_secs,
            duration_secs: self.duration_secs,
        }
    }

    fn track_id(&self) -> Option<i64> {
        self.track.as_ref().map(|t| t.id.value())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.duration_task.take() {
            task.abort();
        }
    }
}

/// Forwards backend notifications into the controller queue.
struct SessionEvents {
    generation: u64,
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl BackendEventSink for SessionEvents {
    fn notify(&self, event: BackendEvent) {
        let generation = self.generation;
        if self
            .tx
            .send(ControllerEvent::Backend { generation, event })
            .is_err()
        {
            debug!(generation, "Backend event after controller shutdown");
        }
    }
}

struct Inner {
    backend: Arc<dyn MediaBackend>,
    config: PlaybackConfig,
    session: Mutex<Session>,
    broadcaster: StateBroadcaster<PlaybackSnapshot>,
    events: EventBus,
    unavailable: AtomicBool,
    closed: CancellationToken,
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.closed.cancel();
        let Some(id) = self.session.get_mut().backend_session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let backend = Arc::clone(&self.backend);
                handle.spawn(async move {
                    if let Err(e) = backend.unload(id).await {
                        warn!(session = %id, error = %e, "Failed to unload backend session");
                    }
                });
            }
            Err(_) => warn!(session = %id, "No runtime left to unload backend session"),
        }
    }
}

/// Single-session playback controller.
///
/// Cheap to clone; clones share the same session.
///
/// ```ignore
/// let controller = PlaybackController::new(backend, PlaybackConfig::default(), events);
/// controller.initialize().await?;
///
/// let _sub = controller.subscribe(|snapshot| render(snapshot));
/// controller.play(&track).await?;
/// ```
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

impl PlaybackController {
    /// Create a controller driving `backend`.
    ///
    /// Must be called from within a tokio runtime: it spawns the task that
    /// applies sampler ticks and backend notifications.
    pub fn new(backend: Arc<dyn MediaBackend>, config: PlaybackConfig, events: EventBus) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(Inner {
            backend,
            config,
            session: Mutex::new(Session::default()),
            broadcaster: StateBroadcaster::new(PlaybackSnapshot::idle()),
            events,
            unavailable: AtomicBool::new(false),
            closed: CancellationToken::new(),
            tx,
        });

        spawn_event_pump(Arc::downgrade(&inner), inner.closed.clone(), rx);

        Self { inner }
    }

    /// Activate audio output.
    ///
    /// On failure every later command is a logged no-op and
    /// [`PlaybackError::BackendUnavailable`] is returned once, here.
    pub async fn initialize(&self) -> Result<()> {
        match self.inner.backend.activate().await {
            Ok(()) => {
                self.inner.unavailable.store(false, Ordering::Release);
                info!("Audio backend activated");
                Ok(())
            }
            Err(e) => {
                self.inner.unavailable.store(true, Ordering::Release);
                error!(error = %e, "Audio backend unavailable; playback disabled");
                self.inner.emit(PlaybackEvent::Error {
                    track_id: None,
                    message: e.to_string(),
                });
                Err(PlaybackError::BackendUnavailable(e.to_string()))
            }
        }
    }

    pub fn is_available(&self) -> bool {
        !self.inner.unavailable.load(Ordering::Acquire)
    }

    /// Current state. Never waits on an in-flight command.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        (*self.inner.broadcaster.current()).clone()
    }

    /// Observe state changes. The callback runs immediately with the current
    /// snapshot, then after every transition, until the handle is dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PlaybackSnapshot) + Send + Sync + 'static,
    {
        self.inner.broadcaster.subscribe(callback)
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.inner.config
    }

    /// Play `track`.
    ///
    /// - Same track while `Paused`: resumes the existing session.
    /// - Same track while `Loading` or `Playing`: no-op.
    /// - Otherwise the previous session is torn down first, then a new one is
    ///   loaded and started. Duration resolves in the background.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NoPreviewAvailable`] if the track has no preview URL;
    ///   state is unchanged.
    /// - [`PlaybackError::Backend`] if the backend rejects the session; the
    ///   controller returns to `Idle`.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn play(&self, track: &Track) -> Result<()> {
        if self.inner.is_unavailable("play") {
            return Ok(());
        }

        let Some(url) = track.preview_url().map(str::to_owned) else {
            debug!("Track has no preview URL");
            return Err(PlaybackError::NoPreviewAvailable { track_id: track.id });
        };

        let mut session = self.inner.session.lock().await;

        if session.track.as_ref().is_some_and(|t| t.id == track.id) {
            match session.phase {
                PlaybackPhase::Paused => return self.inner.resume_locked(&mut session).await,
                PlaybackPhase::Loading | PlaybackPhase::Playing => {
                    debug!("Track already active");
                    return Ok(());
                }
                PlaybackPhase::Idle => {}
            }
        }

        self.inner.start_session(&mut session, track.clone(), url).await
    }

    /// Pause from `Playing`. No-op otherwise.
    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<()> {
        if self.inner.is_unavailable("pause") {
            return Ok(());
        }
        let mut session = self.inner.session.lock().await;
        self.inner.pause_locked(&mut session).await
    }

    /// Resume from `Paused`. No-op otherwise.
    #[instrument(skip(self))]
    pub async fn resume(&self) -> Result<()> {
        if self.inner.is_unavailable("resume") {
            return Ok(());
        }
        let mut session = self.inner.session.lock().await;
        self.inner.resume_locked(&mut session).await
    }

    /// Pause if playing, otherwise resume.
    #[instrument(skip(self))]
    pub async fn toggle(&self) -> Result<()> {
        if self.inner.is_unavailable("toggle") {
            return Ok(());
        }
        let mut session = self.inner.session.lock().await;
        if session.phase == PlaybackPhase::Playing {
            self.inner.pause_locked(&mut session).await
        } else {
            self.inner.resume_locked(&mut session).await
        }
    }

    /// Tear down the session and return to `Idle`. Idempotent.
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        let mut session = self.inner.session.lock().await;
        if session.phase == PlaybackPhase::Idle && session.track.is_none() {
            return;
        }

        let previous = self.inner.teardown(&mut session).await;
        self.inner.publish(&session);
        if let Some(track) = previous {
            info!(track_id = %track.id, "Playback stopped");
            self.inner.emit(PlaybackEvent::Stopped {
                track_id: track.id.value(),
            });
        }
    }

    /// Seek to `target_secs`, clamped to `[0, duration]`. The upper bound is
    /// only applied once the duration is known.
    ///
    /// Valid in `Playing` and `Paused`; a no-op otherwise.
    #[instrument(skip(self))]
    pub async fn seek(&self, target_secs: f64) -> Result<()> {
        if self.inner.is_unavailable("seek") {
            return Ok(());
        }

        let mut session = self.inner.session.lock().await;
        if !matches!(session.phase, PlaybackPhase::Playing | PlaybackPhase::Paused) {
            debug!(phase = ?session.phase, "Seek ignored");
            return Ok(());
        }
        let Some(id) = session.backend_session else {
            return Ok(());
        };

        let target = clamp_position(target_secs, session.duration_secs);
        let position = Duration::try_from_secs_f64(target).unwrap_or(Duration::MAX);
        self.inner.backend.seek(id, position).await?;

        session.elapsed_secs = target;
        self.inner.publish(&session);
        if let Some(track_id) = session.track_id() {
            self.inner.emit(PlaybackEvent::Seeked {
                track_id,
                position_secs: target,
            });
        }
        Ok(())
    }

    /// Tear down the active session and stop applying backend notifications.
    ///
    /// Every later command is a no-op. Dropping the last clone does the same
    /// without publishing the final `Idle` snapshot.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let mut session = self.inner.session.lock().await;
        if self.inner.closed.is_cancelled() {
            return;
        }
        self.inner.closed.cancel();

        if let Some(track) = self.inner.teardown(&mut session).await {
            self.inner.publish(&session);
            self.inner.emit(PlaybackEvent::Stopped {
                track_id: track.id.value(),
            });
        }
        info!("Playback controller shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    #[cfg(test)]
    async fn apply(&self, event: ControllerEvent) {
        self.inner.handle_event(event).await;
    }

    #[cfg(test)]
    async fn generation(&self) -> u64 {
        self.inner.session.lock().await.generation
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("snapshot", &self.inner.broadcaster.current())
            .field("available", &self.is_available())
            .finish()
    }
}

impl Inner {
    fn is_unavailable(&self, command: &str) -> bool {
        if self.closed.is_cancelled() {
            debug!(command, "Controller shut down; command ignored");
            return true;
        }
        let unavailable = self.unavailable.load(Ordering::Acquire);
        if unavailable {
            warn!(command, "Audio backend unavailable; command ignored");
        }
        unavailable
    }

    fn publish(&self, session: &Session) {
        let snapshot = session.snapshot();
        debug_assert!(!snapshot.is_playing() || snapshot.track.is_some());
        self.broadcaster.publish(snapshot);
    }

    fn emit(&self, event: PlaybackEvent) {
        self.events.emit(CoreEvent::Playback(event)).ok();
    }

    async fn start_session(&self, session: &mut Session, track: Track, url: String) -> Result<()> {
        if let Some(previous) = self.teardown(session).await {
            debug!(previous = %previous.id, "Replacing active session");
            self.emit(PlaybackEvent::Stopped {
                track_id: previous.id.value(),
            });
        }

        session.generation += 1;
        let generation = session.generation;
        session.track = Some(track.clone());
        session.phase = PlaybackPhase::Loading;
        self.publish(session);

        let sink = Arc::new(SessionEvents {
            generation,
            tx: self.tx.clone(),
        });
        let request = PlaybackRequest::new(url).with_metadata(metadata_for(&track));

        let id = match self.backend.load(request, sink).await {
            Ok(id) => id,
            Err(e) => return Err(self.fail_session(session, e).await),
        };
        session.backend_session = Some(id);
        session.duration_task = Some(self.spawn_duration_resolution(generation, id));

        if let Err(e) = self.backend.play(id).await {
            return Err(self.fail_session(session, e).await);
        }

        session.phase = PlaybackPhase::Playing;
        session.sampler = Some(self.spawn_sampler(generation));
        self.publish(session);

        info!(generation, session = %id, "Playback started");
        self.emit(PlaybackEvent::Started {
            track_id: track.id.value(),
            title: track.name.clone(),
            artist: track.artist_name.clone(),
        });
        Ok(())
    }

    async fn pause_locked(&self, session: &mut Session) -> Result<()> {
        if session.phase != PlaybackPhase::Playing {
            debug!(phase = ?session.phase, "Pause ignored");
            return Ok(());
        }
        let Some(id) = session.backend_session else {
            return Ok(());
        };

        self.backend.pause(id).await?;
        if let Some(sampler) = &session.sampler {
            sampler.suspend();
        }

        // Freeze at the exact pause point rather than the last tick.
        match self.backend.position(id).await {
            Ok(position) => {
                session.elapsed_secs = clamp_position(position.as_secs_f64(), session.duration_secs)
            }
            Err(e) => debug!(error = %e, "Position unavailable at pause"),
        }

        session.phase = PlaybackPhase::Paused;
        self.publish(session);
        if let Some(track_id) = session.track_id() {
            self.emit(PlaybackEvent::Paused {
                track_id,
                position_secs: session.elapsed_secs,
            });
        }
        Ok(())
    }

    async fn resume_locked(&self, session: &mut Session) -> Result<()> {
        if session.phase != PlaybackPhase::Paused {
            debug!(phase = ?session.phase, "Resume ignored");
            return Ok(());
        }
        let Some(id) = session.backend_session else {
            return Ok(());
        };

        self.backend.play(id).await?;
        match &session.sampler {
            Some(sampler) => sampler.resume(),
            None => session.sampler = Some(self.spawn_sampler(session.generation)),
        }

        session.phase = PlaybackPhase::Playing;
        self.publish(session);
        if let Some(track_id) = session.track_id() {
            self.emit(PlaybackEvent::Resumed {
                track_id,
                position_secs: session.elapsed_secs,
            });
        }
        Ok(())
    }

    /// Release everything owned by the current session and reset to `Idle`.
    ///
    /// Does not publish. Returns the track that was active.
    async fn teardown(&self, session: &mut Session) -> Option<Track> {
        if let Some(task) = session.duration_task.take() {
            task.abort();
        }
        if let Some(mut sampler) = session.sampler.take() {
            sampler.shutdown();
        }
        if let Some(id) = session.backend_session.take() {
            if let Err(e) = self.backend.unload(id).await {
                warn!(session = %id, error = %e, "Failed to unload backend session");
            }
        }

        let previous = session.track.take();
        if previous.is_some() || session.phase.has_session() {
            session.generation += 1;
        }
        session.phase = PlaybackPhase::Idle;
        session.elapsed_secs = 0.0;
        session.duration_secs = 0.0;
        previous
    }

    async fn fail_session(&self, session: &mut Session, cause: BridgeError) -> PlaybackError {
        let track_id = session.track_id();
        self.teardown(session).await;
        self.publish(session);

        error!(?track_id, error = %cause, "Playback session failed");
        self.emit(PlaybackEvent::Error {
            track_id,
            message: cause.to_string(),
        });
        PlaybackError::Backend(cause)
    }

    fn spawn_sampler(&self, generation: u64) -> ProgressSampler {
        let tx = self.tx.clone();
        ProgressSampler::spawn(self.config.progress_interval, move || {
            tx.send(ControllerEvent::Tick { generation }).is_ok()
        })
    }

    fn spawn_duration_resolution(&self, generation: u64, id: PlaybackSessionId) -> JoinHandle<()> {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = backend
                .resolve_duration(id)
                .await
                .map_err(|e| e.to_string());
            tx.send(ControllerEvent::DurationResolved { generation, result })
                .ok();
        })
    }

    async fn handle_event(&self, event: ControllerEvent) {
        let mut session = self.session.lock().await;

        match event {
            ControllerEvent::Tick { generation } => {
                if generation != session.generation || session.phase != PlaybackPhase::Playing {
                    debug!(generation, current = session.generation, "Discarding stale tick");
                    return;
                }
                let Some(id) = session.backend_session else {
                    return;
                };
                match self.backend.position(id).await {
                    Ok(position) => {
                        let elapsed = clamp_position(position.as_secs_f64(), session.duration_secs);
                        if elapsed != session.elapsed_secs {
                            session.elapsed_secs = elapsed;
                            self.publish(&session);
                        }
                    }
                    Err(e) => warn!(error = %e, "Failed to sample position"),
                }
            }

            ControllerEvent::DurationResolved { generation, result } => {
                if generation != session.generation {
                    debug!(generation, current = session.generation, "Discarding stale duration");
                    return;
                }
                session.duration_task = None;
                match result {
                    Ok(Some(duration)) if duration > Duration::ZERO => {
                        let duration_secs = duration.as_secs_f64();
                        session.duration_secs = duration_secs;
                        session.elapsed_secs = session.elapsed_secs.min(duration_secs);
                        self.publish(&session);
                        debug!(generation, duration_secs, "Duration resolved");
                        if let Some(track_id) = session.track_id() {
                            self.emit(PlaybackEvent::DurationResolved {
                                track_id,
                                duration_secs,
                            });
                        }
                    }
                    Ok(_) => debug!(generation, "Stream reports no duration"),
                    Err(message) => warn!(generation, %message, "Duration resolution failed"),
                }
            }

            ControllerEvent::Backend { generation, event } => {
                if generation != session.generation
                    || session.backend_session != Some(event.session())
                {
                    debug!(generation, current = session.generation, "Discarding stale backend event");
                    return;
                }
                let previous = self.teardown(&mut session).await;
                self.publish(&session);

                let Some(track) = previous else {
                    return;
                };
                match event {
                    BackendEvent::Finished { .. } => {
                        info!(track_id = %track.id, "Playback completed");
                        self.emit(PlaybackEvent::Completed {
                            track_id: track.id.value(),
                        });
                    }
                    BackendEvent::Failed { message, .. } => {
                        error!(track_id = %track.id, %message, "Backend reported failure");
                        self.emit(PlaybackEvent::Error {
                            track_id: Some(track.id.value()),
                            message,
                        });
                    }
                }
            }
        }
    }
}

fn spawn_event_pump(
    inner: Weak<Inner>,
    closed: CancellationToken,
    mut rx: mpsc::UnboundedReceiver<ControllerEvent>,
) {
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = closed.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            let Some(inner) = inner.upgrade() else {
                break;
            };
            inner.handle_event(event).await;
        }
        debug!("Playback event pump stopped");
    });
}

fn metadata_for(track: &Track) -> PlaybackMetadata {
    let mut metadata = PlaybackMetadata {
        track_id: Some(track.id.to_string()),
        title: Some(track.name.clone()),
        artist: Some(track.artist_name.clone()),
        album: track.album_name.clone(),
        ..PlaybackMetadata::default()
    };
    if let Some(artwork) = &track.artwork_url {
        metadata.extra.insert("artwork_url".to_string(), artwork.clone());
    }
    if let Some(genre) = &track.genre {
        metadata.extra.insert("genre".to_string(), genre.clone());
    }
    metadata
}

/// Clamp to `[0, duration]`, or `[0, ∞)` while the duration is unknown.
///
/// NaN and `-∞` map to zero. `+∞` maps to the duration when known, otherwise
/// to `f64::MAX` so the backend still sees an unbounded seek.
fn clamp_position(secs: f64, duration_secs: f64) -> f64 {
    let known = duration_secs > 0.0;
    let secs = if secs.is_nan() {
        0.0
    } else if secs == f64::INFINITY {
        if known {
            duration_secs
        } else {
            f64::MAX
        }
    } else {
        secs.max(0.0)
    };
    if known {
        secs.min(duration_secs)
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use mockall::mock;

    mock! {
        Backend {}

        #[async_trait]
        impl MediaBackend for Backend {
            async fn activate(&self) -> BridgeResult<()>;
            async fn load(
                &self,
                request: PlaybackRequest,
                events: Arc<dyn BackendEventSink>,
            ) -> BridgeResult<PlaybackSessionId>;
            async fn play(&self, session: PlaybackSessionId) -> BridgeResult<()>;
            async fn pause(&self, session: PlaybackSessionId) -> BridgeResult<()>;
            async fn seek(&self, session: PlaybackSessionId, position: Duration) -> BridgeResult<()>;
            async fn position(&self, session: PlaybackSessionId) -> BridgeResult<Duration>;
            async fn resolve_duration(&self, session: PlaybackSessionId) -> BridgeResult<Option<Duration>>;
            async fn unload(&self, session: PlaybackSessionId) -> BridgeResult<()>;
        }
    }

    fn playing_backend(session: PlaybackSessionId) -> MockBackend {
        let mut backend = MockBackend::new();
        backend
            .expect_load()
            .times(1)
            .returning(move |request, _| {
                assert_eq!(request.metadata.track_id.as_deref(), Some("1"));
                Ok(session)
            });
        backend.expect_play().returning(|_| Ok(()));
        backend.expect_resolve_duration().returning(|_| Ok(None));
        backend
    }

    fn controller(backend: MockBackend) -> PlaybackController {
        let config = PlaybackConfig::default().with_progress_interval(Duration::from_secs(10));
        PlaybackController::new(Arc::new(backend), config, EventBus::new(16))
    }

    fn track() -> Track {
        Track::new(1, "Song", "Artist").with_preview_url("https://example.com/1.m4a")
    }

    #[test]
    fn test_clamp_position() {
        assert_eq!(clamp_position(45.0, 30.0), 30.0);
        assert_eq!(clamp_position(-5.0, 30.0), 0.0);
        assert_eq!(clamp_position(45.0, 0.0), 45.0);
        assert_eq!(clamp_position(f64::NAN, 30.0), 0.0);
        assert_eq!(clamp_position(f64::NEG_INFINITY, 30.0), 0.0);
        assert_eq!(clamp_position(f64::INFINITY, 30.0), 30.0);
        assert_eq!(clamp_position(f64::INFINITY, 0.0), f64::MAX);
    }

    #[test]
    fn test_metadata_carries_track_fields() {
        let track = track().with_genre("Jazz").with_album("Blue");
        let metadata = metadata_for(&track);

        assert_eq!(metadata.track_id.as_deref(), Some("1"));
        assert_eq!(metadata.album.as_deref(), Some("Blue"));
        assert_eq!(metadata.extra.get("genre").map(String::as_str), Some("Jazz"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_duration_is_discarded() {
        let session = PlaybackSessionId::new();
        let controller = controller(playing_backend(session));
        controller.play(&track()).await.unwrap();

        let current = controller.generation().await;
        controller
            .apply(ControllerEvent::DurationResolved {
                generation: current - 1,
                result: Ok(Some(Duration::from_secs(99))),
            })
            .await;
        assert_eq!(controller.snapshot().duration_secs, 0.0);

        controller
            .apply(ControllerEvent::DurationResolved {
                generation: current,
                result: Ok(Some(Duration::from_secs(30))),
            })
            .await;
        assert_eq!(controller.snapshot().duration_secs, 30.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_event_for_other_session_is_discarded() {
        let session = PlaybackSessionId::new();
        let controller = controller(playing_backend(session));
        controller.play(&track()).await.unwrap();

        let generation = controller.generation().await;
        controller
            .apply(ControllerEvent::Backend {
                generation,
                event: BackendEvent::Finished {
                    session: PlaybackSessionId::new(),
                },
            })
            .await;

        assert!(controller.snapshot().is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_after_pause_is_discarded() {
        let session = PlaybackSessionId::new();
        let mut backend = playing_backend(session);
        backend.expect_pause().times(1).returning(|_| Ok(()));
        backend
            .expect_position()
            .times(1)
            .returning(|_| Ok(Duration::from_millis(700)));
        let controller = controller(backend);

        controller.play(&track()).await.unwrap();
        controller.pause().await.unwrap();

        let generation = controller.generation().await;
        controller.apply(ControllerEvent::Tick { generation }).await;

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, PlaybackPhase::Paused);
        assert_eq!(snapshot.elapsed_secs, 0.7);
    }
}
