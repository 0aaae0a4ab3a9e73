//! Scripted media backend for controller tests.
//!
//! Position advances with tokio's clock while a session is playing, so tests
//! running with `start_paused = true` get exact, deterministic elapsed times.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::playback::{
    BackendEvent, BackendEventSink, MediaBackend, PlaybackRequest, PlaybackSessionId,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLog {
    Created { url: String, session: PlaybackSessionId },
    Unloaded { session: PlaybackSessionId },
}

#[derive(Clone, Copy)]
struct Script {
    delay: Duration,
    duration: Option<Duration>,
}

struct LiveSession {
    url: String,
    playing_since: Option<Instant>,
    accumulated: Duration,
}

impl LiveSession {
    fn position(&self) -> Duration {
        match self.playing_since {
            Some(since) => self.accumulated + since.elapsed(),
            None => self.accumulated,
        }
    }
}

#[derive(Default)]
struct State {
    scripts: HashMap<String, Script>,
    failing_loads: HashSet<String>,
    live: HashMap<PlaybackSessionId, LiveSession>,
    sinks: HashMap<PlaybackSessionId, Arc<dyn BackendEventSink>>,
    current: Option<PlaybackSessionId>,
    log: Vec<SessionLog>,
    max_live: usize,
    seeks: Vec<Duration>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    state: Mutex<State>,
    fail_activate: bool,
}

impl ScriptedBackend {
    /// Unscripted URLs resolve a 30 second duration immediately.
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_track(self, url: &str, delay: Duration, duration: Option<Duration>) -> Self {
        self.state
            .lock()
            .scripts
            .insert(url.to_string(), Script { delay, duration });
        self
    }

    pub fn failing_load(self, url: &str) -> Self {
        self.state.lock().failing_loads.insert(url.to_string());
        self
    }

    pub fn failing_activate(mut self) -> Self {
        self.fail_activate = true;
        self
    }

    pub fn log(&self) -> Vec<SessionLog> {
        self.state.lock().log.clone()
    }

    pub fn created_count(&self) -> usize {
        self.state
            .lock()
            .log
            .iter()
            .filter(|entry| matches!(entry, SessionLog::Created { .. }))
            .count()
    }

    pub fn live_sessions(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Highest number of simultaneously loaded sessions ever observed.
    pub fn max_live_sessions(&self) -> usize {
        self.state.lock().max_live
    }

    pub fn seeks(&self) -> Vec<Duration> {
        self.state.lock().seeks.clone()
    }

    pub fn current_session(&self) -> Option<PlaybackSessionId> {
        self.state.lock().current
    }

    /// Raise `event` through the sink registered for its session, even if
    /// that session has since been unloaded.
    pub fn notify(&self, event: BackendEvent) {
        let sink = self.state.lock().sinks.get(&event.session()).cloned();
        if let Some(sink) = sink {
            sink.notify(event);
        }
    }

    pub fn finish_current(&self) {
        if let Some(session) = self.current_session() {
            self.notify(BackendEvent::Finished { session });
        }
    }

    pub fn fail_current(&self, message: &str) {
        if let Some(session) = self.current_session() {
            self.notify(BackendEvent::Failed {
                session,
                message: message.to_string(),
            });
        }
    }

    fn with_live<T>(
        &self,
        session: PlaybackSessionId,
        f: impl FnOnce(&mut LiveSession) -> T,
    ) -> Result<T> {
        let mut state = self.state.lock();
        let live = state
            .live
            .get_mut(&session)
            .ok_or_else(|| BridgeError::OperationFailed(format!("unknown session {}", session)))?;
        Ok(f(live))
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    async fn activate(&self) -> Result<()> {
        if self.fail_activate {
            return Err(BridgeError::NotAvailable("no audio output device".to_string()));
        }
        Ok(())
    }

    async fn load(
        &self,
        request: PlaybackRequest,
        events: Arc<dyn BackendEventSink>,
    ) -> Result<PlaybackSessionId> {
        let mut state = self.state.lock();
        if state.failing_loads.contains(&request.url) {
            return Err(BridgeError::OperationFailed(format!(
                "cannot open {}",
                request.url
            )));
        }

        let session = PlaybackSessionId::new();
        state.live.insert(
            session,
            LiveSession {
                url: request.url.clone(),
                playing_since: None,
                accumulated: Duration::ZERO,
            },
        );
        state.sinks.insert(session, events);
        state.current = Some(session);
        state.max_live = state.max_live.max(state.live.len());
        state.log.push(SessionLog::Created {
            url: request.url,
            session,
        });
        Ok(session)
    }

    async fn play(&self, session: PlaybackSessionId) -> Result<()> {
        self.with_live(session, |live| {
            if live.playing_since.is_none() {
                live.playing_since = Some(Instant::now());
            }
        })
    }

    async fn pause(&self, session: PlaybackSessionId) -> Result<()> {
        self.with_live(session, |live| {
            if let Some(since) = live.playing_since.take() {
                live.accumulated += since.elapsed();
            }
        })
    }

    async fn seek(&self, session: PlaybackSessionId, position: Duration) -> Result<()> {
        self.with_live(session, |live| {
            live.accumulated = position;
            if live.playing_since.is_some() {
                live.playing_since = Some(Instant::now());
            }
        })?;
        self.state.lock().seeks.push(position);
        Ok(())
    }

    async fn position(&self, session: PlaybackSessionId) -> Result<Duration> {
        self.with_live(session, |live| live.position())
    }

    async fn resolve_duration(&self, session: PlaybackSessionId) -> Result<Option<Duration>> {
        let script = {
            let state = self.state.lock();
            let url = state
                .live
                .get(&session)
                .map(|live| live.url.clone())
                .ok_or_else(|| BridgeError::OperationFailed("session gone".to_string()))?;
            state.scripts.get(&url).copied().unwrap_or(Script {
                delay: Duration::ZERO,
                duration: Some(Self::DEFAULT_DURATION),
            })
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        Ok(script.duration)
    }

    async fn unload(&self, session: PlaybackSessionId) -> Result<()> {
        let mut state = self.state.lock();
        state.live.remove(&session);
        if state.current == Some(session) {
            state.current = None;
        }
        state.log.push(SessionLog::Unloaded { session });
        Ok(())
    }
}
