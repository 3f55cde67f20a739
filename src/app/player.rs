use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::api::MetadataClient;
use super::episode::next_episode;
use super::model::{Episode, MediaKind};
use super::tracker::{PlaybackPosition, PositionProvider, ProgressTracker, completion_percent};
use super::trailer::{self, ResolvedTrailer, TrailerError, TrailerSource};
use crate::store::StateStore;

/// Widget state-change code for "playback ended".
pub(crate) const WIDGET_ENDED: i32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerState {
    Idle,
    Loading,
    Playing,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WidgetEvent {
    Ready,
    StateChange(i32),
}

/// Embedded playback widget, driven by polling. The position provider is a
/// thread-safe view of the same playback, handed to the progress tracker.
pub(crate) trait PlaybackWidget: Send {
    fn position_provider(&self) -> Box<dyn PositionProvider>;
    fn poll_event(&mut self) -> Option<WidgetEvent>;
    fn destroy(&mut self);
}

pub(crate) type WidgetFactory = Box<dyn FnMut(&str) -> Box<dyn PlaybackWidget>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlayTarget {
    pub(crate) id: u64,
    pub(crate) kind: MediaKind,
    pub(crate) season: Option<u32>,
    pub(crate) episode: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SessionEvent {
    Started { key: String, fallback: bool },
    Advanced { episode: Episode },
    Finished,
    Failed(String),
}

/// One open player. Idle -> Loading -> {Playing, Failed}; Playing -> Idle
/// on close; Playing -> Loading when advancing to the next episode; Failed
/// stays terminal until reopened.
pub(crate) struct PlayerSession {
    client: MetadataClient,
    store: Arc<dyn StateStore>,
    factory: WidgetFactory,
    tick: Duration,
    open_flag: Arc<AtomicBool>,
    state: PlayerState,
    target: Option<PlayTarget>,
    resolved: Option<ResolvedTrailer>,
    widget: Option<Box<dyn PlaybackWidget>>,
    tracker: Option<ProgressTracker>,
}

impl PlayerSession {
    pub(crate) fn new(
        client: MetadataClient,
        store: Arc<dyn StateStore>,
        factory: WidgetFactory,
        tick: Duration,
    ) -> Self {
        Self {
            client,
            store,
            factory,
            tick,
            open_flag: Arc::new(AtomicBool::new(false)),
            state: PlayerState::Idle,
            target: None,
            resolved: None,
            widget: None,
            tracker: None,
        }
    }

    pub(crate) fn state(&self) -> PlayerState {
        self.state
    }

    pub(crate) fn target(&self) -> Option<PlayTarget> {
        self.target
    }

    /// Last sampled completion percentage of the current widget.
    pub(crate) fn progress(&self) -> Option<f64> {
        let provider = self.widget.as_ref()?.position_provider();
        completion_percent(provider.sample())
    }

    pub(crate) fn open(&mut self, target: PlayTarget) -> Result<(), TrailerError> {
        self.open_flag.store(true, Ordering::SeqCst);
        self.state = PlayerState::Loading;
        self.target = Some(target);
        self.resolved = None;

        let result = trailer::resolve(
            &self.client,
            target.kind,
            target.id,
            target.season,
            target.episode,
        );
        self.apply_resolution(result)
    }

    /// A resolution that lands after close is discarded without touching
    /// session state.
    pub(crate) fn apply_resolution(
        &mut self,
        result: Result<ResolvedTrailer, TrailerError>,
    ) -> Result<(), TrailerError> {
        if !self.open_flag.load(Ordering::SeqCst) {
            self.state = PlayerState::Idle;
            return Ok(());
        }
        match result {
            Ok(resolved) => {
                self.widget = Some((self.factory)(&resolved.key));
                self.resolved = Some(resolved);
                Ok(())
            }
            Err(err) => {
                self.state = PlayerState::Failed;
                Err(err)
            }
        }
    }

    /// Drains widget events, returning the session-level events the caller
    /// should surface.
    pub(crate) fn pump(&mut self) -> Vec<SessionEvent> {
        let mut out = Vec::new();
        loop {
            let event = match self.widget.as_mut() {
                Some(widget) => widget.poll_event(),
                None => None,
            };
            let Some(event) = event else { break };

            match event {
                WidgetEvent::Ready => {
                    self.state = PlayerState::Playing;
                    self.start_tracking();
                    if let Some(resolved) = &self.resolved {
                        out.push(SessionEvent::Started {
                            key: resolved.key.clone(),
                            fallback: resolved.source == TrailerSource::ShowFallback,
                        });
                    }
                }
                WidgetEvent::StateChange(WIDGET_ENDED) => {
                    out.extend(self.handle_ended());
                }
                WidgetEvent::StateChange(_) => {}
            }
        }
        out
    }

    fn start_tracking(&mut self) {
        let Some(target) = self.target else { return };
        if target.kind != MediaKind::Tv {
            return;
        }
        let Some(widget) = self.widget.as_ref() else {
            return;
        };
        self.tracker = Some(ProgressTracker::start(
            Arc::clone(&self.store),
            target.id,
            target.season,
            target.episode,
            widget.position_provider(),
            self.tick,
        ));
    }

    fn handle_ended(&mut self) -> Vec<SessionEvent> {
        if let Some(mut tracker) = self.tracker.take() {
            tracker.stop();
        }

        let Some(target) = self.target else {
            return vec![SessionEvent::Finished];
        };
        if target.kind == MediaKind::Tv
            && let (Some(season), Some(episode)) = (target.season, target.episode)
            && let Some(next) = next_episode(&self.client, target.id, season, episode)
        {
            if let Some(mut widget) = self.widget.take() {
                widget.destroy();
            }
            let next_target = PlayTarget {
                id: target.id,
                kind: MediaKind::Tv,
                season: Some(next.season_number),
                episode: Some(next.episode_number),
            };
            let mut events = vec![SessionEvent::Advanced { episode: next }];
            if let Err(err) = self.open(next_target) {
                events.push(SessionEvent::Failed(err.to_string()));
            }
            return events;
        }
        vec![SessionEvent::Finished]
    }

    /// Idempotent. Stops tracking, destroys the widget and flags in-flight
    /// resolutions as stale.
    pub(crate) fn close(&mut self) {
        self.open_flag.store(false, Ordering::SeqCst);
        if let Some(mut tracker) = self.tracker.take() {
            tracker.stop();
        }
        if let Some(mut widget) = self.widget.take() {
            widget.destroy();
        }
        self.state = PlayerState::Idle;
        self.resolved = None;
    }
}

/// Stands in for real playback telemetry: position advances with wall time
/// against a fixed duration.
pub(crate) struct SimulatedWidget {
    started: Instant,
    duration: Duration,
    ready_sent: bool,
    ended_sent: bool,
}

impl SimulatedWidget {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            started: Instant::now(),
            duration,
            ready_sent: false,
            ended_sent: false,
        }
    }
}

struct SimulatedPosition {
    started: Instant,
    duration: Duration,
}

impl PositionProvider for SimulatedPosition {
    fn sample(&self) -> PlaybackPosition {
        let duration = self.duration.as_secs_f64();
        PlaybackPosition {
            position: self.started.elapsed().as_secs_f64().min(duration),
            duration,
        }
    }
}

impl PlaybackWidget for SimulatedWidget {
    fn position_provider(&self) -> Box<dyn PositionProvider> {
        Box::new(SimulatedPosition {
            started: self.started,
            duration: self.duration,
        })
    }

    fn poll_event(&mut self) -> Option<WidgetEvent> {
        if !self.ready_sent {
            self.ready_sent = true;
            return Some(WidgetEvent::Ready);
        }
        if !self.ended_sent && self.started.elapsed() >= self.duration {
            self.ended_sent = true;
            return Some(WidgetEvent::StateChange(WIDGET_ENDED));
        }
        None
    }

    fn destroy(&mut self) {}
}
