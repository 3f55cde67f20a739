use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::library::save_episode_progress;
use crate::store::StateStore;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PlaybackPosition {
    pub(crate) position: f64,
    pub(crate) duration: f64,
}

pub(crate) trait PositionProvider: Send {
    fn sample(&self) -> PlaybackPosition;
}

/// Completion percentage for one sample, clamped to [0, 100]. None when the
/// duration cannot support a meaningful ratio.
pub(crate) fn completion_percent(sample: PlaybackPosition) -> Option<f64> {
    if !sample.duration.is_finite() || sample.duration <= 0.0 || !sample.position.is_finite() {
        return None;
    }
    Some((100.0 * sample.position / sample.duration).clamp(0.0, 100.0))
}

/// Samples the playback position at a fixed interval and upserts the
/// per-episode progress record, one store write per tick. Without a
/// season/episode target nothing is persisted; the top-level
/// continue-watching record is the caller's responsibility.
pub(crate) struct ProgressTracker {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTracker {
    pub(crate) fn start(
        store: Arc<dyn StateStore>,
        show_id: u64,
        season: Option<u32>,
        episode: Option<u32>,
        provider: Box<dyn PositionProvider>,
        tick: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            run_ticks(store, show_id, season.zip(episode), provider, tick, stop_flag);
        });
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Safe to call twice or on an already-finished tracker.
    pub(crate) fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_ticks(
    store: Arc<dyn StateStore>,
    show_id: u64,
    target: Option<(u32, u32)>,
    provider: Box<dyn PositionProvider>,
    tick: Duration,
    stop: Arc<AtomicBool>,
) {
    const POLL_SLICE: Duration = Duration::from_millis(20);

    loop {
        // Sleep in short slices so stop() returns promptly mid-interval.
        let mut slept = Duration::ZERO;
        while slept < tick {
            if stop.load(Ordering::SeqCst) {
                return;
            }
            thread::sleep(POLL_SLICE);
            slept += POLL_SLICE;
        }
        if stop.load(Ordering::SeqCst) {
            return;
        }

        let Some(progress) = completion_percent(provider.sample()) else {
            continue;
        };
        if let Some((season, episode)) = target
            && let Err(err) = save_episode_progress(store.as_ref(), show_id, season, episode, progress)
        {
            tracing::warn!(
                show_id,
                season,
                episode,
                error = %err,
                "failed to persist episode progress"
            );
        }
    }
}
