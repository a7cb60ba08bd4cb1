use std::{
    path::PathBuf,
    sync::{Arc, Mutex, Weak, mpsc},
    thread,
    time::Duration,
};

use anyhow::Context;

use crate::{
    config::{
        model::{DisplayMode, SlideshowConfig},
        provider::{ConfigProvider, Subscription},
    },
    foundation::error::{BackdropError, BackdropResult},
    foundation::sync::lock,
    sequence::{Frame, FrameSequencer},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Scheduling state of a [`SlideshowTimer`].
pub enum TimerState {
    /// No periodic timer is scheduled (single-image mode, never configured,
    /// or shut down).
    Idle,
    /// The periodic timer is scheduled and the sequencer has been primed.
    Armed,
}

type FrameChangedHandler = dyn Fn() + Send + Sync;

/// Timer-driven slideshow over a decoded frame sequence.
///
/// A timer is [`TimerState::Idle`] until a configuration in
/// [`DisplayMode::Animated`] is applied; applying one builds the sequence
/// (guarded, see [`SlideshowTimer::apply_config`]), primes the first visible
/// frame, and arms a periodic background tick at the configured interval.
/// Every tick that changes the visible frame emits "frame changed" to the
/// registered handlers, which pull [`SlideshowTimer::current_frame`].
///
/// Ticks and configuration changes serialize on a single internal lock, and a
/// rebuild fully completes (previous worker joined, new sequence installed,
/// priming advance done) before the schedule is re-armed, so a tick can never
/// observe a half-built sequence.
///
/// Dropping the timer disarms it and joins the worker thread; no tick fires
/// after teardown.
pub struct SlideshowTimer {
    shared: Arc<TimerShared>,
}

struct TimerShared {
    state: Mutex<PlayerState>,
    worker: Mutex<Option<TimerWorker>>,
    handlers: Mutex<Vec<Arc<FrameChangedHandler>>>,
}

#[derive(Default)]
struct PlayerState {
    sequencer: Option<FrameSequencer>,
    loaded_path: Option<PathBuf>,
    looping: bool,
}

struct TimerWorker {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

impl SlideshowTimer {
    /// Create a timer in [`TimerState::Idle`] with no sequence loaded.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(TimerShared {
                state: Mutex::new(PlayerState::default()),
                worker: Mutex::new(None),
                handlers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a "frame changed" handler.
    ///
    /// Handlers run synchronously on the thread that advanced the sequence:
    /// the timer thread for periodic ticks, the configuring thread for the
    /// priming advance. They may call [`SlideshowTimer::current_frame`].
    pub fn on_frame_changed(&self, handler: impl Fn() + Send + Sync + 'static) {
        lock(&self.shared.handlers).push(Arc::new(handler));
    }

    /// Frame at the sequencer cursor, pixel buffer shared.
    ///
    /// Only valid once a "frame changed" emission has happened; fails with
    /// [`BackdropError::InvalidState`] before that.
    pub fn current_frame(&self) -> BackdropResult<Frame> {
        let state = lock(&self.shared.state);
        let sequencer = state
            .sequencer
            .as_ref()
            .ok_or_else(|| BackdropError::invalid_state("no frame sequence has been loaded"))?;
        Ok(sequencer.current()?.clone())
    }

    /// Current scheduling state.
    pub fn state(&self) -> TimerState {
        if lock(&self.shared.worker).is_some() {
            TimerState::Armed
        } else {
            TimerState::Idle
        }
    }

    #[tracing::instrument(skip(self, config), fields(mode = ?config.mode))]
    /// Apply a configuration snapshot.
    ///
    /// [`DisplayMode::Single`] cancels any pending timer and goes
    /// [`TimerState::Idle`], leaving the current sequence (if any) in place.
    /// [`DisplayMode::Animated`] rebuilds the sequence only when none is
    /// loaded or the source path changed, then primes one frame (emitting
    /// "frame changed" on success) and arms the periodic tick at the
    /// configured interval.
    ///
    /// A decode failure during rebuild propagates to the caller and leaves
    /// the previous sequence and schedule untouched; it is never retried
    /// internally.
    pub fn apply_config(&self, config: &SlideshowConfig) -> BackdropResult<()> {
        self.shared.apply_config(config)
    }

    /// Apply the provider's current configuration, then re-apply on every
    /// provider update until the returned guard is dropped.
    ///
    /// Inside the change handler a rebuild failure cannot propagate, so it is
    /// logged and the previous sequence and schedule stay in place.
    pub fn bind(&self, provider: &ConfigProvider) -> Subscription {
        let weak = Arc::downgrade(&self.shared);
        let subscription = provider.subscribe(move |config| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            if let Err(error) = shared.apply_config(config) {
                tracing::warn!(%error, "slideshow reconfiguration failed; keeping previous sequence");
            }
        });
        if let Err(error) = self.shared.apply_config(&provider.get()) {
            tracing::warn!(%error, "initial slideshow configuration failed");
        }
        subscription
    }

    /// Tear down: cancel the periodic timer and release the decoded frames.
    ///
    /// No tick fires after this returns. The timer can be re-armed by a later
    /// [`SlideshowTimer::apply_config`], which will rebuild the sequence.
    pub fn shutdown(&self) {
        self.shared.disarm();
        let mut state = lock(&self.shared.state);
        state.sequencer = None;
        state.loaded_path = None;
    }
}

impl Default for SlideshowTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SlideshowTimer {
    fn drop(&mut self) {
        self.shared.disarm();
    }
}

impl TimerShared {
    fn apply_config(self: &Arc<Self>, config: &SlideshowConfig) -> BackdropResult<()> {
        match config.mode {
            DisplayMode::Single => {
                self.disarm();
                Ok(())
            }
            DisplayMode::Animated => {
                config.validate()?;

                let needs_rebuild = {
                    let state = lock(&self.state);
                    state.sequencer.is_none()
                        || state.loaded_path.as_deref() != Some(config.source_path.as_path())
                };
                // Load before touching the running schedule: a decode failure
                // must leave the previous sequence and timer intact.
                let rebuilt = if needs_rebuild {
                    Some(FrameSequencer::load(
                        &config.source_path,
                        &config.fit_policy(),
                    )?)
                } else {
                    None
                };

                self.disarm();
                {
                    let mut state = lock(&self.state);
                    if let Some(sequencer) = rebuilt {
                        state.sequencer = Some(sequencer);
                        state.loaded_path = Some(config.source_path.clone());
                    }
                    state.looping = config.loop_slideshow;
                }

                // Prime the first visible frame before the schedule starts.
                if self.advance_once() {
                    self.emit_frame_changed();
                }
                self.arm(config.update_interval())
            }
        }
    }

    /// One advance step with loop-on-exhaustion semantics.
    ///
    /// Returns `true` when the visible frame changed.
    fn advance_once(&self) -> bool {
        let mut state = lock(&self.state);
        let looping = state.looping;
        let Some(sequencer) = state.sequencer.as_mut() else {
            return false;
        };
        if sequencer.advance() {
            return true;
        }
        if looping {
            sequencer.reset();
            return sequencer.advance();
        }
        // Exhausted with looping disabled: steady state, not a failure.
        false
    }

    fn tick(&self) {
        if self.advance_once() {
            self.emit_frame_changed();
        }
    }

    fn emit_frame_changed(&self) {
        // Snapshot the handler list so handlers can subscribe re-entrantly
        // and are invoked without any lock held.
        let handlers: Vec<Arc<FrameChangedHandler>> =
            lock(&self.handlers).iter().map(Arc::clone).collect();
        for handler in handlers {
            handler();
        }
    }

    fn arm(self: &Arc<Self>, interval: Duration) -> BackdropResult<()> {
        self.disarm();

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let weak: Weak<TimerShared> = Arc::downgrade(self);
        let handle = thread::Builder::new()
            .name("slideshow-timer".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(mpsc::RecvTimeoutError::Timeout) => {
                            // The worker holds no strong reference; when the
                            // owning timer is gone, stop ticking.
                            let Some(shared) = weak.upgrade() else {
                                break;
                            };
                            shared.tick();
                        }
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .context("spawn slideshow timer thread")?;

        *lock(&self.worker) = Some(TimerWorker { stop_tx, handle });
        Ok(())
    }

    fn disarm(&self) {
        let worker = lock(&self.worker).take();
        if let Some(worker) = worker {
            let _ = worker.stop_tx.send(());
            let _ = worker.handle.join();
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/player.rs"]
mod tests;
