//! Backdrop is a timer-driven background slideshow core.
//!
//! Backdrop decodes a GIF file into an owned, ordered sequence of
//! display-ready frames and cycles through them on a background timer,
//! emitting a "frame changed" notification each time the visible frame
//! changes. Host applications wire it to their settings store and renderer;
//! Backdrop itself never draws anything.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: `source path -> FrameSequence` (premultiplied RGBA8 frames
//!    in original stream order, fit policy applied at decode time)
//! 2. **Iterate**: [`FrameSequencer`] provides forward-only, restartable
//!    cursor iteration over the owned sequence
//! 3. **Drive**: [`SlideshowTimer`] advances the sequencer on the configured
//!    interval and emits "frame changed" to subscribed handlers
//! 4. **Present**: consumers pull [`SlideshowTimer::current_frame`] when
//!    notified and scale per the configured [`FitMode`]
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **No IO on the tick path**: decoding is front-loaded into the rebuild
//!   triggered by a configuration change; ticks only move a cursor.
//! - **Single-lock state**: the tick thread and the configuring thread
//!   serialize on one mutex around the sequence and cursor.
//! - **Explicit teardown**: configuration subscriptions are RAII guards and
//!   the timer joins its worker thread on drop, so nothing outlives its
//!   owner.
//!
//! # Premultiplied RGBA8
//!
//! Frames are handed out as premultiplied RGBA8 so renderers can composite
//! them over any background without a per-pixel divide.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod config;
mod foundation;
mod player;
mod sequence;

pub use assets::decode::{decode_gif_frames, normalize_density};
pub use config::model::{DisplayMode, FitMode, FitPolicy, SlideshowConfig};
pub use config::provider::{ConfigProvider, Subscription};
pub use foundation::error::{BackdropError, BackdropResult};
pub use player::{SlideshowTimer, TimerState};
pub use sequence::{Frame, FrameSequence, FrameSequencer, STANDARD_DPI};
