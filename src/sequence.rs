use std::{path::Path, sync::Arc, time::Duration};

use crate::{
    assets::decode,
    config::model::FitPolicy,
    foundation::error::{BackdropError, BackdropResult},
};

/// Display density frames are normalized to, in dots per inch.
pub const STANDARD_DPI: f32 = 96.0;

#[derive(Clone, Debug)]
/// A decoded raster frame ready for display.
///
/// Immutable once produced; cloning shares the pixel buffer.
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
    /// Display density of the pixel buffer in dots per inch.
    ///
    /// Frames produced by [`crate::decode_gif_frames`] are always at
    /// [`STANDARD_DPI`]; see [`crate::normalize_density`] for frames tagged
    /// otherwise.
    pub dpi: f32,
    /// Delay reported by the source stream for this frame.
    ///
    /// Metadata only: the slideshow advances on its configured interval, not
    /// on stream delays.
    pub delay: Duration,
}

impl Frame {
    /// Logical width in device-independent units at [`STANDARD_DPI`].
    pub fn logical_width(&self) -> f32 {
        self.width as f32 * STANDARD_DPI / self.dpi
    }

    /// Logical height in device-independent units at [`STANDARD_DPI`].
    pub fn logical_height(&self) -> f32 {
        self.height as f32 * STANDARD_DPI / self.dpi
    }
}

#[derive(Clone, Debug)]
/// An ordered, non-empty list of decoded frames from a single source load.
///
/// Built once per load and owned exclusively; replaced wholesale when the
/// source changes.
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Wrap decoded frames, preserving their order.
    pub fn from_frames(frames: Vec<Frame>) -> BackdropResult<Self> {
        if frames.is_empty() {
            return Err(BackdropError::validation(
                "frame sequence must be non-empty",
            ));
        }
        Ok(Self { frames })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`: sequences are non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index` in original stream order.
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }
}

#[derive(Debug)]
/// Forward-only, restartable iteration over an owned [`FrameSequence`].
///
/// The cursor starts unset; [`FrameSequencer::advance`] must succeed once
/// before [`FrameSequencer::current`] yields a frame. After any operation the
/// cursor is either unset or within `0..len`.
pub struct FrameSequencer {
    sequence: FrameSequence,
    cursor: Option<usize>,
}

impl FrameSequencer {
    /// Wrap an already-built sequence with an unset cursor.
    pub fn new(sequence: FrameSequence) -> Self {
        Self {
            sequence,
            cursor: None,
        }
    }

    /// Decode the GIF at `path` into a fresh sequencer with an unset cursor.
    ///
    /// Frames keep their original stream order. Fails with
    /// [`BackdropError::Decode`] if the file is missing, unreadable, or not a
    /// valid GIF.
    pub fn load(path: &Path, fit: &FitPolicy) -> BackdropResult<Self> {
        Ok(Self::new(decode::decode_gif_frames(path, fit)?))
    }

    /// Frame at the cursor.
    ///
    /// Fails with [`BackdropError::InvalidState`] while the cursor is unset.
    pub fn current(&self) -> BackdropResult<&Frame> {
        let index = self.cursor.ok_or_else(|| {
            BackdropError::invalid_state("current frame requested before any advance")
        })?;
        self.sequence
            .get(index)
            .ok_or_else(|| BackdropError::invalid_state("cursor points past the sequence"))
    }

    /// Move the cursor forward by one.
    ///
    /// Returns `true` if a new current frame is available, `false` once the
    /// sequence is exhausted. An exhausted cursor stays on the last frame, so
    /// [`FrameSequencer::current`] remains stable.
    pub fn advance(&mut self) -> bool {
        let next = self.cursor.map_or(0, |index| index + 1);
        if next < self.sequence.len() {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    /// Unset the cursor so iteration restarts from the first frame.
    pub fn reset(&mut self) {
        self.cursor = None;
    }

    /// Number of frames in the owned sequence.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always `false`: the owned sequence is non-empty by construction.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Cursor position, `None` before the first successful advance.
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }
}

#[cfg(test)]
#[path = "../tests/unit/sequence.rs"]
mod tests;
