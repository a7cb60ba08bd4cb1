use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::foundation::error::{BackdropError, BackdropResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// How the displayed frame is fitted to the viewport.
///
/// Every mode except [`FitMode::None`] defers scaling to the renderer; frames
/// pass through decode unresized. Under [`FitMode::None`] frames are pre-sized
/// at decode time to fit the configured max bounds instead.
pub enum FitMode {
    /// No presentation-layer scaling; frames are resized at decode time.
    None,
    /// Scale preserving aspect ratio so the whole frame is visible.
    #[default]
    Uniform,
    /// Scale preserving aspect ratio so the frame covers the viewport.
    UniformToFill,
    /// Stretch to fill the viewport, ignoring aspect ratio.
    Fill,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Whether the background shows a static image or an animated slideshow.
pub enum DisplayMode {
    /// Show a single static frame; the slideshow timer stays idle.
    Single,
    /// Cycle through decoded frames on the configured interval.
    #[default]
    Animated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Decode-time fit parameters derived from a [`SlideshowConfig`].
pub struct FitPolicy {
    /// Configured presentation fit mode.
    pub mode: FitMode,
    /// Max frame width in pixels applied under [`FitMode::None`]; 0 means
    /// unbounded.
    pub max_width: u32,
    /// Max frame height in pixels applied under [`FitMode::None`]; 0 means
    /// unbounded.
    pub max_height: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A complete slideshow configuration snapshot.
///
/// A snapshot is pure data: it can be built programmatically or
/// (de)serialized via Serde (JSON). The slideshow core reads snapshots and
/// never writes them back; persistence belongs to the host application.
pub struct SlideshowConfig {
    /// Path of the source GIF file.
    pub source_path: PathBuf,
    /// Interval between frame changes in milliseconds.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
    /// Restart from the first frame when the sequence is exhausted.
    #[serde(default = "default_loop_slideshow")]
    pub loop_slideshow: bool,
    /// Presentation fit mode.
    #[serde(default)]
    pub fit_mode: FitMode,
    /// Max frame width in pixels under [`FitMode::None`]; 0 means unbounded.
    #[serde(default)]
    pub max_width: u32,
    /// Max frame height in pixels under [`FitMode::None`]; 0 means unbounded.
    #[serde(default)]
    pub max_height: u32,
    /// Display mode selecting between a static image and the slideshow.
    #[serde(default)]
    pub mode: DisplayMode,
}

fn default_update_interval_ms() -> u64 {
    1_000
}

fn default_loop_slideshow() -> bool {
    true
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            update_interval_ms: default_update_interval_ms(),
            loop_slideshow: default_loop_slideshow(),
            fit_mode: FitMode::default(),
            max_width: 0,
            max_height: 0,
            mode: DisplayMode::default(),
        }
    }
}

impl SlideshowConfig {
    /// Interval between frame changes.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    /// Decode-time fit parameters.
    pub fn fit_policy(&self) -> FitPolicy {
        FitPolicy {
            mode: self.fit_mode,
            max_width: self.max_width,
            max_height: self.max_height,
        }
    }

    /// Validate invariants the type system cannot express.
    pub fn validate(&self) -> BackdropResult<()> {
        if self.update_interval_ms == 0 {
            return Err(BackdropError::validation("update_interval_ms must be > 0"));
        }
        if self.mode == DisplayMode::Animated && self.source_path.as_os_str().is_empty() {
            return Err(BackdropError::validation(
                "source_path must be set in animated mode",
            ));
        }
        Ok(())
    }

    /// Parse a configuration snapshot from JSON text.
    pub fn from_json_str(json: &str) -> BackdropResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BackdropError::serde(format!("parse slideshow config: {e}")))
    }

    /// Read and parse a configuration snapshot from a JSON file.
    pub fn from_json_file(path: &Path) -> BackdropResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read slideshow config from '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
