use std::{fs, io::Cursor, path::Path, sync::Arc, time::Duration};

use image::{AnimationDecoder, RgbaImage, codecs::gif::GifDecoder, imageops};

use crate::{
    config::model::{FitMode, FitPolicy},
    foundation::error::{BackdropError, BackdropResult},
    sequence::{Frame, FrameSequence, STANDARD_DPI},
};

#[tracing::instrument]
/// Decode the GIF file at `path` into display-ready frames.
///
/// Frames keep their original stream order, indices `0..N-1`; no
/// deduplication or reordering. Under [`FitMode::None`] each frame is resized
/// to fit within the policy's max bounds and normalized to [`STANDARD_DPI`];
/// every other mode passes frames through unresized, deferring scaling to the
/// renderer.
///
/// Fails with [`BackdropError::Decode`] when the file is missing, unreadable,
/// not a valid GIF, or contains no frames.
pub fn decode_gif_frames(path: &Path, fit: &FitPolicy) -> BackdropResult<FrameSequence> {
    let bytes = fs::read(path)
        .map_err(|e| BackdropError::decode(format!("open '{}': {e}", path.display())))?;

    let decoder = GifDecoder::new(Cursor::new(bytes))
        .map_err(|e| BackdropError::decode(format!("parse '{}' as gif: {e}", path.display())))?;

    let mut frames = Vec::new();
    for (index, result) in decoder.into_frames().enumerate() {
        let source = result.map_err(|e| {
            BackdropError::decode(format!(
                "decode frame {index} of '{}': {e}",
                path.display()
            ))
        })?;
        frames.push(prepare_frame(source, fit)?);
    }
    if frames.is_empty() {
        return Err(BackdropError::decode(format!(
            "'{}' contains no frames",
            path.display()
        )));
    }

    tracing::debug!(frames = frames.len(), "decoded gif source");
    FrameSequence::from_frames(frames)
}

/// Resample `frame` to [`STANDARD_DPI`] so its logical size equals its pixel
/// size.
///
/// Frames already at the standard density are returned unchanged (shared
/// pixel buffer). Decoded GIF frames always are; this is the conversion for
/// frames tagged with a non-standard density by an external decode backend.
pub fn normalize_density(frame: &Frame) -> BackdropResult<Frame> {
    if (frame.dpi - STANDARD_DPI).abs() < f32::EPSILON {
        return Ok(frame.clone());
    }

    let rgba = RgbaImage::from_raw(
        frame.width,
        frame.height,
        frame.rgba8_premul.as_ref().clone(),
    )
    .ok_or_else(|| BackdropError::validation("frame buffer does not match its dimensions"))?;

    let width = scaled_dimension(frame.width, STANDARD_DPI / frame.dpi);
    let height = scaled_dimension(frame.height, STANDARD_DPI / frame.dpi);
    let resized = imageops::resize(&rgba, width, height, imageops::FilterType::Triangle);

    Ok(Frame {
        width,
        height,
        rgba8_premul: Arc::new(resized.into_raw()),
        dpi: STANDARD_DPI,
        delay: frame.delay,
    })
}

fn prepare_frame(source: image::Frame, fit: &FitPolicy) -> BackdropResult<Frame> {
    let delay = Duration::from(source.delay());
    let mut rgba = source.into_buffer();
    if fit.mode == FitMode::None {
        rgba = fit_within(rgba, fit.max_width, fit.max_height);
    }

    let (width, height) = rgba.dimensions();
    let mut pixels = rgba.into_raw();
    premultiply_rgba8_in_place(&mut pixels);

    let frame = Frame {
        width,
        height,
        rgba8_premul: Arc::new(pixels),
        // gif streams carry no density metadata
        dpi: STANDARD_DPI,
        delay,
    };
    if fit.mode == FitMode::None {
        return normalize_density(&frame);
    }
    Ok(frame)
}

/// Shrink `rgba` preserving aspect ratio until it fits within the max bounds.
///
/// A bound of 0 is unbounded; an image already inside the bounds is returned
/// untouched.
fn fit_within(rgba: RgbaImage, max_width: u32, max_height: u32) -> RgbaImage {
    let (width, height) = rgba.dimensions();
    let max_w = if max_width == 0 { width } else { max_width };
    let max_h = if max_height == 0 { height } else { max_height };
    if width <= max_w && height <= max_h {
        return rgba;
    }

    let scale = (f64::from(max_w) / f64::from(width)).min(f64::from(max_h) / f64::from(height));
    let new_w = scaled_dimension(width, scale as f32);
    let new_h = scaled_dimension(height, scale as f32);
    imageops::resize(&rgba, new_w, new_h, imageops::FilterType::Triangle)
}

fn scaled_dimension(dimension: u32, scale: f32) -> u32 {
    ((dimension as f64 * f64::from(scale)).round() as u32).max(1)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
