//! Canvas sizing and cover-fit crop arithmetic.
//!
//! Framed composites take their shape from the frame: the canvas is [`FRAMED_WIDTH`] wide and
//! as tall as the frame's aspect ratio demands, and the photo is cover-fit into it. Frameless
//! composites keep the photo's own aspect ratio and only downscale so that the long edge fits
//! within [`MAX_DIMENSION`].

use crate::foundation::core::{CanvasSize, Rect};
use crate::foundation::error::{StudioError, StudioResult};

/// Canvas width for framed composites.
pub const FRAMED_WIDTH: u32 = 1080;
/// Long-edge bound for frameless composites.
pub const MAX_DIMENSION: u32 = 1920;
/// Aspect ratio assumed when a frame reports a zero dimension.
pub const FALLBACK_FRAME_ASPECT: f64 = 9.0 / 16.0;

/// Geometry for one composite run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositePlan {
    /// Output canvas.
    pub canvas: CanvasSize,
    /// Region of the source image drawn onto the whole canvas, in source pixels.
    pub source_crop: Rect,
    /// Whether a frame overlay is drawn on top.
    pub framed: bool,
}

/// `w_f / h_f`, or [`FALLBACK_FRAME_ASPECT`] when either dimension is zero.
pub fn frame_aspect(frame_width: u32, frame_height: u32) -> f64 {
    if frame_width == 0 || frame_height == 0 {
        return FALLBACK_FRAME_ASPECT;
    }
    f64::from(frame_width) / f64::from(frame_height)
}

/// Canvas for a framed composite: fixed width, height from the frame aspect.
pub fn framed_canvas(frame_aspect: f64) -> CanvasSize {
    let aspect = if frame_aspect.is_finite() && frame_aspect > 0.0 {
        frame_aspect
    } else {
        FALLBACK_FRAME_ASPECT
    };
    CanvasSize {
        width: FRAMED_WIDTH,
        height: to_px(f64::from(FRAMED_WIDTH) / aspect),
    }
}

/// Canvas for a frameless composite: source aspect preserved, long edge capped.
pub fn frameless_canvas(source_width: u32, source_height: u32) -> StudioResult<CanvasSize> {
    if source_width == 0 || source_height == 0 {
        return Err(StudioError::composite(format!(
            "source image has no area ({source_width}x{source_height})"
        )));
    }
    let aspect = f64::from(source_width) / f64::from(source_height);
    let canvas = if source_width > source_height {
        let width = source_width.min(MAX_DIMENSION);
        CanvasSize {
            width,
            height: to_px(f64::from(width) / aspect),
        }
    } else {
        let height = source_height.min(MAX_DIMENSION);
        CanvasSize {
            width: to_px(f64::from(height) * aspect),
            height,
        }
    };
    Ok(canvas)
}

/// Centered crop of the source with the canvas aspect ratio, covering the whole canvas.
///
/// The longer relative dimension of the source is cropped; the other is kept in full.
pub fn cover_crop(source_width: u32, source_height: u32, canvas: CanvasSize) -> Rect {
    let w_u = f64::from(source_width);
    let h_u = f64::from(source_height);
    let canvas_aspect = canvas.aspect();
    let source_aspect = w_u / h_u;

    if source_aspect > canvas_aspect {
        let crop_h = h_u;
        let crop_w = (crop_h * canvas_aspect).min(w_u);
        let x = (w_u - crop_w) / 2.0;
        Rect::new(x, 0.0, x + crop_w, crop_h)
    } else {
        let crop_w = w_u;
        let crop_h = (crop_w / canvas_aspect).min(h_u);
        let y = (h_u - crop_h) / 2.0;
        Rect::new(0.0, y, crop_w, y + crop_h)
    }
}

/// Plan a composite for a source of `source` size and an optional frame of `frame` size.
pub fn plan(source: (u32, u32), frame: Option<(u32, u32)>) -> StudioResult<CompositePlan> {
    let (w_u, h_u) = source;
    if w_u == 0 || h_u == 0 {
        return Err(StudioError::composite(format!(
            "source image has no area ({w_u}x{h_u})"
        )));
    }

    let plan = match frame {
        Some((w_f, h_f)) => {
            let canvas = framed_canvas(frame_aspect(w_f, h_f));
            CompositePlan {
                canvas,
                source_crop: cover_crop(w_u, h_u, canvas),
                framed: true,
            }
        }
        None => CompositePlan {
            canvas: frameless_canvas(w_u, h_u)?,
            source_crop: Rect::new(0.0, 0.0, f64::from(w_u), f64::from(h_u)),
            framed: false,
        },
    };
    tracing::debug!(
        canvas = %plan.canvas,
        crop = ?plan.source_crop,
        framed = plan.framed,
        "planned composite"
    );
    Ok(plan)
}

fn to_px(v: f64) -> u32 {
    v.round().clamp(1.0, f64::from(u32::MAX)) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/compose/geometry.rs"]
mod tests;
