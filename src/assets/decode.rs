use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Largest SVG raster edge accepted when rasterizing a vector frame.
const MAX_SVG_DIM: u32 = 16_384;

/// Decoded raster in premultiplied RGBA8 form with its intrinsic dimensions.
///
/// The buffer always holds exactly `width * height * 4` bytes.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl Bitmap {
    /// Wrap premultiplied pixels, checking the buffer length against the dimensions.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> StudioResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| StudioError::validation("bitmap size overflow"))?;
        if rgba8_premul.len() != expected {
            return Err(StudioError::validation(format!(
                "bitmap {width}x{height} expects {expected} bytes, got {}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Intrinsic `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel bytes in row-major premultiplied RGBA8.
    pub fn data(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Premultiplied pixel at `(x, y)`. Coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = &self.rgba8_premul[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }
}

/// Decode encoded raster bytes (JPEG, PNG, WebP, ...) and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StudioResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(Bitmap {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Parse SVG bytes and rasterize them at their intrinsic size.
pub fn rasterize_svg(bytes: &[u8]) -> StudioResult<Bitmap> {
    fn to_px(v: f32) -> StudioResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(StudioError::validation("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(StudioError::validation(format!(
            "svg raster size too large: {width}x{height} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| StudioError::composite("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Bitmap::from_premul(width, height, pixmap.data().to_vec())
}

/// Decode a fetched resource, dispatching SVG documents to the vector rasterizer.
///
/// Bytes with a recognizable raster signature always go to the raster decoder.
pub fn decode_resource(bytes: &[u8]) -> StudioResult<Bitmap> {
    if image::guess_format(bytes).is_err() && looks_like_svg(bytes) {
        rasterize_svg(bytes)
    } else {
        decode_image(bytes)
    }
}

/// Prolog bytes scanned for the root element.
const SVG_SNIFF_LIMIT: usize = 64 * 1024;

/// Whether the first element after the XML prolog (declaration, processing instructions,
/// comments, DOCTYPE) is `<svg`.
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LIMIT)];
    let mut rest = head.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(head);
    loop {
        rest = trim_ascii_start(rest);
        if rest.starts_with(b"<svg") {
            return true;
        }
        let skipped = if rest.starts_with(b"<?") {
            skip_past(rest, b"?>")
        } else if rest.starts_with(b"<!--") {
            skip_past(rest, b"-->")
        } else if rest.starts_with(b"<!") {
            skip_declaration(rest)
        } else {
            None
        };
        match skipped {
            Some(r) => rest = r,
            None => return false,
        }
    }
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}

fn skip_past<'a>(bytes: &'a [u8], end: &[u8]) -> Option<&'a [u8]> {
    bytes
        .windows(end.len())
        .position(|w| w == end)
        .map(|i| &bytes[i + end.len()..])
}

/// Skip `<!DOCTYPE ...>`, including a bracketed internal subset.
fn skip_declaration(bytes: &[u8]) -> Option<&[u8]> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            b'>' if depth == 0 => return Some(&bytes[i + 1..]),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
