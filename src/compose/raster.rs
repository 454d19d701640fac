use crate::assets::decode::Bitmap;
use crate::foundation::core::{CanvasSize, Rect};
use crate::foundation::error::{StudioError, StudioResult};
use crate::foundation::math::mul_div255_u8;

/// Largest surface edge the compositor will allocate.
pub const MAX_SURFACE_DIM: u32 = 16_384;

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// In-memory premultiplied RGBA8 drawing surface, owned by exactly one composite run.
#[derive(Clone, Debug)]
pub struct Surface {
    size: CanvasSize,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a fully transparent surface.
    pub fn new(size: CanvasSize) -> StudioResult<Self> {
        let CanvasSize { width, height } = size;
        if width == 0 || height == 0 {
            return Err(StudioError::composite(format!(
                "surface must be non-empty, got {size}"
            )));
        }
        if width > MAX_SURFACE_DIM || height > MAX_SURFACE_DIM {
            return Err(StudioError::composite(format!(
                "surface too large: {size} (max {MAX_SURFACE_DIM}x{MAX_SURFACE_DIM})"
            )));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| StudioError::composite("surface size overflow"))?;
        Ok(Self {
            size,
            data: vec![0u8; len],
        })
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Row-major premultiplied RGBA8 pixels.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let idx = self.index(x, y);
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.size.width as usize) + (x as usize)) * 4
    }

    /// Draw the `src` region of `image` scaled into the `dst` region of this surface.
    ///
    /// Samples bilinearly at destination pixel centers, clamping to the edges of `src`, and
    /// blends with source-over. Destination pixels outside the surface are skipped.
    pub fn draw_image(&mut self, image: &Bitmap, src: Rect, dst: Rect) -> StudioResult<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(StudioError::composite("cannot draw an empty image"));
        }
        let image_rect = Rect::new(
            0.0,
            0.0,
            f64::from(image.width()),
            f64::from(image.height()),
        );
        let src = src.intersect(image_rect);
        if src.width() <= 0.0 || src.height() <= 0.0 {
            return Err(StudioError::composite(format!(
                "source rect {src:?} lies outside the {}x{} image",
                image.width(),
                image.height()
            )));
        }
        if dst.width() <= 0.0 || dst.height() <= 0.0 {
            return Ok(());
        }

        let x_begin = dst.x0.max(0.0).floor() as u32;
        let y_begin = dst.y0.max(0.0).floor() as u32;
        let x_end = (dst.x1.ceil().max(0.0) as u32).min(self.size.width);
        let y_end = (dst.y1.ceil().max(0.0) as u32).min(self.size.height);

        let scale_x = src.width() / dst.width();
        let scale_y = src.height() / dst.height();

        for y in y_begin..y_end {
            let cy = f64::from(y) + 0.5;
            if cy < dst.y0 || cy >= dst.y1 {
                continue;
            }
            let sy = src.y0 + (cy - dst.y0) * scale_y;
            for x in x_begin..x_end {
                let cx = f64::from(x) + 0.5;
                if cx < dst.x0 || cx >= dst.x1 {
                    continue;
                }
                let sx = src.x0 + (cx - dst.x0) * scale_x;
                let px = sample_bilinear(image, src, sx, sy);
                let idx = self.index(x, y);
                let d = [
                    self.data[idx],
                    self.data[idx + 1],
                    self.data[idx + 2],
                    self.data[idx + 3],
                ];
                self.data[idx..idx + 4].copy_from_slice(&over(d, px));
            }
        }
        Ok(())
    }

    /// Convert into an immutable bitmap.
    pub fn into_bitmap(self) -> StudioResult<Bitmap> {
        Bitmap::from_premul(self.size.width, self.size.height, self.data)
    }
}

/// Bilinear sample at continuous position `(sx, sy)` restricted to texels inside `bounds`.
fn sample_bilinear(image: &Bitmap, bounds: Rect, sx: f64, sy: f64) -> PremulRgba8 {
    let min_x = bounds.x0.floor().max(0.0);
    let min_y = bounds.y0.floor().max(0.0);
    let max_x = (bounds.x1.ceil() - 1.0).min(f64::from(image.width() - 1)).max(min_x);
    let max_y = (bounds.y1.ceil() - 1.0).min(f64::from(image.height() - 1)).max(min_y);

    let fx = (sx - 0.5).clamp(min_x, max_x);
    let fy = (sy - 0.5).clamp(min_y, max_y);
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let x1 = (x0 + 1.0).min(max_x);
    let y1 = (y0 + 1.0).min(max_y);

    let p00 = image.pixel(x0 as u32, y0 as u32);
    let p10 = image.pixel(x1 as u32, y0 as u32);
    let p01 = image.pixel(x0 as u32, y1 as u32);
    let p11 = image.pixel(x1 as u32, y1 as u32);

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = f64::from(p00[i]) * (1.0 - tx) + f64::from(p10[i]) * tx;
        let bottom = f64::from(p01[i]) * (1.0 - tx) + f64::from(p11[i]) * tx;
        out[i] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/compose/raster.rs"]
mod tests;
