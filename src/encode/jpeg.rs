use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;

use crate::compose::raster::Surface;
use crate::foundation::core::CanvasSize;
use crate::foundation::error::{StudioError, StudioResult};

/// JPEG quality used for every artifact (0.9 on a 0..1 scale).
pub const JPEG_QUALITY: u8 = 90;

/// MIME type of every artifact.
pub const ARTIFACT_MIME: &str = "image/jpeg";

/// Final encoded composite. Immutable; clones share the same bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositedArtifact {
    size: CanvasSize,
    bytes: Arc<[u8]>,
}

impl CompositedArtifact {
    /// Output dimensions.
    pub fn size(&self) -> CanvasSize {
        self.size
    }

    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        self.size.width
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        self.size.height
    }

    /// Encoded JPEG bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of [`Self::as_bytes`].
    pub fn mime(&self) -> &'static str {
        ARTIFACT_MIME
    }

    /// `data:image/jpeg;base64,...` form, as handed to image-host uploads.
    pub fn to_data_url(&self) -> String {
        format!("data:{ARTIFACT_MIME};base64,{}", STANDARD.encode(&self.bytes))
    }
}

/// Encode `surface` as a JPEG at `quality` (1..=100).
///
/// JPEG has no alpha; the premultiplied color channels are written directly, so uncovered
/// transparent areas come out black.
pub fn encode_jpeg(surface: &Surface, quality: u8) -> StudioResult<CompositedArtifact> {
    let size = surface.size();
    let rgb: Vec<u8> = surface
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut buf = Vec::with_capacity(rgb.len() / 8);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
        encoder
            .encode(
                &rgb,
                size.width,
                size.height,
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| StudioError::composite(format!("jpeg encode {size}: {e}")))?;
    }

    tracing::debug!(%size, bytes = buf.len(), quality, "encoded artifact");
    Ok(CompositedArtifact {
        size,
        bytes: Arc::from(buf),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/jpeg.rs"]
mod tests;
