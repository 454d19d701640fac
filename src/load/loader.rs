use std::path::PathBuf;

use crate::assets::decode::{Bitmap, decode_resource};
use crate::assets::fetch::{FetchMode, Fetcher};
use crate::assets::source::ImageRef;
use crate::catalog::frames::FrameDescriptor;
use crate::foundation::error::{ResourceRole, StudioError, StudioResult};

/// Decoded inputs of one composite run.
#[derive(Clone, Debug)]
pub struct LoadedResources {
    /// The user photo.
    pub source: Bitmap,
    /// The frame overlay, when one was selected.
    pub frame: Option<Bitmap>,
}

/// Fetches and decodes the source image, then the frame.
///
/// The frame is not requested until the source has decoded, so a failure is always attributed
/// to exactly one resource and nothing partial is returned.
#[derive(Clone, Debug)]
pub struct ResourceLoader<F> {
    fetcher: F,
    frame_base_dir: Option<PathBuf>,
}

impl<F: Fetcher> ResourceLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            frame_base_dir: None,
        }
    }

    /// Directory that relative frame urls are resolved against.
    pub fn with_frame_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.frame_base_dir = Some(dir.into());
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Load `source` and, if given, the overlay described by `frame`.
    pub async fn load(
        &self,
        source: &ImageRef,
        frame: Option<&FrameDescriptor>,
    ) -> StudioResult<LoadedResources> {
        let source_bitmap = self
            .load_one(ResourceRole::Source, source, FetchMode::Credentialed)
            .await?;

        let frame_bitmap = match frame {
            Some(desc) => {
                let frame_ref = desc
                    .image_ref(self.frame_base_dir.as_deref())
                    .map_err(|e| StudioError::frame_decode(format!("frame '{}': {e}", desc.id)))?;
                Some(
                    self.load_one(ResourceRole::Frame, &frame_ref, FetchMode::Anonymous)
                        .await?,
                )
            }
            None => None,
        };

        Ok(LoadedResources {
            source: source_bitmap,
            frame: frame_bitmap,
        })
    }

    /// Load `source` and an overlay given directly by reference.
    pub async fn load_refs(
        &self,
        source: &ImageRef,
        frame: Option<&ImageRef>,
    ) -> StudioResult<LoadedResources> {
        let source_bitmap = self
            .load_one(ResourceRole::Source, source, FetchMode::Credentialed)
            .await?;
        let frame_bitmap = match frame {
            Some(r) => Some(
                self.load_one(ResourceRole::Frame, r, FetchMode::Anonymous)
                    .await?,
            ),
            None => None,
        };
        Ok(LoadedResources {
            source: source_bitmap,
            frame: frame_bitmap,
        })
    }

    #[tracing::instrument(skip(self, image), fields(image = %image))]
    async fn load_one(
        &self,
        role: ResourceRole,
        image: &ImageRef,
        mode: FetchMode,
    ) -> StudioResult<Bitmap> {
        let bytes = self
            .fetcher
            .fetch(image, mode)
            .await
            .map_err(|e| StudioError::decode(role, format!("{e:#}")))?;

        let bitmap = tokio::task::spawn_blocking(move || decode_resource(&bytes))
            .await
            .map_err(|e| StudioError::decode(role, format!("decode task failed: {e}")))?
            .map_err(|e| StudioError::decode(role, format!("{e:#}")))?;

        tracing::debug!(
            width = bitmap.width(),
            height = bitmap.height(),
            "decoded {role} image"
        );
        Ok(bitmap)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/load/loader.rs"]
mod tests;
