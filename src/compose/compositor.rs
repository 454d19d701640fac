use crate::compose::geometry::{self, CompositePlan};
use crate::compose::raster::Surface;
use crate::encode::jpeg::{CompositedArtifact, JPEG_QUALITY, encode_jpeg};
use crate::foundation::core::Rect;
use crate::foundation::error::{StudioError, StudioResult};
use crate::load::loader::LoadedResources;

/// Turns decoded resources into a [`CompositedArtifact`].
///
/// Stateless: every call allocates and drops its own [`Surface`].
#[derive(Clone, Copy, Debug)]
pub struct Compositor {
    quality: u8,
}

impl Default for Compositor {
    fn default() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan the canvas and crop for `resources` without drawing.
    pub fn plan(&self, resources: &LoadedResources) -> StudioResult<CompositePlan> {
        geometry::plan(
            resources.source.dimensions(),
            resources.frame.as_ref().map(|f| f.dimensions()),
        )
    }

    /// Draw the composite into a fresh surface.
    pub fn render(&self, resources: &LoadedResources) -> StudioResult<Surface> {
        let plan = self.plan(resources)?;
        let mut surface = Surface::new(plan.canvas)?;
        let canvas = plan.canvas.rect();

        surface.draw_image(&resources.source, plan.source_crop, canvas)?;
        if let Some(frame) = &resources.frame {
            let frame_rect = Rect::new(
                0.0,
                0.0,
                f64::from(frame.width()),
                f64::from(frame.height()),
            );
            surface.draw_image(frame, frame_rect, canvas)?;
        }
        Ok(surface)
    }

    /// Draw and encode.
    #[tracing::instrument(skip_all, fields(framed = resources.frame.is_some()))]
    pub fn composite(&self, resources: &LoadedResources) -> StudioResult<CompositedArtifact> {
        let surface = self.render(resources)?;
        encode_jpeg(&surface, self.quality)
    }

    /// [`Self::composite`] on the blocking pool.
    pub async fn composite_async(
        &self,
        resources: LoadedResources,
    ) -> StudioResult<CompositedArtifact> {
        let this = *self;
        tokio::task::spawn_blocking(move || this.composite(&resources))
            .await
            .map_err(|e| StudioError::composite(format!("composite task failed: {e}")))?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/compositor.rs"]
mod tests;
