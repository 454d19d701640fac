use std::future::Future;

use crate::encode::jpeg::CompositedArtifact;
use crate::export::guard::{ExportOutcome, InFlight};
use crate::foundation::core::unix_millis;
use crate::foundation::error::{ExportErrorKind, StudioError, StudioResult};

/// Message shown when the platform cannot share files.
pub const SHARE_UNSUPPORTED_MESSAGE: &str =
    "Native sharing not supported on this device. Please use Download.";

/// File-like payload handed to a share surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShareFile {
    pub file_name: String,
    pub mime: &'static str,
    pub title: String,
    pub text: String,
    pub artifact: CompositedArtifact,
}

impl ShareFile {
    /// Wrap `artifact` with the default share title and text.
    pub fn new(artifact: CompositedArtifact) -> Self {
        Self {
            file_name: format!("star-photo-{}.jpg", unix_millis()),
            mime: artifact.mime(),
            title: "My Star Photo".to_string(),
            text: "Check out my photo!".to_string(),
            artifact,
        }
    }
}

/// A platform share surface.
pub trait ShareTarget: Send + Sync {
    /// Whether this surface can share `file` at all.
    fn can_share_files(&self, file: &ShareFile) -> bool;

    /// Present the share surface for `file`.
    fn share(&self, file: ShareFile) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Share surface of a headless environment: never supports file sharing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoShareTarget;

impl ShareTarget for NoShareTarget {
    fn can_share_files(&self, _file: &ShareFile) -> bool {
        false
    }

    async fn share(&self, _file: ShareFile) -> anyhow::Result<()> {
        anyhow::bail!("file sharing is not available")
    }
}

/// Wraps a [`ShareTarget`] with the single-flight guard and error mapping.
#[derive(Debug)]
pub struct ShareAdapter<T> {
    target: T,
    in_flight: InFlight,
}

impl<T: ShareTarget> ShareAdapter<T> {
    pub fn new(target: T) -> Self {
        Self {
            target,
            in_flight: InFlight::new(),
        }
    }

    /// Share `artifact` through the target.
    ///
    /// An unsupported target yields [`ExportErrorKind::ShareUnsupported`], which callers
    /// present as a notice rather than a failure.
    pub async fn share(&self, artifact: &CompositedArtifact) -> StudioResult<ExportOutcome<()>> {
        let Some(_guard) = self.in_flight.try_begin() else {
            return Ok(ExportOutcome::Busy);
        };

        let file = ShareFile::new(artifact.clone());
        if !self.target.can_share_files(&file) {
            tracing::info!("file sharing unsupported");
            return Err(StudioError::export(
                ExportErrorKind::ShareUnsupported,
                SHARE_UNSUPPORTED_MESSAGE,
            ));
        }

        let name = file.file_name.clone();
        self.target.share(file).await.map_err(|e| {
            tracing::warn!(error = %e, "share failed");
            StudioError::export(
                ExportErrorKind::ShareFailed,
                format!("Could not share photo: {e:#}"),
            )
        })?;
        tracing::info!(file = %name, "shared artifact");
        Ok(ExportOutcome::Done(()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/share.rs"]
mod tests;
