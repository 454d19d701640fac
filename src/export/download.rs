use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::io::AsyncWriteExt;

use crate::encode::jpeg::CompositedArtifact;
use crate::export::guard::{ExportOutcome, InFlight};
use crate::foundation::core::unix_millis;
use crate::foundation::error::StudioResult;

/// Same-millisecond saves tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// File name for a download stamped at `millis`.
pub fn download_file_name(millis: u128) -> String {
    format!("photo-frame-studio-{millis}.jpg")
}

/// Saves artifacts into a directory under a timestamped name.
#[derive(Debug)]
pub struct Downloader {
    dir: PathBuf,
    in_flight: InFlight,
}

impl Downloader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            in_flight: InFlight::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `artifact` and return the saved path.
    #[tracing::instrument(skip_all, fields(dir = %self.dir.display()))]
    pub async fn save(&self, artifact: &CompositedArtifact) -> StudioResult<ExportOutcome<PathBuf>> {
        let Some(_guard) = self.in_flight.try_begin() else {
            return Ok(ExportOutcome::Busy);
        };
        let path = self.save_at(artifact, unix_millis()).await?;
        Ok(ExportOutcome::Done(path))
    }

    /// Write `artifact` under the name for `millis`, never replacing an existing file.
    ///
    /// A taken name gets a `-1`, `-2`, ... suffix.
    async fn save_at(&self, artifact: &CompositedArtifact, millis: u128) -> StudioResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create download dir '{}'", self.dir.display()))?;

        for n in 0..MAX_NAME_ATTEMPTS {
            let name = match n {
                0 => download_file_name(millis),
                n => format!("photo-frame-studio-{millis}-{n}.jpg"),
            };
            let path = self.dir.join(name);
            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(f) => f,
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("create '{}'", path.display()))
                        .into());
                }
            };
            file.write_all(artifact.as_bytes())
                .await
                .with_context(|| format!("write '{}'", path.display()))?;
            file.flush()
                .await
                .with_context(|| format!("flush '{}'", path.display()))?;

            tracing::info!(path = %path.display(), bytes = artifact.as_bytes().len(), "saved artifact");
            return Ok(path);
        }
        Err(anyhow::anyhow!(
            "no free file name for timestamp {millis} in '{}'",
            self.dir.display()
        )
        .into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/download.rs"]
mod tests;
