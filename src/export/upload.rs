use std::future::Future;
use std::time::Duration;

use anyhow::Context;

use crate::config::{ImageHostConfig, ObjectStoreConfig};
use crate::encode::jpeg::CompositedArtifact;
use crate::export::anon::AnonId;
use crate::export::guard::{ExportOutcome, InFlight};
use crate::foundation::core::unix_millis;
use crate::foundation::error::{ExportErrorKind, StudioError, StudioResult};

/// Fallback message when the image host gives no usable error body.
pub const IMAGE_HOST_FAILED: &str = "image host upload failed";

/// Publishes an artifact and yields a public URL for it.
pub trait RemoteLink: Send + Sync {
    fn publish(
        &self,
        artifact: &CompositedArtifact,
    ) -> impl Future<Output = StudioResult<String>> + Send;
}

fn upload_failed(msg: impl Into<String>) -> StudioError {
    StudioError::export(ExportErrorKind::UploadFailed, msg)
}

fn build_client(timeout: Duration) -> StudioResult<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("frame-studio/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .context("build http client")?)
}

/// Pull `error.message` (image host) or a top-level `message`/`error` string out of a JSON body.
fn error_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    let msg = v
        .pointer("/error/message")
        .or_else(|| v.get("message"))
        .or_else(|| v.get("error"))?;
    msg.as_str().map(str::to_string)
}

/// Interpret an image host response body.
pub fn parse_image_host_response(success: bool, body: &str) -> StudioResult<String> {
    if !success {
        return Err(upload_failed(
            error_message(body).unwrap_or_else(|| IMAGE_HOST_FAILED.to_string()),
        ));
    }
    let v: serde_json::Value =
        serde_json::from_str(body).map_err(|e| upload_failed(format!("invalid response: {e}")))?;
    v.get("secure_url")
        .and_then(|u| u.as_str())
        .map(str::to_string)
        .ok_or_else(|| upload_failed("response has no secure_url"))
}

/// Unsigned uploads to a Cloudinary-compatible image host.
#[derive(Clone, Debug)]
pub struct ImageHostUploader {
    client: reqwest::Client,
    config: ImageHostConfig,
}

impl ImageHostUploader {
    pub fn new(config: ImageHostConfig, timeout: Duration) -> StudioResult<Self> {
        if config.cloud_name.trim().is_empty() || config.upload_preset.trim().is_empty() {
            return Err(StudioError::config(
                "image_host.cloud_name and image_host.upload_preset are required",
            ));
        }
        Ok(Self {
            client: build_client(timeout)?,
            config,
        })
    }

    /// `{endpoint}/v1_1/{cloud_name}/image/upload`.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/image/upload",
            self.config.endpoint.trim_end_matches('/'),
            self.config.cloud_name
        )
    }
}

impl RemoteLink for ImageHostUploader {
    #[tracing::instrument(skip_all, fields(cloud = %self.config.cloud_name))]
    async fn publish(&self, artifact: &CompositedArtifact) -> StudioResult<String> {
        let form = reqwest::multipart::Form::new()
            .text("file", artifact.to_data_url())
            .text("upload_preset", self.config.upload_preset.clone());

        let resp = self
            .client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_failed(format!("{IMAGE_HOST_FAILED}: {e}")))?;
        let success = resp.status().is_success();
        let body = resp
            .text()
            .await
            .map_err(|e| upload_failed(format!("read response: {e}")))?;
        parse_image_host_response(success, &body)
    }
}

/// Metadata row written after a successful object store upload.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UploadRecord {
    pub anon_id: AnonId,
    pub storage_path: String,
    pub public_url: String,
}

/// Object key for an upload by `anon` at `millis`.
pub fn object_path(anon: &AnonId, millis: u128) -> String {
    format!("uploads/{anon}/{millis}_star_photo.jpg")
}

/// Uploads to a Supabase-compatible object store and records the upload.
#[derive(Clone, Debug)]
pub struct ObjectStoreUploader {
    client: reqwest::Client,
    base_url: String,
    config: ObjectStoreConfig,
    anon: AnonId,
}

impl ObjectStoreUploader {
    pub fn new(config: ObjectStoreConfig, anon: AnonId, timeout: Duration) -> StudioResult<Self> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        url::Url::parse(&base_url).map_err(|e| {
            StudioError::config(format!("object_store.base_url '{}': {e}", config.base_url))
        })?;
        if config.bucket.trim().is_empty() {
            return Err(StudioError::config("object_store.bucket is required"));
        }
        Ok(Self {
            client: build_client(timeout)?,
            base_url,
            config,
            anon,
        })
    }

    /// Endpoint the bytes are sent to.
    pub fn object_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{path}",
            self.base_url, self.config.bucket
        )
    }

    /// Publicly readable URL of an uploaded object.
    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.config.bucket
        )
    }

    /// Endpoint receiving [`UploadRecord`]s.
    pub fn metadata_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.config.metadata_table)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.config.anon_key)
            .bearer_auth(&self.config.anon_key)
    }

    async fn check(resp: reqwest::Response, what: &str) -> StudioResult<()> {
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        let detail = error_message(&body).unwrap_or_else(|| status.to_string());
        Err(upload_failed(format!("{what}: {detail}")))
    }
}

impl RemoteLink for ObjectStoreUploader {
    #[tracing::instrument(skip_all, fields(bucket = %self.config.bucket, anon = %self.anon))]
    async fn publish(&self, artifact: &CompositedArtifact) -> StudioResult<String> {
        let path = object_path(&self.anon, unix_millis());

        let resp = self
            .authorized(self.client.post(self.object_url(&path)))
            .header(reqwest::header::CONTENT_TYPE, artifact.mime())
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .body(artifact.as_bytes().to_vec())
            .send()
            .await
            .map_err(|e| upload_failed(format!("storage upload: {e}")))?;
        Self::check(resp, "storage upload").await?;

        let record = UploadRecord {
            anon_id: self.anon.clone(),
            storage_path: path.clone(),
            public_url: self.public_url(&path),
        };
        if self.config.metadata_table.trim().is_empty() {
            return Ok(record.public_url);
        }
        let resp = self
            .authorized(self.client.post(self.metadata_url()))
            .header("prefer", "return=minimal")
            .json(&record)
            .send()
            .await
            .map_err(|e| upload_failed(format!("metadata insert: {e}")))?;
        Self::check(resp, "metadata insert").await?;

        tracing::debug!(%path, "recorded upload");
        Ok(record.public_url)
    }
}

/// Wraps a [`RemoteLink`] with the single-flight guard.
#[derive(Debug)]
pub struct LinkAdapter<L> {
    link: L,
    in_flight: InFlight,
}

impl<L: RemoteLink> LinkAdapter<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            in_flight: InFlight::new(),
        }
    }

    /// Publish `artifact`; failures are reported as [`ExportErrorKind::UploadFailed`].
    pub async fn publish(
        &self,
        artifact: &CompositedArtifact,
    ) -> StudioResult<ExportOutcome<String>> {
        let Some(_guard) = self.in_flight.try_begin() else {
            return Ok(ExportOutcome::Busy);
        };
        match self.link.publish(artifact).await {
            Ok(url) => {
                tracing::info!(%url, "published artifact");
                Ok(ExportOutcome::Done(url))
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                Err(match e {
                    e @ StudioError::Export { .. } => e,
                    other => upload_failed(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/upload.rs"]
mod tests;
