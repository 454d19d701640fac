use std::future::Future;
use std::time::Duration;

use anyhow::Context;

use crate::assets::source::ImageRef;
use crate::foundation::error::{StudioError, StudioResult};

/// Credential policy for a fetch.
///
/// Frame overlays may live on another origin; they are always fetched [`FetchMode::Anonymous`]
/// so the composite never mixes in credentialed third-party content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Attach the configured credentials, if any.
    Credentialed,
    /// Never attach credentials or auth headers.
    Anonymous,
}

/// Byte source for [`ImageRef`]s. Each call is one suspension point of the pipeline.
pub trait Fetcher: Send + Sync {
    /// Fetch the encoded bytes behind `image`.
    fn fetch(
        &self,
        image: &ImageRef,
        mode: FetchMode,
    ) -> impl Future<Output = StudioResult<Vec<u8>>> + Send;
}

/// HTTP(S) client used for remote references.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    bearer: Option<String>,
}

impl HttpFetcher {
    /// Build a client with a request timeout.
    pub fn new(timeout: Duration) -> StudioResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("frame-studio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            bearer: None,
        })
    }

    /// Bearer token attached to [`FetchMode::Credentialed`] requests only.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    #[tracing::instrument(skip(self, url), fields(url = %url))]
    async fn get(&self, url: &url::Url, mode: FetchMode) -> StudioResult<Vec<u8>> {
        let mut req = self.client.get(url.clone());
        if let (FetchMode::Credentialed, Some(token)) = (mode, &self.bearer) {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StudioError::Other(anyhow::anyhow!(
                "GET {url} returned {status}"
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("read body of {url}"))?;
        tracing::debug!(len = bytes.len(), "fetched remote image");
        Ok(bytes.to_vec())
    }
}

/// Fetcher covering every [`ImageRef`] variant.
#[derive(Clone, Debug)]
pub struct DefaultFetcher {
    http: HttpFetcher,
}

impl DefaultFetcher {
    /// Fetcher with a 30 second HTTP timeout.
    pub fn new() -> StudioResult<Self> {
        Ok(Self {
            http: HttpFetcher::new(Duration::from_secs(30))?,
        })
    }

    /// Fetcher using an explicitly configured HTTP client.
    pub fn with_http(http: HttpFetcher) -> Self {
        Self { http }
    }
}

impl Fetcher for DefaultFetcher {
    async fn fetch(&self, image: &ImageRef, mode: FetchMode) -> StudioResult<Vec<u8>> {
        match image {
            ImageRef::Data(d) => Ok(d.bytes.as_ref().clone()),
            ImageRef::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("read image file '{}'", path.display()))?;
                Ok(bytes)
            }
            ImageRef::Remote(url) => self.http.get(url, mode).await,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
