use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::assets::fetch::Fetcher;
use crate::assets::source::ImageRef;
use crate::catalog::frames::FrameDescriptor;
use crate::compose::compositor::Compositor;
use crate::encode::jpeg::CompositedArtifact;
use crate::foundation::error::StudioResult;
use crate::load::loader::ResourceLoader;

/// Monotonic id of one composite request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

/// What the preview currently shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PreviewState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// The latest request is still loading or compositing.
    Processing {
        /// Request being processed.
        token: RequestToken,
    },
    /// The latest request produced an artifact.
    Ready {
        /// Request that produced the artifact.
        token: RequestToken,
        /// The artifact on display.
        artifact: CompositedArtifact,
    },
    /// The latest request failed; there is no result to show.
    Failed {
        /// Request that failed.
        token: RequestToken,
        /// User-facing cause.
        message: String,
    },
}

impl PreviewState {
    /// Token of the request this state belongs to.
    pub fn token(&self) -> Option<RequestToken> {
        match self {
            Self::Idle => None,
            Self::Processing { token }
            | Self::Ready { token, .. }
            | Self::Failed { token, .. } => Some(*token),
        }
    }

    /// Artifact on display, if any.
    pub fn artifact(&self) -> Option<&CompositedArtifact> {
        match self {
            Self::Ready { artifact, .. } => Some(artifact),
            _ => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing { .. })
    }
}

/// Drives load + composite for an interactive preview.
///
/// Every request gets a fresh [`RequestToken`]. In-flight work is never cancelled; when it
/// completes, its result is applied only if its token is still the latest one issued, so a
/// superseded request can never overwrite a newer preview.
pub struct PreviewSession<F> {
    loader: ResourceLoader<F>,
    compositor: Compositor,
    latest: AtomicU64,
    state: watch::Sender<PreviewState>,
}

impl<F: Fetcher> PreviewSession<F> {
    pub fn new(loader: ResourceLoader<F>, compositor: Compositor) -> Self {
        let (state, _) = watch::channel(PreviewState::Idle);
        Self {
            loader,
            compositor,
            latest: AtomicU64::new(0),
            state,
        }
    }

    pub fn loader(&self) -> &ResourceLoader<F> {
        &self.loader
    }

    /// Issue a new token, superseding every earlier one.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Most recently issued token, if any.
    pub fn latest(&self) -> Option<RequestToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            n => Some(RequestToken(n)),
        }
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Snapshot of the current state.
    pub fn current(&self) -> PreviewState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every applied state change.
    pub fn subscribe(&self) -> watch::Receiver<PreviewState> {
        self.state.subscribe()
    }

    /// Apply `next` unless `token` has been superseded. Returns whether it was applied.
    fn apply(&self, token: RequestToken, next: PreviewState) -> bool {
        let mut next = Some(next);
        self.state.send_if_modified(|cur| {
            if !self.is_latest(token) {
                return false;
            }
            match next.take() {
                Some(n) => {
                    *cur = n;
                    true
                }
                None => false,
            }
        })
    }

    /// Record the outcome of request `token`. Stale outcomes are dropped.
    pub fn finish(&self, token: RequestToken, outcome: StudioResult<CompositedArtifact>) -> bool {
        let next = match outcome {
            Ok(artifact) => PreviewState::Ready { token, artifact },
            Err(e) => {
                if self.is_latest(token) {
                    tracing::warn!(token = token.0, error = %e, "composite failed");
                }
                PreviewState::Failed {
                    token,
                    message: e.to_string(),
                }
            }
        };
        let applied = self.apply(token, next);
        if !applied {
            tracing::debug!(token = token.0, "discarded superseded composite result");
        }
        applied
    }

    /// Process request `token`: load, composite, then [`Self::finish`].
    pub async fn execute(
        &self,
        token: RequestToken,
        source: &ImageRef,
        frame: Option<&FrameDescriptor>,
    ) -> bool {
        if !self.apply(token, PreviewState::Processing { token }) {
            tracing::debug!(token = token.0, "request superseded before start");
            return false;
        }

        let outcome = match self.loader.load(source, frame).await {
            Ok(resources) => self.compositor.composite_async(resources).await,
            Err(e) => Err(e),
        };
        self.finish(token, outcome)
    }

    /// Start a new request and run it to completion.
    ///
    /// Returns the artifact only when this request is still the latest once it finishes.
    #[tracing::instrument(skip_all, fields(source = %source, frame = frame.map(|f| f.id.as_str())))]
    pub async fn run(
        &self,
        source: &ImageRef,
        frame: Option<&FrameDescriptor>,
    ) -> Option<CompositedArtifact> {
        let token = self.begin();
        if !self.execute(token, source, frame).await {
            return None;
        }
        match self.current() {
            PreviewState::Ready { token: t, artifact } if t == token => Some(artifact),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
