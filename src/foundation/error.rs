use std::fmt;

/// Convenience result type used across frame-studio.
pub type StudioResult<T> = Result<T, StudioError>;

/// Which of the two pipeline inputs a decode failure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceRole {
    /// The user-supplied photo.
    Source,
    /// The decorative frame overlay.
    Frame,
}

impl fmt::Display for ResourceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Frame => f.write_str("frame"),
        }
    }
}

/// Export failure categories. None of them invalidates the artifact being exported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportErrorKind {
    /// The platform cannot share files.
    ShareUnsupported,
    /// The share surface was available but reported a failure.
    ShareFailed,
    /// Remote upload (image host or object store) failed.
    UploadFailed,
}

impl fmt::Display for ExportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShareUnsupported => f.write_str("share-unsupported"),
            Self::ShareFailed => f.write_str("share-failed"),
            Self::UploadFailed => f.write_str("upload-failed"),
        }
    }
}

/// Top-level error taxonomy used by the pipeline and its adapters.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// A resource could not be fetched or decoded; the whole composite is aborted.
    #[error("failed to decode {which} image: {message}")]
    ResourceDecode {
        /// Resource that failed.
        which: ResourceRole,
        /// Human-readable cause.
        message: String,
    },

    /// Drawing or encoding failed after both resources decoded.
    #[error("composite error: {0}")]
    Composite(String),

    /// An export action failed. The artifact stays valid.
    #[error("export error ({kind}): {message}")]
    Export {
        /// Failure category.
        kind: ExportErrorKind,
        /// Human-readable cause.
        message: String,
    },

    /// Invalid user-provided data (refs, catalog entries).
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Build a [`StudioError::ResourceDecode`] for the source image.
    pub fn source_decode(msg: impl Into<String>) -> Self {
        Self::ResourceDecode {
            which: ResourceRole::Source,
            message: msg.into(),
        }
    }

    /// Build a [`StudioError::ResourceDecode`] for the frame image.
    pub fn frame_decode(msg: impl Into<String>) -> Self {
        Self::ResourceDecode {
            which: ResourceRole::Frame,
            message: msg.into(),
        }
    }

    /// Build a [`StudioError::ResourceDecode`] for `which`.
    pub fn decode(which: ResourceRole, msg: impl Into<String>) -> Self {
        Self::ResourceDecode {
            which,
            message: msg.into(),
        }
    }

    /// Build a [`StudioError::Composite`] value.
    pub fn composite(msg: impl Into<String>) -> Self {
        Self::Composite(msg.into())
    }

    /// Build a [`StudioError::Export`] value.
    pub fn export(kind: ExportErrorKind, msg: impl Into<String>) -> Self {
        Self::Export {
            kind,
            message: msg.into(),
        }
    }

    /// Build a [`StudioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StudioError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Resource a decode failure is attributed to, if this is one.
    pub fn resource_role(&self) -> Option<ResourceRole> {
        match self {
            Self::ResourceDecode { which, .. } => Some(*which),
            _ => None,
        }
    }

    /// Export failure category, if this is an export error.
    pub fn export_kind(&self) -> Option<ExportErrorKind> {
        match self {
            Self::Export { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this error ends a composite attempt (as opposed to a per-export failure).
    pub fn is_terminal_for_composite(&self) -> bool {
        matches!(self, Self::ResourceDecode { .. } | Self::Composite(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
