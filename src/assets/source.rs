use std::{fmt, path::PathBuf, str::FromStr, sync::Arc};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::foundation::error::{StudioError, StudioResult};

/// Inline image payload carried by a `data:` URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUrl {
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Decoded payload bytes.
    pub bytes: Arc<Vec<u8>>,
}

impl DataUrl {
    /// Wrap raw bytes under `media_type`.
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            media_type: media_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Parse `data:<media-type>;base64,<payload>`.
    ///
    /// Only base64 payloads are accepted. The media type must be an image type or
    /// `application/octet-stream`.
    pub fn parse(s: &str) -> StudioResult<Self> {
        let rest = strip_prefix_ignore_case(s.trim(), "data:")
            .ok_or_else(|| StudioError::validation("data URL must start with 'data:'"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| StudioError::validation("data URL is missing ','"))?;

        let (media_type, is_base64) = match strip_suffix_ignore_case(meta, ";base64") {
            Some(mt) => (mt, true),
            None => (meta, false),
        };
        if !is_base64 {
            return Err(StudioError::validation(
                "data URL payload must be base64-encoded",
            ));
        }

        let media_type = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let media_type = if media_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            media_type
        };
        if !media_type.starts_with("image/") && media_type != "application/octet-stream" {
            return Err(StudioError::validation(format!(
                "data URL media type '{media_type}' is not an image"
            )));
        }

        let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| StudioError::validation(format!("data URL base64 payload: {e}")))?;

        Ok(Self::new(media_type, bytes))
    }

    /// Serialize back to `data:<media-type>;base64,<payload>`.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type,
            STANDARD.encode(self.bytes.as_slice())
        )
    }
}

/// A reference to an image resource: inline bytes, a local file, or a remote URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRef {
    /// Inline bytes (from a `data:` URL or handed over directly).
    Data(DataUrl),
    /// Local filesystem path.
    File(PathBuf),
    /// `http(s)` URL.
    Remote(url::Url),
}

impl ImageRef {
    /// Parse a reference string.
    ///
    /// Accepts `data:` URLs, `http(s)://` and `file://` URLs, and bare paths.
    pub fn parse(s: &str) -> StudioResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(StudioError::validation("image reference must be non-empty"));
        }
        if strip_prefix_ignore_case(s, "data:").is_some() {
            return DataUrl::parse(s).map(Self::Data);
        }

        match url::Url::parse(s) {
            Ok(u) => match u.scheme() {
                "http" | "https" => Ok(Self::Remote(u)),
                "file" => u.to_file_path().map(Self::File).map_err(|_| {
                    StudioError::validation(format!("file URL '{s}' has no local path"))
                }),
                // `C:\photos\a.jpg` parses with a one-letter scheme.
                scheme if scheme.len() == 1 => Ok(Self::File(PathBuf::from(s))),
                scheme => Err(StudioError::validation(format!(
                    "unsupported image URL scheme '{scheme}'"
                ))),
            },
            Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Self::File(PathBuf::from(s))),
            Err(e) => Err(StudioError::validation(format!(
                "invalid image reference '{s}': {e}"
            ))),
        }
    }

    /// In-memory reference for already-loaded encoded bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::Data(DataUrl::new("application/octet-stream", bytes))
    }

    /// Whether fetching this reference touches the network.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl FromStr for ImageRef {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(d) => write!(f, "data:{} ({} bytes)", d.media_type, d.bytes.len()),
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Remote(u) => write!(f, "{u}"),
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let split = s.len().checked_sub(suffix.len())?;
    let tail = s.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &s[..split])
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
