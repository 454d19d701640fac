use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::Context;

use crate::assets::source::ImageRef;
use crate::foundation::error::{StudioError, StudioResult};

/// Display labels of the category filter, in presentation order.
pub const CATEGORY_LABELS: [&str; 4] = ["All Frames", "Minimal", "Events", "Fun"];

/// Frame category. Unknown categories round-trip through [`FrameCategory::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FrameCategory {
    /// Plain borders.
    Minimal,
    /// Playful overlays.
    Fun,
    /// Event-branded overlays.
    Events,
    /// Any other lowercase category name.
    Other(String),
}

impl FrameCategory {
    /// Lowercase wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Minimal => "minimal",
            Self::Fun => "fun",
            Self::Events => "events",
            Self::Other(s) => s.as_str(),
        }
    }
}

impl From<String> for FrameCategory {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Self::Minimal,
            "fun" => Self::Fun,
            "events" => Self::Events,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<FrameCategory> for String {
    fn from(c: FrameCategory) -> Self {
        c.as_str().to_string()
    }
}

impl fmt::Display for FrameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of a frame overlay.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameDescriptor {
    /// Unique id within a catalog.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category used for filtering.
    pub category: FrameCategory,
    /// Location of the overlay image (PNG with alpha, or SVG).
    pub url: String,
}

impl FrameDescriptor {
    /// Resolve `url` into an [`ImageRef`]. Relative paths are joined onto `base_dir` when given.
    pub fn image_ref(&self, base_dir: Option<&Path>) -> StudioResult<ImageRef> {
        let r = ImageRef::parse(&self.url)?;
        Ok(match (r, base_dir) {
            (ImageRef::File(p), Some(base)) if p.is_relative() => ImageRef::File(base.join(p)),
            (r, _) => r,
        })
    }
}

/// Category filter applied to a catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every frame.
    #[default]
    All,
    /// Frames of one category.
    Only(FrameCategory),
}

impl CategoryFilter {
    /// Parse a display label (`"All Frames"`, `"Minimal"`, ...) or a bare category name.
    pub fn from_label(label: &str) -> Self {
        let norm = label.trim().to_ascii_lowercase();
        if norm.is_empty() || norm == "all" || norm == "all frames" {
            Self::All
        } else {
            Self::Only(FrameCategory::from(norm))
        }
    }

    /// Whether `frame` passes this filter.
    pub fn matches(&self, frame: &FrameDescriptor) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => &frame.category == c,
        }
    }
}

/// Ordered set of frame descriptors with unique ids.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct FrameCatalog {
    frames: Vec<FrameDescriptor>,
}

impl FrameCatalog {
    /// Build a catalog, rejecting empty or duplicate ids and empty urls.
    pub fn new(frames: Vec<FrameDescriptor>) -> StudioResult<Self> {
        let mut seen = HashSet::new();
        for f in &frames {
            if f.id.trim().is_empty() {
                return Err(StudioError::validation("frame id must be non-empty"));
            }
            if f.url.trim().is_empty() {
                return Err(StudioError::validation(format!(
                    "frame '{}' has an empty url",
                    f.id
                )));
            }
            if !seen.insert(f.id.as_str()) {
                return Err(StudioError::validation(format!(
                    "duplicate frame id '{}'",
                    f.id
                )));
            }
        }
        Ok(Self { frames })
    }

    /// Catalog shipped with the app; urls are relative to the asset directory.
    pub fn builtin() -> Self {
        let entry = |id: &str, name: &str, category: FrameCategory| FrameDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            category,
            url: format!("public/frames/{id}.png"),
        };
        Self {
            frames: vec![
                entry("default-1", "Classic Border", FrameCategory::Minimal),
                entry("default-2", "Elegant Frame", FrameCategory::Minimal),
                entry("default-3", "Party Vibes", FrameCategory::Fun),
                entry("default-4", "Event Special", FrameCategory::Events),
                entry("default-5", "Celebration", FrameCategory::Events),
            ],
        }
    }

    /// Parse a JSON array of descriptors.
    pub fn from_json_str(s: &str) -> StudioResult<Self> {
        let frames: Vec<FrameDescriptor> = serde_json::from_str(s)
            .map_err(|e| StudioError::validation(format!("catalog: {e}")))?;
        Self::new(frames)
    }

    /// Read and parse a JSON catalog file.
    pub fn from_path(path: &Path) -> StudioResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read frame catalog '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    /// Look up a frame by id.
    pub fn get(&self, id: &str) -> Option<&FrameDescriptor> {
        self.frames.iter().find(|f| f.id == id)
    }

    /// Frames passing `filter`, in catalog order.
    pub fn filter<'a>(
        &'a self,
        filter: &'a CategoryFilter,
    ) -> impl Iterator<Item = &'a FrameDescriptor> + 'a {
        self.frames.iter().filter(move |f| filter.matches(f))
    }

    /// All frames in catalog order.
    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the catalog has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl Default for FrameCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/frames.rs"]
mod tests;
