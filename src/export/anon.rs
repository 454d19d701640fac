use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;

use crate::foundation::core::unix_millis;
use crate::foundation::error::StudioResult;
use crate::foundation::math::Fnv1a64;

const PREFIX: &str = "anon-";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stable anonymous client identifier, used to group uploads without an account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnonId(String);

impl AnonId {
    /// Fresh id of the form `anon-<16 hex>`.
    pub fn generate() -> Self {
        let mut h = Fnv1a64::new_default();
        let millis = unix_millis();
        h.write_u64(millis as u64);
        h.write_u64((millis >> 64) as u64);
        h.write_u64(u64::from(std::process::id()));
        h.write_u64(COUNTER.fetch_add(1, Ordering::Relaxed));
        Self(format!("{PREFIX}{:016x}", h.finish()))
    }

    /// Parse a persisted id. Returns `None` unless it is `anon-` followed by 16 hex digits.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix(PREFIX)?;
        (hex.len() == 16 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .then(|| Self(s.trim().to_ascii_lowercase()))
    }

    /// Read the id stored at `path`, or generate and persist a new one.
    ///
    /// Missing files and invalid contents are both replaced.
    pub fn load_or_create(path: &Path) -> StudioResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(s) => {
                if let Some(id) = Self::parse(&s) {
                    return Ok(id);
                }
                tracing::warn!(path = %path.display(), "replacing invalid anonymous id");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("read anonymous id '{}'", path.display()))
                    .into());
            }
        }

        let id = Self::generate();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create '{}'", parent.display()))?;
        }
        std::fs::write(path, id.as_str())
            .with_context(|| format!("write anonymous id '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), "created anonymous id");
        Ok(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AnonId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s).ok_or_else(|| format!("invalid anonymous id '{s}'"))
    }
}

impl From<AnonId> for String {
    fn from(id: AnonId) -> Self {
        id.0
    }
}

impl fmt::Display for AnonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/anon.rs"]
mod tests;
