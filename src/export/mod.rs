//! Export adapters consuming a finished [`CompositedArtifact`](crate::CompositedArtifact).
//!
//! Each adapter owns an [`InFlight`](guard::InFlight) flag: a second invocation while one is
//! running returns [`ExportOutcome::Busy`](guard::ExportOutcome::Busy) instead of starting a
//! duplicate upload or share sheet. Export failures never touch the artifact itself.

/// Anonymous client identifier used to namespace uploads.
pub mod anon;
/// Local file save.
pub mod download;
/// In-flight guard and export outcome.
pub mod guard;
/// Native share surface adapter.
pub mod share;
/// Image-host and object-store uploads.
pub mod upload;
