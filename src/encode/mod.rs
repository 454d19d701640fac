//! Artifact encoding.
//!
//! The compositor hands a finished [`Surface`](crate::Surface) to [`jpeg::encode_jpeg`], which
//! produces the immutable [`CompositedArtifact`](jpeg::CompositedArtifact) shared by every
//! export adapter.

/// JPEG encoding and the composited artifact type.
pub mod jpeg;
