//! Compositing: geometry planning, raster drawing, and the compositor that ties them to the
//! JPEG encoder.

/// Frame-over-photo compositor.
pub mod compositor;
/// Canvas sizing and cover-fit crop arithmetic.
pub mod geometry;
/// Premultiplied RGBA8 surface and image blits.
pub mod raster;
