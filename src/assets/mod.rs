/// Raster and SVG decoding into premultiplied bitmaps.
pub mod decode;
/// Byte fetching for image references (data URLs, files, HTTP).
pub mod fetch;
/// Image reference parsing.
pub mod source;
