//! Photo framing: cover-fit compositing of a photo under a decorative frame overlay.
//!
//! The pipeline loads the source photo, then the frame ([`ResourceLoader`]), plans the output
//! canvas ([`plan`]), draws both into a premultiplied RGBA8 [`Surface`] and encodes a JPEG
//! [`CompositedArtifact`] ([`Compositor`]). [`PreviewSession`] drives repeated runs with
//! last-request-wins semantics; the `export` adapters save, share or upload the artifact.

#![forbid(unsafe_code)]

mod foundation;

pub mod assets;
pub mod catalog;
pub mod compose;
pub mod config;
pub mod encode;
pub mod export;
pub mod load;
pub mod logging;
pub mod session;

pub use assets::decode::{Bitmap, decode_image, decode_resource, rasterize_svg};
pub use assets::fetch::{DefaultFetcher, FetchMode, Fetcher, HttpFetcher};
pub use assets::source::{DataUrl, ImageRef};
pub use catalog::frames::{
    CATEGORY_LABELS, CategoryFilter, FrameCatalog, FrameCategory, FrameDescriptor,
};
pub use compose::compositor::Compositor;
pub use compose::geometry::{
    CompositePlan, FALLBACK_FRAME_ASPECT, FRAMED_WIDTH, MAX_DIMENSION, cover_crop, frame_aspect,
    framed_canvas, frameless_canvas, plan,
};
pub use compose::raster::{PremulRgba8, Surface};
pub use config::{ImageHostConfig, LoggingConfig, ObjectStoreConfig, StudioConfig};
pub use encode::jpeg::{ARTIFACT_MIME, CompositedArtifact, JPEG_QUALITY, encode_jpeg};
pub use export::anon::AnonId;
pub use export::download::{Downloader, download_file_name};
pub use export::guard::{ExportOutcome, InFlight};
pub use export::share::{NoShareTarget, ShareAdapter, ShareFile, ShareTarget};
pub use export::upload::{
    ImageHostUploader, LinkAdapter, ObjectStoreUploader, RemoteLink, UploadRecord,
};
pub use foundation::core::{CanvasSize, Point, Rect, Size};
pub use foundation::error::{ExportErrorKind, ResourceRole, StudioError, StudioResult};
pub use load::loader::{LoadedResources, ResourceLoader};
pub use logging::init_logging;
pub use session::preview::{PreviewSession, PreviewState, RequestToken};
