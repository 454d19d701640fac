/// Ordered source-then-frame resource loading.
pub mod loader;
