/// Frame descriptors, categories and the built-in catalog.
pub mod frames;
