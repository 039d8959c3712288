//! Image inspection module

pub mod inspector;

pub use inspector::HeaderImageInspector;
