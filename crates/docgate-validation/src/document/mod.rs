//! Document inspection module

pub mod inspector;
mod scan;

pub use inspector::LopdfInspector;
