//! Per-pixel palette classification.

mod class_map;

pub use class_map::{classify_all, ClassMap};
