//! Connected-component labeling over boolean masks.
//!
//! Labeling is an iterative breadth-first flood fill with 4-connectivity
//! over a label array addressed by row-major index. Components are a pure
//! function of the set pixels: their number and membership do not depend
//! on scan order, and their output order is fixed by each component's
//! first pixel in row-major order.

mod components;

pub use components::{label_components, BoundingBox, Component};
