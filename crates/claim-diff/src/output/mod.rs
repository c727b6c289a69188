//! Rendering findings for people and machines.
//!
//! [`Visualizer`] paints every finding's region onto a copy of the current
//! frame, pixel for pixel, and builds the serializable [`Report`].

mod report;
mod visualize;

pub use report::{Center, ColorBreakdown, FindingReport, Report, Summary};
pub use visualize::{Visualization, Visualizer, DEFAULT_HIGHLIGHT};
