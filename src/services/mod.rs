pub mod baseline_store;
pub mod data_layout;
pub mod file_watcher;
pub mod monitor;
pub mod report_cache;

pub use baseline_store::PngBaselineStore;
pub use data_layout::DataLayout;
pub use file_watcher::{ScreenshotEvent, ScreenshotWatcher};
pub use monitor::MapMonitor;
pub use report_cache::{LatestCheck, ReportCache};
