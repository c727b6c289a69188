pub mod maps;

pub use maps::{__path_handle_check, __path_handle_list_maps};
pub use maps::{__path_handle_report, __path_handle_visualization};
pub use maps::{
    handle_check, handle_list_maps, handle_report, handle_visualization, MapListResponse,
    MapSummary,
};
