pub mod check;
pub mod config;
pub mod map_id;

pub use check::{CheckOutcome, CheckRecord};
pub use config::{
    build_comparer, AppConfig, BorderConfig, ConfigFileError, ConfigSource, DetectionOverrides,
    MapConfig, PaletteEntry, PreprocessConfig, PreprocessOverrides, DEFAULT_CONFIG_FILE,
};
pub use map_id::{InvalidMapId, MapId, MAX_MAP_ID_LEN};
