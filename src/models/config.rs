use claim_diff::{
    ClaimComparer, ColorSpec, DetectionConfig, Palette, PaletteError, RegionCropper, Rgb,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::map_id::MapId;

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "claimwatch.yaml";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid detection settings: {0}")]
    Detection(#[from] claim_diff::ConfigError),

    #[error("invalid palette: {0}")]
    Palette(#[from] PaletteError),

    #[error("map_order lists unknown map '{0}'")]
    UnknownMapInOrder(String),
}

/// Application configuration loaded from claimwatch.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root for screenshots/, baselines/, claim_disappearances/ and debug/
    pub data_dir: Option<PathBuf>,

    /// Global detection settings
    pub detection: DetectionConfig,

    /// Claim colors; the reference palette when absent
    pub palette: Option<Vec<PaletteEntry>>,

    pub preprocess: PreprocessConfig,

    /// Monitored maps by id
    pub maps: BTreeMap<MapId, MapConfig>,

    /// Processing order; maps not listed follow in id order
    pub map_order: Vec<MapId>,
}

/// One configured claim color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub color: Rgb,
    /// Falls back to `detection.color_tolerance`
    #[serde(default)]
    pub tolerance: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Crop to the marker border before comparing
    pub crop: bool,
    /// On a missing border, compare the uncropped image instead of failing
    pub crop_fallback: bool,
    pub border: BorderConfig,
    /// Extra pixels dropped inside the border
    pub crop_margin: usize,
    /// Posterize levels per channel, 0 disables
    pub posterize: u16,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            crop: false,
            crop_fallback: true,
            border: BorderConfig::default(),
            crop_margin: 0,
            posterize: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderConfig {
    pub color: Rgb,
    pub tolerance: u8,
}

impl Default for BorderConfig {
    fn default() -> Self {
        Self {
            color: Rgb::new(255, 0, 0),
            tolerance: 75,
        }
    }
}

/// Configuration for one monitored map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Page the capture tool renders (informational)
    pub url: Option<String>,
    pub x: Option<i64>,
    pub z: Option<i64>,
    pub zoom_out: Option<u32>,
    pub detection: DetectionOverrides,
    pub preprocess: PreprocessOverrides,
}

/// Detection settings that replace the global ones when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOverrides {
    pub min_area: Option<usize>,
    pub pixel_diff_threshold: Option<u8>,
    pub color_tolerance: Option<u8>,
    pub percent_threshold: Option<f64>,
    pub detect_any_change: Option<bool>,
    pub focus_on_claim_colors: Option<bool>,
    pub use_pixel_count_mode: Option<bool>,
    pub debug: Option<bool>,
}

impl DetectionOverrides {
    pub fn apply(&self, base: &DetectionConfig) -> DetectionConfig {
        DetectionConfig {
            min_area: self.min_area.unwrap_or(base.min_area),
            pixel_diff_threshold: self.pixel_diff_threshold.unwrap_or(base.pixel_diff_threshold),
            color_tolerance: self.color_tolerance.unwrap_or(base.color_tolerance),
            percent_threshold: self.percent_threshold.unwrap_or(base.percent_threshold),
            detect_any_change: self.detect_any_change.unwrap_or(base.detect_any_change),
            focus_on_claim_colors: self
                .focus_on_claim_colors
                .unwrap_or(base.focus_on_claim_colors),
            use_pixel_count_mode: self.use_pixel_count_mode.unwrap_or(base.use_pixel_count_mode),
            debug: self.debug.unwrap_or(base.debug),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOverrides {
    pub crop: Option<bool>,
    pub crop_margin: Option<usize>,
    pub posterize: Option<u16>,
}

impl PreprocessOverrides {
    pub fn apply(&self, base: &PreprocessConfig) -> PreprocessConfig {
        PreprocessConfig {
            crop: self.crop.unwrap_or(base.crop),
            crop_margin: self.crop_margin.unwrap_or(base.crop_margin),
            posterize: self.posterize.unwrap_or(base.posterize),
            ..base.clone()
        }
    }
}

/// Where the configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// The file did not exist; built-in defaults are in use.
    Defaults(PathBuf),
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults(path) => {
                write!(f, "defaults ({} not found)", path.display())
            }
        }
    }
}

impl AppConfig {
    /// Load and validate configuration from `path`.
    ///
    /// A missing file yields the defaults. An unreadable or invalid file is
    /// an error.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigFileError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
                return Ok((Self::default(), ConfigSource::Defaults(path.to_path_buf())));
            }
            Err(source) => {
                return Err(ConfigFileError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = Self::from_yaml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            maps = config.maps.len(),
            "Loaded configuration"
        );
        Ok((config, ConfigSource::File(path.to_path_buf())))
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigFileError> {
        // An empty document parses as unit, not as an empty mapping.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check everything that would otherwise fail mid-comparison.
    pub fn validate(&self) -> Result<(), ConfigFileError> {
        self.detection.validate()?;
        self.palette(&self.detection)?;
        validate_preprocess(&self.preprocess)?;

        for map in self.maps.values() {
            let detection = map.detection.apply(&self.detection);
            detection.validate()?;
            self.palette(&detection)?;
            validate_preprocess(&map.preprocess.apply(&self.preprocess))?;
        }

        for id in &self.map_order {
            if !self.maps.contains_key(id) {
                return Err(ConfigFileError::UnknownMapInOrder(id.to_string()));
            }
        }
        Ok(())
    }

    /// Data directory, `.` when not configured.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Palette for the given detection settings.
    pub fn palette(&self, detection: &DetectionConfig) -> Result<Palette, PaletteError> {
        match &self.palette {
            Some(entries) => Palette::new(
                entries
                    .iter()
                    .map(|e| {
                        ColorSpec::new(
                            e.name.clone(),
                            e.color,
                            e.tolerance.unwrap_or(detection.color_tolerance),
                        )
                    })
                    .collect(),
            ),
            None => Ok(Palette::reference_with_tolerance(detection.color_tolerance)),
        }
    }

    /// Effective detection settings for a map.
    pub fn detection_for(&self, map_id: &MapId) -> DetectionConfig {
        match self.maps.get(map_id) {
            Some(map) => map.detection.apply(&self.detection),
            None => self.detection.clone(),
        }
    }

    /// Effective preprocess settings for a map.
    pub fn preprocess_for(&self, map_id: &MapId) -> PreprocessConfig {
        match self.maps.get(map_id) {
            Some(map) => map.preprocess.apply(&self.preprocess),
            None => self.preprocess.clone(),
        }
    }

    /// Comparer for a map, with `extra` applied on top of the map settings.
    pub fn comparer_for(
        &self,
        map_id: &MapId,
        extra_detection: &DetectionOverrides,
        extra_preprocess: &PreprocessOverrides,
    ) -> Result<(ClaimComparer, PreprocessConfig), ConfigFileError> {
        let detection = extra_detection.apply(&self.detection_for(map_id));
        detection.validate()?;
        let preprocess = extra_preprocess.apply(&self.preprocess_for(map_id));
        let comparer = build_comparer(self.palette(&detection)?, detection, &preprocess)?;
        Ok((comparer, preprocess))
    }

    /// Configured map ids in processing order.
    pub fn ordered_map_ids(&self) -> Vec<MapId> {
        let mut ids = self.map_order.clone();
        for id in self.maps.keys() {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}

/// Assemble a comparer from resolved settings.
pub fn build_comparer(
    palette: Palette,
    detection: DetectionConfig,
    preprocess: &PreprocessConfig,
) -> Result<ClaimComparer, ConfigFileError> {
    let mut comparer = ClaimComparer::new(palette).config(detection);
    if preprocess.crop {
        let border = ColorSpec::new("border", preprocess.border.color, preprocess.border.tolerance);
        comparer = comparer.crop(RegionCropper::new(border).margin(preprocess.crop_margin));
    }
    if preprocess.posterize > 0 {
        comparer = comparer.posterize(preprocess.posterize)?;
    }
    Ok(comparer)
}

fn validate_preprocess(preprocess: &PreprocessConfig) -> Result<(), claim_diff::ConfigError> {
    if preprocess.posterize > 0 {
        claim_diff::Posterizer::new(preprocess.posterize)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> MapId {
        MapId::parse(s).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.data_dir(), PathBuf::from("."));
        assert_eq!(config.detection, DetectionConfig::default());
        assert!(config.maps.is_empty());
        assert!(config.preprocess.crop_fallback);
        assert_eq!(config.preprocess.border.tolerance, 75);

        let palette = config.palette(&config.detection).unwrap();
        assert_eq!(palette.len(), 12);
        assert!(palette.iter().all(|c| c.tolerance == 30));
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = AppConfig::from_yaml_str("  \n").unwrap();
        assert!(config.maps.is_empty());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r##"
data_dir: /var/lib/claimwatch
detection:
  min_area: 10
  use_pixel_count_mode: true
palette:
  - name: red
    color: "#A30907"
  - name: teal
    color: "06A5A3"
    tolerance: 12
preprocess:
  crop: true
  posterize: 16
maps:
  abex1:
    url: "https://map.example/?worldname=abex1"
    x: -120
    z: 340
    zoom_out: 3
  abex2:
    detection:
      percent_threshold: 5.0
    preprocess:
      crop: false
map_order: [abex2]
"##;
        let config = AppConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/claimwatch"));
        assert_eq!(config.detection.min_area, 10);
        assert_eq!(config.detection.pixel_diff_threshold, 50);

        let palette = config.palette(&config.detection).unwrap();
        assert_eq!(palette.get(0).unwrap().color, Rgb::new(163, 9, 7));
        assert_eq!(palette.get(0).unwrap().tolerance, 30);
        assert_eq!(palette.get(1).unwrap().tolerance, 12);

        assert_eq!(config.maps[&id("abex1")].x, Some(-120));
        assert_eq!(config.detection_for(&id("abex2")).percent_threshold, 5.0);
        assert_eq!(config.detection_for(&id("abex2")).min_area, 10);
        assert_eq!(config.detection_for(&id("abex1")).percent_threshold, 1.0);
        assert!(!config.preprocess_for(&id("abex2")).crop);
        assert_eq!(config.preprocess_for(&id("abex2")).posterize, 16);
        assert!(config.preprocess_for(&id("unlisted")).crop);

        assert_eq!(config.ordered_map_ids(), vec![id("abex2"), id("abex1")]);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(matches!(
            AppConfig::from_yaml_str("detection:\n  percent_threshold: 250\n"),
            Err(ConfigFileError::Detection(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("preprocess:\n  posterize: 1\n"),
            Err(ConfigFileError::Detection(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("palette: []\n"),
            Err(ConfigFileError::Palette(PaletteError::EmptyPalette))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("maps:\n  a: {}\nmap_order: [b]\n"),
            Err(ConfigFileError::UnknownMapInOrder(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("maps:\n  'bad/id': {}\n"),
            Err(ConfigFileError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("detection:\n  color_tolerance: -3\n"),
            Err(ConfigFileError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml_str("palette:\n  - name: red\n    color: nothex\n"),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let (config, source) = AppConfig::load(&path).unwrap();
        assert!(config.maps.is_empty());
        assert_eq!(source, ConfigSource::Defaults(path));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claimwatch.yaml");
        std::fs::write(&path, "maps:\n  abex1: {}\n").unwrap();
        let (config, source) = AppConfig::load(&path).unwrap();
        assert_eq!(config.ordered_map_ids(), vec![id("abex1")]);
        assert_eq!(source, ConfigSource::File(path));
    }

    #[test]
    fn test_comparer_for_applies_extra_overrides() {
        let config = AppConfig::from_yaml_str("preprocess:\n  posterize: 8\n").unwrap();
        let extra = DetectionOverrides {
            min_area: Some(1),
            use_pixel_count_mode: Some(true),
            ..Default::default()
        };
        let (comparer, preprocess) = config
            .comparer_for(&id("abex1"), &extra, &PreprocessOverrides::default())
            .unwrap();
        assert_eq!(comparer.detection_config().min_area, 1);
        assert!(comparer.detection_config().use_pixel_count_mode);
        assert_eq!(comparer.posterizer().map(|p| p.levels()), Some(8));
        assert!(comparer.cropper().is_none());
        assert_eq!(preprocess.posterize, 8);
    }
}
