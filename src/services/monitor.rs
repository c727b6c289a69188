//! One monitoring step per map: decode, preprocess, compare against the
//! stored baseline, write artifacts, replace the baseline.
//!
//! Steps for the same map are serialized by a per-map async lock so that a
//! watcher event and an HTTP upload cannot interleave their baseline
//! read/write. The image work itself runs on the blocking pool.

use chrono::Utc;
use claim_diff::{ClaimComparer, ComparisonCache, DebugArtifacts, RgbImage};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::PipelineError;
use crate::models::{
    AppConfig, CheckOutcome, CheckRecord, DetectionOverrides, MapId, PreprocessConfig,
    PreprocessOverrides,
};
use crate::rendering::{decode_png, encode_mask_png, encode_rgb_png, optimize_png};
use crate::services::{DataLayout, LatestCheck, ReportCache};

/// Runs checks for configured and ad-hoc maps.
pub struct MapMonitor {
    config: Arc<AppConfig>,
    layout: DataLayout,
    baselines: Arc<dyn ComparisonCache>,
    reports: Arc<ReportCache>,
    detection_overrides: DetectionOverrides,
    preprocess_overrides: PreprocessOverrides,
    locks: Mutex<HashMap<MapId, Arc<tokio::sync::Mutex<()>>>>,
}

/// Everything the blocking part of a check needs, owned.
struct CheckJob {
    map_id: MapId,
    png: Vec<u8>,
    source: Option<PathBuf>,
    comparer: ClaimComparer,
    preprocess: PreprocessConfig,
    layout: DataLayout,
    baselines: Arc<dyn ComparisonCache>,
}

impl MapMonitor {
    pub fn new(
        config: Arc<AppConfig>,
        baselines: Arc<dyn ComparisonCache>,
        reports: Arc<ReportCache>,
    ) -> Self {
        let layout = DataLayout::new(config.data_dir());
        Self {
            config,
            layout,
            baselines,
            reports,
            detection_overrides: DetectionOverrides::default(),
            preprocess_overrides: PreprocessOverrides::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Settings applied on top of every map's configuration (CLI flags).
    pub fn with_overrides(
        mut self,
        detection: DetectionOverrides,
        preprocess: PreprocessOverrides,
    ) -> Self {
        self.detection_overrides = detection;
        self.preprocess_overrides = preprocess;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn reports(&self) -> &Arc<ReportCache> {
        &self.reports
    }

    fn map_lock(&self, map_id: &MapId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        // Entries only referenced by the table belong to no running check.
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        locks.entry(map_id.clone()).or_default().clone()
    }

    /// Check one PNG-encoded screenshot of `map_id`.
    ///
    /// `source` names the file the bytes came from, if any; it is only
    /// recorded in the result.
    pub async fn check(
        &self,
        map_id: &MapId,
        png: Vec<u8>,
        source: Option<PathBuf>,
    ) -> Result<CheckRecord, PipelineError> {
        let lock = self.map_lock(map_id);
        let _guard = lock.lock().await;

        let (comparer, preprocess) = self.config.comparer_for(
            map_id,
            &self.detection_overrides,
            &self.preprocess_overrides,
        )?;

        let job = CheckJob {
            map_id: map_id.clone(),
            png,
            source,
            comparer,
            preprocess,
            layout: self.layout.clone(),
            baselines: self.baselines.clone(),
        };

        let (record, visualization_png) = tokio::task::spawn_blocking(move || run_check(job))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;

        self.reports
            .store(
                map_id,
                LatestCheck {
                    record: record.clone(),
                    visualization_png: visualization_png.map(Arc::new),
                },
            )
            .await;

        Ok(record)
    }

    /// Check a screenshot file.
    pub async fn check_file(&self, map_id: &MapId, path: &Path) -> Result<CheckRecord, PipelineError> {
        let png = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::io(path, e))?;
        self.check(map_id, png, Some(path.to_path_buf())).await
    }

    /// Check the newest screenshot in `screenshots/<map>/`.
    pub async fn check_latest(&self, map_id: &MapId) -> Result<CheckRecord, PipelineError> {
        let dir = self.layout.screenshots_dir(map_id);
        let path = self
            .layout
            .latest_screenshot(map_id)
            .map_err(|e| PipelineError::io(&dir, e))?
            .ok_or_else(|| PipelineError::NoScreenshot(map_id.to_string()))?;
        self.check_file(map_id, &path).await
    }
}

fn run_check(job: CheckJob) -> Result<(CheckRecord, Option<Vec<u8>>), PipelineError> {
    let CheckJob {
        map_id,
        png,
        source,
        comparer,
        preprocess,
        layout,
        baselines,
    } = job;

    let image_sha256 = hex::encode(Sha256::digest(&png));
    let decoded = decode_png(&png)?;

    let (current, crop_fallback) = if preprocess.crop && preprocess.crop_fallback {
        let (image, crop_error) = comparer.preprocess_or_uncropped(&decoded);
        if let Some(e) = &crop_error {
            tracing::warn!(map_id = %map_id, error = %e, "Border not found, comparing uncropped frame");
        }
        (image, crop_error.is_some())
    } else {
        (comparer.preprocess(&decoded)?, false)
    };

    let mut record = CheckRecord {
        timestamp: Utc::now(),
        map_id: map_id.clone(),
        outcome: CheckOutcome::Compared,
        changes_detected: false,
        num_changes: 0,
        dimensions: current.dimensions(),
        image_sha256,
        current_image: source.map(|p| p.display().to_string()),
        crop_fallback,
        report: None,
        visualization: None,
        result_file: None,
    };

    let previous = match baselines.get_previous(map_id.as_str())? {
        Some(previous) => previous,
        None => {
            tracing::info!(map_id = %map_id, "No baseline yet, storing first frame");
            baselines.store(map_id.as_str(), &current)?;
            record.outcome = CheckOutcome::FirstRun;
            return Ok((record, None));
        }
    };

    if !previous.same_dimensions(&current) {
        tracing::warn!(
            map_id = %map_id,
            previous = ?previous.dimensions(),
            current = ?current.dimensions(),
            "Frame size changed, replacing baseline"
        );
        baselines.store(map_id.as_str(), &current)?;
        record.outcome = CheckOutcome::Rebaselined;
        return Ok((record, None));
    }

    let comparison = comparer.compare(&current, &previous)?;

    if let Some(debug) = &comparison.debug {
        write_debug_masks(&layout.debug_dir(&map_id), debug)?;
    }

    let visualization_png = optimize_png(encode_rgb_png(&comparison.visualization)?);

    record.changes_detected = comparison.has_findings();
    record.num_changes = comparison.findings.len();
    record.report = Some(comparison.report);

    if record.changes_detected {
        let (png_path, json_path) = layout
            .next_change_paths(&map_id)
            .map_err(|e| PipelineError::io(layout.disappearances_dir(&map_id), e))?;
        if let Some(dir) = png_path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;
        }
        std::fs::write(&png_path, &visualization_png)
            .map_err(|e| PipelineError::io(&png_path, e))?;

        record.visualization = Some(png_path.display().to_string());
        record.result_file = Some(json_path.display().to_string());

        let json = serde_json::to_vec_pretty(&record)?;
        std::fs::write(&json_path, json).map_err(|e| PipelineError::io(&json_path, e))?;

        tracing::info!(
            map_id = %map_id,
            changes = record.num_changes,
            result = %json_path.display(),
            "Claim changes detected"
        );
    } else {
        tracing::info!(map_id = %map_id, "No claim changes");
    }

    baselines.store(map_id.as_str(), &current)?;
    Ok((record, Some(visualization_png)))
}

/// File-name-safe form of a palette color name.
fn mask_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

fn write_debug_masks(dir: &Path, debug: &DebugArtifacts) -> Result<(), PipelineError> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))?;

    let write = |name: String, bytes: Vec<u8>| {
        let path = dir.join(name);
        std::fs::write(&path, bytes).map_err(|e| PipelineError::io(&path, e))
    };

    for masks in &debug.color_masks {
        tracing::debug!(
            color = %masks.color,
            previous = masks.previous.count(),
            current = masks.current.count(),
            "Color mask"
        );
        let stem = mask_stem(&masks.color);
        write(format!("previous_{stem}_mask.png"), encode_mask_png(&masks.previous)?)?;
        write(format!("current_{stem}_mask.png"), encode_mask_png(&masks.current)?)?;
    }
    if let Some(difference) = &debug.difference {
        write("difference_mask.png".to_string(), encode_mask_png(difference)?)?;
    }

    tracing::debug!(dir = %dir.display(), "Wrote debug masks");
    Ok(())
}
