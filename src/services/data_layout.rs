//! On-disk layout of the data directory.
//!
//! ```text
//! <data_dir>/
//!   screenshots/<map>/<map>_NNN.png          captures dropped by the capture tool
//!   baselines/<map>/previous.png             last frame per map
//!   claim_disappearances/<map>/changes_<map>_NNN.{png,json}
//!   debug/<map>/{previous,current}_<color>_mask.png
//! ```

use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::MapId;

pub const SCREENSHOTS_DIR: &str = "screenshots";
pub const BASELINES_DIR: &str = "baselines";
pub const DISAPPEARANCES_DIR: &str = "claim_disappearances";
pub const DEBUG_DIR: &str = "debug";

/// Paths under the data directory.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn screenshots_root(&self) -> PathBuf {
        self.root.join(SCREENSHOTS_DIR)
    }

    pub fn screenshots_dir(&self, map_id: &MapId) -> PathBuf {
        self.screenshots_root().join(map_id.as_str())
    }

    pub fn baselines_root(&self) -> PathBuf {
        self.root.join(BASELINES_DIR)
    }

    pub fn disappearances_root(&self) -> PathBuf {
        self.root.join(DISAPPEARANCES_DIR)
    }

    pub fn disappearances_dir(&self, map_id: &MapId) -> PathBuf {
        self.disappearances_root().join(map_id.as_str())
    }

    pub fn debug_dir(&self, map_id: &MapId) -> PathBuf {
        self.root.join(DEBUG_DIR).join(map_id.as_str())
    }

    /// Paths for the next change artifact pair of `map_id`.
    ///
    /// Numbering continues after the highest existing `changes_<map>_NNN`
    /// file, starting at 001.
    pub fn next_change_paths(&self, map_id: &MapId) -> io::Result<(PathBuf, PathBuf)> {
        let dir = self.disappearances_dir(map_id);
        let prefix = format!("changes_{map_id}");
        let next = highest_sequence(&dir, &prefix, &["png", "json"])?.map_or(1, |n| n + 1);
        let stem = format!("{prefix}_{next:03}");
        Ok((
            dir.join(format!("{stem}.png")),
            dir.join(format!("{stem}.json")),
        ))
    }

    /// Newest screenshot of `map_id`: the highest `<map>_NNN.png`, or the
    /// most recently modified PNG when none is numbered.
    pub fn latest_screenshot(&self, map_id: &MapId) -> io::Result<Option<PathBuf>> {
        let dir = self.screenshots_dir(map_id);
        let prefix = map_id.as_str();
        if let Some(n) = highest_sequence(&dir, prefix, &["png"])? {
            let numbered = sequence_files(&dir, prefix, &["png"])?
                .into_iter()
                .find(|(seq, _)| *seq == n)
                .map(|(_, path)| path);
            return Ok(numbered);
        }

        let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
        for entry in read_dir_if_exists(&dir)? {
            let path = entry.path();
            if !has_extension(&path, &["png"]) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }
        Ok(newest.map(|(_, path)| path))
    }
}

fn read_dir_if_exists(dir: &Path) -> io::Result<Vec<std::fs::DirEntry>> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.collect(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext))
        .unwrap_or(false)
}

/// Files named `<prefix>_<digits>.<ext>` in `dir`, with their number.
fn sequence_files(dir: &Path, prefix: &str, extensions: &[&str]) -> io::Result<Vec<(u32, PathBuf)>> {
    let pattern = Regex::new(&format!(
        r"^{}_(\d+)\.({})$",
        regex::escape(prefix),
        extensions.join("|")
    ))
    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let mut files = Vec::new();
    for entry in read_dir_if_exists(dir)? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(seq) = pattern
            .captures(name)
            .and_then(|caps| caps[1].parse::<u32>().ok())
        {
            files.push((seq, entry.path()));
        }
    }
    Ok(files)
}

fn highest_sequence(dir: &Path, prefix: &str, extensions: &[&str]) -> io::Result<Option<u32>> {
    Ok(sequence_files(dir, prefix, extensions)?
        .into_iter()
        .map(|(seq, _)| seq)
        .max())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn id(s: &str) -> MapId {
        MapId::parse(s).unwrap()
    }

    #[test]
    fn test_next_change_paths_start_at_one() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let (png, json) = layout.next_change_paths(&id("abex1")).unwrap();
        assert_eq!(
            png,
            dir.path()
                .join("claim_disappearances/abex1/changes_abex1_001.png")
        );
        assert_eq!(json.extension().unwrap(), "json");
    }

    #[test]
    fn test_next_change_paths_continue_numbering() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let changes = layout.disappearances_dir(&id("abex1"));
        fs::create_dir_all(&changes).unwrap();
        fs::write(changes.join("changes_abex1_003.png"), b"").unwrap();
        fs::write(changes.join("changes_abex1_007.json"), b"").unwrap();
        fs::write(changes.join("changes_abex10_050.png"), b"").unwrap();
        fs::write(changes.join("notes.txt"), b"").unwrap();

        let (png, _) = layout.next_change_paths(&id("abex1")).unwrap();
        assert_eq!(png.file_name().unwrap(), "changes_abex1_008.png");
    }

    #[test]
    fn test_latest_screenshot_prefers_highest_number() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let shots = layout.screenshots_dir(&id("abex2"));
        fs::create_dir_all(&shots).unwrap();
        for name in ["abex2_009.png", "abex2_010.png", "abex2_002.png", "other.png"] {
            fs::write(shots.join(name), b"").unwrap();
        }
        let latest = layout.latest_screenshot(&id("abex2")).unwrap().unwrap();
        assert_eq!(latest.file_name().unwrap(), "abex2_010.png");
    }

    #[test]
    fn test_latest_screenshot_falls_back_to_any_png() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        let shots = layout.screenshots_dir(&id("abex3"));
        fs::create_dir_all(&shots).unwrap();
        fs::write(shots.join("capture.png"), b"").unwrap();
        fs::write(shots.join("capture.txt"), b"").unwrap();
        let latest = layout.latest_screenshot(&id("abex3")).unwrap().unwrap();
        assert_eq!(latest.file_name().unwrap(), "capture.png");
    }

    #[test]
    fn test_latest_screenshot_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        assert!(layout.latest_screenshot(&id("nothing")).unwrap().is_none());
    }
}
