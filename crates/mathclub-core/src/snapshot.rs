//! Lesson snapshot persistence.
//!
//! Saving writes each attached image to `<image_dir>/stage-<index>.<ext>`
//! and then a single pretty-printed JSON document that replaces any
//! previous snapshot. Stage images the new snapshot no longer references
//! are removed afterwards.
//!
//! ```json
//! {
//!   "stages": [ ... ],
//!   "uploaded_images": { "0": "lesson_images/stage-0.png" },
//!   "saved_at": "2024-01-15T10:30:00Z"
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{LessonError, Result};
use crate::image::{ImageFormat, StageImage};
use crate::stage::{LessonPlan, Stage};

/// The persisted form of a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Stages as they stood when saved.
    pub stages: Vec<Stage>,

    /// Image file path by stage index.
    #[serde(default)]
    pub uploaded_images: BTreeMap<usize, String>,

    /// When the snapshot was written; absent in older documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Rebuilds the lesson plan from the saved stages.
    #[must_use]
    pub fn plan(&self) -> LessonPlan {
        LessonPlan::new(self.stages.clone())
    }
}

/// Where snapshots and their images live on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStore {
    snapshot_path: PathBuf,
    image_dir: PathBuf,
}

impl SnapshotStore {
    /// Creates a store writing to `snapshot_path` with images under `image_dir`.
    #[must_use]
    pub fn new(snapshot_path: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
            image_dir: image_dir.into(),
        }
    }

    /// Creates a store from the configured locations.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.snapshot_path, &config.image_dir)
    }

    /// Path of the snapshot JSON file.
    #[must_use]
    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Directory receiving image files.
    #[must_use]
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Path an image for `index` is written to.
    #[must_use]
    pub fn image_path(&self, index: usize, format: ImageFormat) -> PathBuf {
        self.image_dir
            .join(format!("stage-{index}.{}", format.extension()))
    }

    /// Writes the lesson and its images, replacing any previous snapshot.
    ///
    /// The JSON goes to a sibling temp file that is renamed over the
    /// snapshot, so a failed write leaves the last good snapshot in place.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::SnapshotWriteError` if the image directory,
    /// an image or the snapshot file cannot be written.
    pub fn write(
        &self,
        plan: &LessonPlan,
        images: &BTreeMap<usize, StageImage>,
    ) -> Result<Snapshot> {
        let mut uploaded_images = BTreeMap::new();

        if !images.is_empty() {
            std::fs::create_dir_all(&self.image_dir)
                .map_err(|e| LessonError::snapshot_write(&self.image_dir, e.to_string()))?;
        }

        for (&index, image) in images {
            let path = self.image_path(index, image.format);
            std::fs::write(&path, &image.data)
                .map_err(|e| LessonError::snapshot_write(&path, e.to_string()))?;
            debug!(stage = index, path = %path.display(), "Image written");
            uploaded_images.insert(index, path.display().to_string());
        }

        let snapshot = Snapshot {
            stages: plan.stages.clone(),
            uploaded_images,
            saved_at: Some(Utc::now()),
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        self.replace_snapshot_file(json.as_bytes())?;

        let kept: BTreeSet<PathBuf> = images
            .iter()
            .map(|(&index, image)| self.image_path(index, image.format))
            .collect();
        self.prune_images(&kept);

        Ok(snapshot)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.snapshot_path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn replace_snapshot_file(&self, contents: &[u8]) -> Result<()> {
        let temp = self.temp_path();
        let written = File::create(&temp)
            .and_then(|mut file| {
                file.write_all(contents)?;
                file.sync_all()
            })
            .and_then(|()| std::fs::rename(&temp, &self.snapshot_path));

        written.map_err(|e| {
            std::fs::remove_file(&temp).ok();
            LessonError::snapshot_write(&self.snapshot_path, e.to_string())
        })
    }

    /// Removes `stage-<n>.png|jpg` files in the image directory that are not
    /// in `kept`. Failures are logged and skipped.
    fn prune_images(&self, kept: &BTreeSet<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(&self.image_dir) else {
            return;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if kept.contains(&path) || !is_stage_image(&path) {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Stale image removed"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove stale image"),
            }
        }
    }

    /// Reads the snapshot back.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::Io` if the file cannot be read and
    /// `LessonError::SnapshotCorrupted` if it is not a valid snapshot.
    pub fn load(&self) -> Result<Snapshot> {
        let content = std::fs::read_to_string(&self.snapshot_path)?;
        serde_json::from_str(&content)
            .map_err(|e| LessonError::snapshot_corrupted(&self.snapshot_path, e.to_string()))
    }

    /// Resolves a saved image reference back to its bytes.
    ///
    /// Returns `Ok(None)` if the stage has no image.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::SnapshotCorrupted` if the referenced file is
    /// missing or not an accepted image type.
    pub fn read_image(&self, snapshot: &Snapshot, index: usize) -> Result<Option<StageImage>> {
        let Some(reference) = snapshot.uploaded_images.get(&index) else {
            return Ok(None);
        };

        let path = Path::new(reference);
        let format = ImageFormat::from_path(path).ok_or_else(|| {
            LessonError::snapshot_corrupted(
                &self.snapshot_path,
                format!("stage {index} image '{reference}' is not a png or jpg"),
            )
        })?;
        let data = std::fs::read(path).map_err(|e| {
            LessonError::snapshot_corrupted(
                &self.snapshot_path,
                format!("stage {index} image '{reference}': {e}"),
            )
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| reference.clone(), |n| n.to_string_lossy().to_string());

        Ok(Some(StageImage {
            file_name,
            format,
            data,
        }))
    }
}

/// Returns `true` for file names the store writes: `stage-<n>.png|jpg`.
fn is_stage_image(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let is_stage_stem = stem
        .strip_prefix("stage-")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    let is_image = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("png" | "jpg")
    );
    is_stage_stem && is_image
}
