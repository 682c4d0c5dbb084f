//! Per-source calibration persistence.
//!
//! A calibration lives next to its input as `<source>.json`:
//!
//! ```json
//! { "points": [[x0, y0], ..., [x9, y9]], "settings": { "zone": "all" } }
//! ```
//!
//! Older files hold only the bare point array. Both shapes load; saving
//! always writes the keyed shape.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use crate::selection::{CourtSelection, ImagePoint, SelectionError};

/// Free-form per-source settings (display toggles and anything a caller adds).
pub type Settings = serde_json::Map<String, serde_json::Value>;

const CALIBRATION_SUFFIX: &str = ".json";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("refusing to save an incomplete calibration: {0}")]
    Incomplete(#[from] SelectionError),
}

/// A complete court selection plus settings, as persisted for one source.
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationRecord {
    pub selection: CourtSelection,
    pub settings: Settings,
}

impl CalibrationRecord {
    pub fn new(selection: CourtSelection, settings: Settings) -> Self {
        Self {
            selection,
            settings,
        }
    }

    /// The 10 points in phase order. Fails if a phase is missing.
    pub fn points(&self) -> Result<Vec<ImagePoint>, SelectionError> {
        self.selection.try_flatten()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredShape {
    Legacy(Vec<[f32; 2]>),
    Keyed {
        points: Vec<[f32; 2]>,
        #[serde(default)]
        settings: Option<Settings>,
    },
}

#[derive(Serialize)]
struct StoredRecord<'a> {
    points: Vec<[f32; 2]>,
    settings: &'a Settings,
}

/// `<source>.json`, appended to the full source path (extension kept).
pub fn calibration_path(source: impl AsRef<Path>) -> PathBuf {
    let mut s: OsString = source.as_ref().as_os_str().to_owned();
    s.push(CALIBRATION_SUFFIX);
    PathBuf::from(s)
}

/// Load the calibration for `source`.
///
/// Missing files, unreadable files, unknown shapes and incomplete point lists
/// all come back as `None`; only the latter three are logged.
pub fn load_calibration(source: impl AsRef<Path>) -> Option<CalibrationRecord> {
    let path = calibration_path(source);
    if !path.exists() {
        log::debug!("no calibration at {}", path.display());
        return None;
    }

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("cannot read calibration {}: {e}", path.display());
            return None;
        }
    };

    let record = parse_calibration(&raw);
    match &record {
        Some(_) => log::info!("loaded calibration from {}", path.display()),
        None => log::warn!("ignoring malformed calibration {}", path.display()),
    }
    record
}

/// Decode either on-disk shape. `None` for anything else.
pub fn parse_calibration(raw: &str) -> Option<CalibrationRecord> {
    let (points, settings) = match serde_json::from_str::<StoredShape>(raw).ok()? {
        StoredShape::Legacy(points) => (points, Settings::new()),
        StoredShape::Keyed { points, settings } => (points, settings.unwrap_or_default()),
    };

    let points: Vec<ImagePoint> = points.iter().map(|&[x, y]| Point2::new(x, y)).collect();
    match CourtSelection::from_flat(&points) {
        Ok(selection) => Some(CalibrationRecord::new(selection, settings)),
        Err(e) => {
            log::warn!("calibration point list rejected: {e}");
            None
        }
    }
}

/// Write `record` for `source`, replacing any existing file. Returns the path written.
///
/// An incomplete selection is rejected with [`StoreError::Incomplete`] before
/// the file is touched.
pub fn save_calibration(
    source: impl AsRef<Path>,
    record: &CalibrationRecord,
) -> Result<PathBuf, StoreError> {
    let points = record.points()?;
    let path = calibration_path(source);
    let stored = StoredRecord {
        points: points.iter().map(|p| [p.x, p.y]).collect(),
        settings: &record.settings,
    };
    let json = serde_json::to_string_pretty(&stored)?;
    fs::write(&path, json)?;
    log::info!("calibration and settings saved to {}", path.display());
    Ok(path)
}
