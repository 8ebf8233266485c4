use bt_blob::ClassifiedObject;
use bt_signal::PeriodEstimate;
use bt_track::Track;
use serde::{Deserialize, Serialize};

/// Primary track as a sparse column-offset -> row map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centerline {
    /// Row per column offset; `None` where the track received no centre.
    pub rows: Vec<Option<f32>>,
    /// Mean band spacing recorded along the track.
    pub mean_wavelength: f32,
    /// Index into [`ScanResult::tracks`].
    pub track: usize,
}

impl Centerline {
    /// Recorded `(image column, row)` pairs.
    pub fn points(&self, first_column: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(move |(i, r)| r.map(|r| (first_column + i, r)))
    }
}

/// Per-column estimate kept for overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnDiagnostic {
    pub wavelength: f32,
    /// Relative to `window_top`.
    pub first_peak_position: f32,
    pub window_top: usize,
}

impl ColumnDiagnostic {
    /// Predicted band rows in image coordinates inside the `len`-row window.
    pub fn band_rows(&self, len: usize) -> Vec<f32> {
        let top = self.window_top as f32;
        let est = PeriodEstimate {
            wavelength: self.wavelength,
            first_peak_position: self.first_peak_position,
        };
        est.peaks(len).map(|p| top + p).collect()
    }
}

/// Outcome of one scan. Nothing in it refers back to the scanner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Image column of offset 0.
    pub first_column: usize,
    /// Number of scanned columns.
    pub columns: usize,
    pub centerline: Option<Centerline>,
    pub tracks: Vec<Track>,
    pub objects: Vec<ClassifiedObject>,
    /// One entry per column offset; `None` where estimation failed.
    pub diagnostics: Vec<Option<ColumnDiagnostic>>,
}

impl ScanResult {
    pub fn empty(first_column: usize) -> Self {
        Self {
            first_column,
            ..Self::default()
        }
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
