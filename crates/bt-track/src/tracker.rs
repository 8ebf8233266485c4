use bt_core::{Assigner, Assignment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Largest distance (in rows) at which a centre still extends a track.
    pub gate: f32,
    /// Weight of the new observation in the smoothed `last_position`.
    pub smoothing: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            gate: 4.0,
            smoothing: 0.25,
        }
    }
}

/// One persistent band identity across the scanned columns.
///
/// `center_positions` and `widths` are indexed by column offset and hold
/// `None` wherever the track received no centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub last_position: f32,
    pub center_positions: Vec<Option<f32>>,
    pub widths: Vec<Option<f32>>,
    pub length: usize,
}

impl Track {
    fn start(columns: usize, offset: usize, position: f32, width: f32) -> Self {
        let mut center_positions = vec![None; columns];
        let mut widths = vec![None; columns];
        center_positions[offset] = Some(position);
        widths[offset] = Some(width);
        Self {
            last_position: position,
            center_positions,
            widths,
            length: 1,
        }
    }

    fn extend(&mut self, offset: usize, position: f32, width: f32, smoothing: f32) {
        self.last_position = smooth(self.last_position, position, smoothing);
        // A tied set may hit the same track twice in one column; the column
        // counts once and keeps the later centre.
        if self.center_positions[offset].is_none() {
            self.length += 1;
        }
        self.center_positions[offset] = Some(position);
        self.widths[offset] = Some(width);
    }

    /// Recorded `(column offset, row)` pairs in column order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.center_positions
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (i, p)))
    }

    pub fn first_offset(&self) -> Option<usize> {
        self.positions().next().map(|(i, _)| i)
    }

    pub fn mean_width(&self) -> Option<f32> {
        let (sum, n) = self
            .widths
            .iter()
            .flatten()
            .fold((0.0f32, 0usize), |(s, n), w| (s + w, n + 1));
        (n > 0).then(|| sum / n as f32)
    }
}

#[inline]
fn smooth(last: f32, new: f32, smoothing: f32) -> f32 {
    last * (1.0 - smoothing) + new * smoothing
}

/// Index and distance of the entry closest to `position`; the first one wins ties.
fn nearest(lasts: &[f32], position: f32) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &last) in lasts.iter().enumerate() {
        let d = (last - position).abs();
        if best.is_none_or(|(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}

/// Greedy nearest-`last_position` matching with a symmetric distance gate.
///
/// Candidates are processed in order. Each one sees the smoothed positions
/// left by earlier candidates of the same column, and tracks started by them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreedyNearest {
    pub gate: f32,
    pub smoothing: f32,
}

impl GreedyNearest {
    pub fn new(cfg: &TrackConfig) -> Self {
        Self {
            gate: cfg.gate,
            smoothing: cfg.smoothing,
        }
    }
}

impl Assigner<f32, f32> for GreedyNearest {
    fn assign(&self, candidates: &[f32], existing: &[f32]) -> Vec<Assignment> {
        let mut lasts = existing.to_vec();
        candidates
            .iter()
            .map(|&c| match nearest(&lasts, c) {
                Some((i, d)) if d <= self.gate => {
                    lasts[i] = smooth(lasts[i], c, self.smoothing);
                    Assignment::Existing(i)
                }
                _ => {
                    lasts.push(c);
                    Assignment::New
                }
            })
            .collect()
    }
}

/// Links per-column band centres into [`Track`]s.
///
/// Columns must be pushed in increasing offset order; the longest track is
/// the primary centerline.
#[derive(Debug, Clone)]
pub struct CenterlineTracker<A = GreedyNearest> {
    cfg: TrackConfig,
    assigner: A,
    columns: usize,
    tracks: Vec<Track>,
    lasts: Vec<f32>,
}

impl CenterlineTracker<GreedyNearest> {
    pub fn new(cfg: &TrackConfig, columns: usize) -> Self {
        Self::with_assigner(cfg, columns, GreedyNearest::new(cfg))
    }
}

impl<A: Assigner<f32, f32>> CenterlineTracker<A> {
    pub fn with_assigner(cfg: &TrackConfig, columns: usize, assigner: A) -> Self {
        Self {
            cfg: cfg.clone(),
            assigner,
            columns,
            tracks: Vec::new(),
            lasts: Vec::new(),
        }
    }

    /// Drop all tracks and prepare for a scan over `columns` columns.
    pub fn reset(&mut self, columns: usize) {
        self.columns = columns;
        self.tracks.clear();
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Feed the chosen centres (rows) of one column. `width` is the band
    /// spacing measured in that column.
    pub fn push_column(&mut self, offset: usize, centers: &[f32], width: f32) {
        assert!(offset < self.columns, "column offset out of range");
        if centers.is_empty() {
            return;
        }

        self.lasts.clear();
        self.lasts.extend(self.tracks.iter().map(|t| t.last_position));
        let assignments = self.assigner.assign(centers, &self.lasts);
        debug_assert_eq!(assignments.len(), centers.len());

        for (&center, assignment) in centers.iter().zip(assignments) {
            match assignment {
                Assignment::Existing(i) if i < self.tracks.len() => {
                    self.tracks[i].extend(offset, center, width, self.cfg.smoothing);
                }
                _ => {
                    log::trace!(
                        "track {} started at column offset {offset}, row {center:.2}",
                        self.tracks.len()
                    );
                    self.tracks
                        .push(Track::start(self.columns, offset, center, width));
                }
            }
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Longest track; the earliest created wins ties.
    pub fn primary(&self) -> Option<&Track> {
        primary_index(&self.tracks).map(|i| &self.tracks[i])
    }

    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }
}

/// Index of the longest track in `tracks`; the earliest wins ties.
pub fn primary_index(tracks: &[Track]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, t) in tracks.iter().enumerate() {
        if best.is_none_or(|b| t.length > tracks[b].length) {
            best = Some(i);
        }
    }
    best
}
