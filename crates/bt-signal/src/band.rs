use serde::{Deserialize, Serialize};

use crate::period::PeriodEstimate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    /// Consecutive candidates summed into one score; odd.
    pub score_taps: usize,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self { score_taps: 5 }
    }
}

/// One periodic band centre candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Sample index in the column window.
    pub position: usize,
    pub score: f32,
}

/// Scores band centres predicted by a period estimate.
#[derive(Debug, Clone, Default)]
pub struct BandLocator {
    cfg: BandConfig,
}

impl BandLocator {
    /// # Panics
    ///
    /// Panics if `cfg.score_taps` is even.
    pub fn new(cfg: &BandConfig) -> Self {
        assert!(cfg.score_taps % 2 == 1, "score_taps must be odd");
        Self { cfg: cfg.clone() }
    }

    /// Nearest integer positions of `first_peak + k*wavelength` in `[0, len)`.
    pub fn candidate_positions(estimate: &PeriodEstimate, len: usize) -> Vec<usize> {
        estimate
            .peaks(len)
            .map(|p| (p.round() as usize).min(len.saturating_sub(1)))
            .collect()
    }

    /// Every candidate with a full neighbourhood, scored by the summed
    /// darkness of the `score_taps` consecutive candidates centred on it.
    pub fn scored_candidates(&self, estimate: &PeriodEstimate, darkness: &[f32]) -> Vec<Candidate> {
        let positions = Self::candidate_positions(estimate, darkness.len());
        let taps = self.cfg.score_taps;
        if positions.len() < taps {
            return Vec::new();
        }

        let half = taps / 2;
        positions
            .windows(taps)
            .map(|w| Candidate {
                position: w[half],
                score: w.iter().map(|&p| darkness[p]).sum(),
            })
            .collect()
    }

    /// The maximum-score candidates.
    ///
    /// A later exact tie joins the set; a strictly greater score replaces it.
    /// Returns an empty set when fewer than `score_taps` candidates fit.
    pub fn locate(&self, estimate: &PeriodEstimate, darkness: &[f32]) -> Vec<Candidate> {
        let mut best: Vec<Candidate> = Vec::new();
        for cand in self.scored_candidates(estimate, darkness) {
            match best.first() {
                Some(b) if cand.score < b.score => {}
                Some(b) if cand.score == b.score => best.push(cand),
                _ => {
                    best.clear();
                    best.push(cand);
                }
            }
        }
        best
    }
}
