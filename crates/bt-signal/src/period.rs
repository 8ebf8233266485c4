//! Dominant period and phase of a 1D oscillation.
//!
//! The sequence is tapered with a raised-cosine window, zero-padded to a
//! fixed power-of-two transform, and the strongest bucket in
//! `[min_bucket, fft_size/2)` is taken as the dominant frequency. Buckets
//! below `min_bucket` describe periods longer than the sampled window.
//!
//! The winning bucket is then refined by a window-weighted least-squares
//! sinusoid fit around its frequency. With only one or two cycles in the
//! window the raw bucket is biased by leakage, which shifts the phase by up
//! to two samples at long wavelengths; the fitted coefficient replaces the
//! bucket value in the same phase conversion.
//!
//! Phase convention: the returned `first_peak_position` marks where the
//! input rises through its mean. Fed the derivative of an intensity profile
//! with dark bands, those points are the band centres.

use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use bt_core::EstimationFailure;
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::window::raised_cosine;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    /// Transform length; must be a power of two.
    pub fft_size: usize,
    /// Lowest bucket considered. Lower buckets are treated as unreliable.
    pub min_bucket: usize,
    /// Fixed phase rotation, in cycles, applied before conversion to a
    /// sample offset.
    pub phase_rotation: f32,
    /// Golden-section steps of the sub-bucket refinement; `0` keeps the raw
    /// bucket.
    pub refine_iterations: usize,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            min_bucket: 20,
            phase_rotation: 0.75,
            refine_iterations: 40,
        }
    }
}

/// Wavelength and phase of one column's oscillation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodEstimate {
    /// Period in samples; always `> 0`.
    pub wavelength: f32,
    /// Offset of the first characteristic peak, in `(-wavelength, 0]`.
    pub first_peak_position: f32,
}

impl PeriodEstimate {
    /// Peak positions stepped forward by whole wavelengths into `[0, len)`.
    pub fn peaks(&self, len: usize) -> impl Iterator<Item = f32> + '_ {
        let wl = self.wavelength;
        let first = self.first_peak_position;
        let k0 = if first < 0.0 { (-first / wl).ceil() } else { 0.0 };
        let limit = len as f32;

        (0u32..)
            .map(move |k| first + (k0 + k as f32) * wl)
            .take_while(move |&p| p < limit)
            .filter(|&p| p >= 0.0)
    }
}

/// Reusable estimator; owns the planned transform and scratch buffers.
#[derive(Clone)]
pub struct WavelengthPhaseEstimator {
    cfg: PeriodConfig,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    buf: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl fmt::Debug for WavelengthPhaseEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WavelengthPhaseEstimator")
            .field("cfg", &self.cfg)
            .field("window_len", &self.window.len())
            .finish()
    }
}

impl WavelengthPhaseEstimator {
    /// # Panics
    ///
    /// Panics if `cfg.fft_size` is not a power of two.
    pub fn new(cfg: &PeriodConfig) -> Self {
        assert!(
            cfg.fft_size.is_power_of_two(),
            "fft_size must be a power of two"
        );
        let fft = FftPlanner::<f64>::new().plan_fft_forward(cfg.fft_size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            cfg: cfg.clone(),
            fft,
            window: Vec::new(),
            buf: vec![Complex64::new(0.0, 0.0); cfg.fft_size],
            scratch,
        }
    }

    pub fn config(&self) -> &PeriodConfig {
        &self.cfg
    }

    pub fn estimate(&mut self, samples: &[f32]) -> Result<PeriodEstimate, EstimationFailure> {
        let n = samples.len();
        if n == 0 {
            return Err(EstimationFailure::EmptySignal);
        }

        let (lo, hi) = samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if hi - lo <= 0.0 || !(hi - lo).is_finite() {
            return Err(EstimationFailure::FlatSignal);
        }

        if self.window.len() != n {
            self.window = raised_cosine(n);
        }

        // Sequences longer than the transform fold onto it; the bucket values
        // are unchanged because the folded terms share the same phase factor.
        let size = self.cfg.fft_size;
        self.buf.fill(Complex64::new(0.0, 0.0));
        for (t, (&s, &w)) in samples.iter().zip(self.window.iter()).enumerate() {
            self.buf[t % size].re += s as f64 * w;
        }
        self.fft
            .process_with_scratch(&mut self.buf, &mut self.scratch);

        let mut best: Option<(usize, f64)> = None;
        for k in self.cfg.min_bucket..size / 2 {
            let mag = self.buf[k].norm_sqr();
            if best.is_none_or(|(_, m)| mag > m) {
                best = Some((k, mag));
            }
        }
        let Some((bucket, _)) = best else {
            return Err(EstimationFailure::ZeroCycles);
        };

        let cycles = bucket as f64 * n as f64 / size as f64;
        if cycles <= 0.0 {
            return Err(EstimationFailure::ZeroCycles);
        }

        let (wavelength, z) = match self.refine(samples, bucket) {
            Some((freq, z)) => (1.0 / freq, z),
            None => (n as f64 / cycles, self.buf[bucket]),
        };

        let phase = z.im.atan2(z.re) / TAU + 0.5;
        let phase = (phase + self.cfg.phase_rotation as f64).rem_euclid(1.0);
        let wavelength = wavelength as f32;
        let mut first_peak_position = (-phase * wavelength as f64) as f32;
        // A phase just below one cycle can round onto the open end.
        if first_peak_position <= -wavelength {
            first_peak_position = 0.0;
        }

        Ok(PeriodEstimate {
            wavelength,
            first_peak_position,
        })
    }

    /// Narrows the frequency of `bucket` to the least-squares optimum within
    /// a fraction of a cycle per window. Returns the frequency in cycles per
    /// sample and the fitted complex coefficient.
    fn refine(&self, samples: &[f32], bucket: usize) -> Option<(f64, Complex64)> {
        if self.cfg.refine_iterations == 0 {
            return None;
        }
        let n = samples.len() as f64;
        let size = self.cfg.fft_size as f64;
        let centre = bucket as f64 / size;
        let reach = (1.0 / size + 0.1 / n).min(0.4 / n);
        let mut lo = (centre - reach).max(0.5 / n);
        let mut hi = (centre + reach).min(0.5);
        if lo >= hi {
            return None;
        }

        let cost = |freq: f64| fit_sinusoid(samples, &self.window, freq).map(|(r, _)| r);
        let ratio = (5.0f64.sqrt() - 1.0) / 2.0;
        let mut a = hi - ratio * (hi - lo);
        let mut b = lo + ratio * (hi - lo);
        let mut fa = cost(a)?;
        let mut fb = cost(b)?;
        for _ in 0..self.cfg.refine_iterations {
            if fa < fb {
                hi = b;
                b = a;
                fb = fa;
                a = hi - ratio * (hi - lo);
                fa = cost(a)?;
            } else {
                lo = a;
                a = b;
                fa = fb;
                b = lo + ratio * (hi - lo);
                fb = cost(b)?;
            }
        }

        let freq = 0.5 * (lo + hi);
        let (_, z) = fit_sinusoid(samples, &self.window, freq)?;
        Some((freq, z))
    }
}

/// Weighted fit of `a·cos + b·sin + c` at `freq` cycles per sample.
///
/// Returns the weighted residual and `a - ib`, which has the argument a
/// transform bucket at that frequency would have.
fn fit_sinusoid(samples: &[f32], weights: &[f64], freq: f64) -> Option<(f64, Complex64)> {
    let mut normal = [[0.0f64; 3]; 3];
    let mut rhs = [0.0f64; 3];
    let mut energy = 0.0;
    for (t, (&s, &w)) in samples.iter().zip(weights).enumerate() {
        let (sin, cos) = (TAU * freq * t as f64).sin_cos();
        let basis = [cos, sin, 1.0];
        let s = s as f64;
        for (row, &bi) in normal.iter_mut().zip(&basis) {
            for (cell, &bj) in row.iter_mut().zip(&basis) {
                *cell += w * bi * bj;
            }
        }
        for (r, &bi) in rhs.iter_mut().zip(&basis) {
            *r += w * bi * s;
        }
        energy += w * s * s;
    }

    let coef = solve3(normal, rhs)?;
    let explained: f64 = coef.iter().zip(&rhs).map(|(c, r)| c * r).sum();
    Some((energy - explained, Complex64::new(coef[0], -coef[1])))
}

/// Gaussian elimination with partial pivoting; `None` when singular.
fn solve3(mut m: [[f64; 3]; 3], mut v: [f64; 3]) -> Option<[f64; 3]> {
    let scale = m.iter().flatten().fold(0.0f64, |acc, x| acc.max(x.abs()));
    if scale == 0.0 {
        return None;
    }
    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))?;
        if m[pivot][col].abs() <= scale * 1e-12 {
            return None;
        }
        m.swap(col, pivot);
        v.swap(col, pivot);
        for row in 0..3 {
            if row == col {
                continue;
            }
            let factor = m[row][col] / m[col][col];
            for k in col..3 {
                m[row][k] -= factor * m[col][k];
            }
            v[row] -= factor * v[col];
        }
    }
    Some([v[0] / m[0][0], v[1] / m[1][1], v[2] / m[2][2]])
}
