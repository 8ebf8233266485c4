use bt_core::BorderMode;
use serde::{Deserialize, Serialize};

use crate::conv1d::convolve_f32;
use crate::kernels1d::Kernel1D;

/// How per-sample darkness is derived from a cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Darkness {
    /// `intensity_max - blurred`.
    #[default]
    Inverted,
    /// Inverted value plus the absolute intensity gradient.
    EdgeWeighted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Sigma of the derivative-of-Gaussian fed to the period estimator.
    pub gradient_sigma: f32,
    /// Box blur length for darkness and the binary mask; odd.
    pub blur_taps: usize,
    pub darkness: Darkness,
    /// Upper end of the intensity range.
    pub intensity_max: f32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            gradient_sigma: 1.5,
            blur_taps: 5,
            darkness: Darkness::Inverted,
            intensity_max: 255.0,
        }
    }
}

/// Derived signals of one column cross-section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnProfile {
    /// Intensity derivative; input to the period estimator.
    pub gradient: Vec<f32>,
    /// Locally blurred intensity; input to thresholding.
    pub blurred: Vec<f32>,
    /// Band scoring values.
    pub darkness: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    cfg: ProfileConfig,
    derivative: Kernel1D,
    blur: Kernel1D,
}

impl ProfileBuilder {
    pub fn new(cfg: &ProfileConfig) -> Self {
        Self {
            cfg: cfg.clone(),
            derivative: Kernel1D::gaussian_derivative(cfg.gradient_sigma),
            blur: Kernel1D::box_filter(cfg.blur_taps),
        }
    }

    pub fn build(&self, samples: &[f32]) -> ColumnProfile {
        let n = samples.len();
        let mut profile = ColumnProfile {
            gradient: vec![0.0; n],
            blurred: vec![0.0; n],
            darkness: vec![0.0; n],
        };
        self.build_into(samples, &mut profile);
        profile
    }

    pub fn build_into(&self, samples: &[f32], out: &mut ColumnProfile) {
        let n = samples.len();
        out.gradient.resize(n, 0.0);
        out.blurred.resize(n, 0.0);
        out.darkness.resize(n, 0.0);

        convolve_f32(samples, &self.derivative, BorderMode::Clamp, &mut out.gradient);
        convolve_f32(samples, &self.blur, BorderMode::Clamp, &mut out.blurred);

        let max = self.cfg.intensity_max;
        for ((d, &b), &g) in out
            .darkness
            .iter_mut()
            .zip(out.blurred.iter())
            .zip(out.gradient.iter())
        {
            let inverted = (max - b).max(0.0);
            *d = match self.cfg.darkness {
                Darkness::Inverted => inverted,
                Darkness::EdgeWeighted => inverted + g.abs(),
            };
        }
    }
}
