/// Odd-length 1D kernel centred on `taps[radius]`.
///
/// Conventions:
/// - Gaussian derivative: `radius = ceil(3*sigma)`, minimum 1, and
///   `dg[i] = -(x/sigma^2) * g[i]` with `g` the unit-sum Gaussian; `sum(dg) ~= 0` and convolving a rising ramp gives a positive response.
/// - Box: `taps` equal weights of `1/taps`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel1D {
    pub radius: usize,
    pub taps: Vec<f32>,
}

impl Kernel1D {
    /// # Panics
    ///
    /// Panics unless `sigma` is finite and positive.
    pub fn gaussian_derivative(sigma: f32) -> Self {
        let (radius, g) = normalized_gaussian(sigma);
        let sigma2 = sigma * sigma;
        let taps = g
            .iter()
            .enumerate()
            .map(|(i, gi)| {
                let x = i as f32 - radius as f32;
                -(x / sigma2) * gi
            })
            .collect();
        Self { radius, taps }
    }

    /// # Panics
    ///
    /// Panics if `taps` is even.
    pub fn box_filter(taps: usize) -> Self {
        assert!(taps % 2 == 1, "box filter needs an odd number of taps");
        Self {
            radius: taps / 2,
            taps: vec![1.0 / taps as f32; taps],
        }
    }

    pub fn len(&self) -> usize {
        self.taps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taps.is_empty()
    }
}

fn normalized_gaussian(sigma: f32) -> (usize, Vec<f32>) {
    assert!(
        sigma.is_finite() && sigma > 0.0,
        "sigma must be > 0 and finite"
    );

    let radius = ((3.0 * sigma).ceil() as usize).max(1);
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut g: Vec<f32> = (0..2 * radius + 1)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-(x * x) / two_sigma2).exp()
        })
        .collect();

    let sum: f32 = g.iter().sum();
    for gi in &mut g {
        *gi /= sum;
    }
    (radius, g)
}

#[cfg(test)]
mod tests {
    use super::{Kernel1D, normalized_gaussian};

    #[test]
    fn gaussian_sums_to_one_and_derivative_is_odd() {
        let (radius, g) = normalized_gaussian(1.5);
        assert_eq!(radius, 5);
        assert_eq!(g.len(), 11);
        let sum_g: f32 = g.iter().sum();
        assert!((sum_g - 1.0).abs() < 1e-5);

        let dg = Kernel1D::gaussian_derivative(1.5);
        assert_eq!(dg.len(), 11);
        let sum_dg: f32 = dg.taps.iter().sum();
        assert!(sum_dg.abs() < 1e-6);
        for i in 1..=dg.radius {
            assert!((dg.taps[dg.radius + i] + dg.taps[dg.radius - i]).abs() < 1e-6);
        }
        // Positive x side carries negative weight so that convolution
        // (not correlation) of a rising ramp is positive.
        assert!(dg.taps[dg.radius + 1] < 0.0);
    }

    #[test]
    fn box_filter_is_flat() {
        let k = Kernel1D::box_filter(5);
        assert_eq!(k.radius, 2);
        assert!(k.taps.iter().all(|&t| (t - 0.2).abs() < 1e-7));
    }

    #[test]
    #[should_panic(expected = "odd number of taps")]
    fn box_filter_rejects_even_taps() {
        let _ = Kernel1D::box_filter(4);
    }
}
