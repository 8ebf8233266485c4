use bt_core::{BorderMode, map_index};

use crate::kernels1d::Kernel1D;

/// Convolves `signal` with `kernel`, writing `out[i] = sum_k s[i + r - k] * taps[k]`.
///
/// Samples outside the signal are resolved through `border`.
pub fn convolve_f32(signal: &[f32], kernel: &Kernel1D, border: BorderMode, out: &mut [f32]) {
    assert_eq!(out.len(), signal.len(), "out must match signal length");
    assert_eq!(
        kernel.len(),
        2 * kernel.radius + 1,
        "kernel len must be 2*radius+1"
    );

    let n = signal.len();
    if n == 0 {
        return;
    }

    let r = kernel.radius;
    let interior = r..n.saturating_sub(r);

    for (i, out_i) in out.iter_mut().enumerate() {
        *out_i = if interior.contains(&i) {
            // Full footprint `[i-r, i+r]` lies inside the signal.
            signal[i - r..=i + r]
                .iter()
                .rev()
                .zip(kernel.taps.iter())
                .map(|(s, k)| s * k)
                .sum()
        } else {
            convolve_at_border(signal, kernel, border, i)
        };
    }
}

fn convolve_at_border(signal: &[f32], kernel: &Kernel1D, border: BorderMode, i: usize) -> f32 {
    let n = signal.len();
    let fill = match border {
        BorderMode::Constant(c) => c,
        BorderMode::Clamp | BorderMode::Reflect101 => 0.0,
    };

    kernel
        .taps
        .iter()
        .enumerate()
        .map(|(k, &kv)| {
            let idx = i as isize + kernel.radius as isize - k as isize;
            let v = map_index(idx, n, border).map_or(fill, |j| signal[j]);
            v * kv
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use bt_core::BorderMode;

    use crate::conv1d::convolve_f32;
    use crate::kernels1d::Kernel1D;

    fn convolved(signal: &[f32], kernel: &Kernel1D, border: BorderMode) -> Vec<f32> {
        let mut out = vec![0.0f32; signal.len()];
        convolve_f32(signal, kernel, border, &mut out);
        out
    }

    #[test]
    fn identity_kernel_copies() {
        let signal = [1.0f32, 2.0, 3.0, 4.0];
        let k = Kernel1D {
            radius: 0,
            taps: vec![1.0],
        };
        let mut out = vec![0.0f32; signal.len()];
        convolve_f32(&signal, &k, BorderMode::Clamp, &mut out);
        assert_eq!(&out, &signal);
    }

    #[test]
    fn box_blur_with_constant_and_clamp_borders() {
        let signal = [3.0f32, 6.0, 9.0];
        let k = Kernel1D::box_filter(3);

        let c = convolved(&signal, &k, BorderMode::Constant(0.0));
        assert!((c[0] - 3.0).abs() < 1e-6);
        assert!((c[1] - 6.0).abs() < 1e-6);
        assert!((c[2] - 5.0).abs() < 1e-6);

        let cl = convolved(&signal, &k, BorderMode::Clamp);
        assert!((cl[0] - 4.0).abs() < 1e-6);
        assert!((cl[2] - 8.0).abs() < 1e-6);
    }

    #[test]
    fn derivative_of_ramp_is_slope() {
        let ramp: Vec<f32> = (0..40).map(|i| 2.0 * i as f32).collect();
        let d = convolved(&ramp, &Kernel1D::gaussian_derivative(1.5), BorderMode::Clamp);
        for v in &d[6..34] {
            assert!((v - 2.0).abs() < 1e-2, "got {v}");
        }
    }

    #[test]
    fn short_signal_takes_border_path_everywhere() {
        let signal = [1.0f32, 1.0];
        let out = convolved(&signal, &Kernel1D::box_filter(5), BorderMode::Reflect101);
        assert!(out.iter().all(|v| (v - 1.0).abs() < 1e-6));
    }
}
