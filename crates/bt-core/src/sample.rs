use crate::border::{BorderMode, map_index};
use crate::image::ImageView;

/// Gathers `out.len()` consecutive samples of column `x`, starting at row
/// `y_top` (which may be negative or run past the bottom edge).
pub fn sample_column_f32<T: Copy + Into<f32>>(
    img: &ImageView<'_, T>,
    x: isize,
    y_top: isize,
    border: BorderMode,
    out: &mut [f32],
) {
    let Some(xi) = map_index(x, img.width(), border) else {
        out.fill(fill_value(border));
        return;
    };

    let h = img.height();
    for (i, dst) in out.iter_mut().enumerate() {
        *dst = match map_index(y_top + i as isize, h, border) {
            // SAFETY: `xi < width` and `yi < height` by `map_index`.
            Some(yi) => unsafe { (*img.get_unchecked(xi, yi)).into() },
            None => fill_value(border),
        };
    }
}

#[inline]
fn fill_value(border: BorderMode) -> f32 {
    match border {
        BorderMode::Constant(v) => v,
        BorderMode::Clamp | BorderMode::Reflect101 => 0.0,
    }
}
