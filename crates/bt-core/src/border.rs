use serde::{Deserialize, Serialize};

/// Out-of-range handling for sampling and convolution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BorderMode {
    #[default]
    Clamp,
    Constant(f32),
    Reflect101,
}

/// Maps a possibly out-of-range index into `[0, len)`.
///
/// Returns `None` for [`BorderMode::Constant`] outside the range and for
/// empty sequences; the caller substitutes the fill value.
pub fn map_index(i: isize, len: usize, mode: BorderMode) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if i >= 0 && (i as usize) < len {
        return Some(i as usize);
    }

    match mode {
        BorderMode::Constant(_) => None,
        BorderMode::Clamp => Some(if i < 0 { 0 } else { len - 1 }),
        BorderMode::Reflect101 => {
            if len == 1 {
                return Some(0);
            }
            let period = (2 * len - 2) as isize;
            let r = i.rem_euclid(period) as usize;
            Some(if r < len { r } else { period as usize - r })
        }
    }
}
