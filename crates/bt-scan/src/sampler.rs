use bt_core::{BorderMode, ConfigError, Error, ImageView, Point, sample_column_f32};

/// Column span and per-column windows along a two-point reference segment.
///
/// Endpoints are ordered by column, so iteration always runs left to right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleExtractor {
    left: Point,
    right: Point,
    samples: usize,
    border: BorderMode,
}

impl SampleExtractor {
    /// Uses the first two of `endpoints`.
    pub fn new(endpoints: &[Point], samples: usize, border: BorderMode) -> Result<Self, Error> {
        let [p0, p1] = match endpoints {
            [p0, p1, ..] => [*p0, *p1],
            _ => {
                return Err(ConfigError::NotEnoughEndpoints {
                    placed: endpoints.len(),
                }
                .into());
            }
        };
        if samples == 0 {
            return Err(Error::invalid_parameter("samples_per_column", "must be > 0"));
        }
        let (left, right) = if p1.x < p0.x { (p1, p0) } else { (p0, p1) };
        Ok(Self {
            left,
            right,
            samples,
            border,
        })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Image columns `first..=last` covered by the segment, clipped to `width`.
    ///
    /// `None` when the segment misses the image entirely.
    pub fn column_span(&self, width: usize) -> Option<(usize, usize)> {
        if width == 0 {
            return None;
        }
        let max = (width - 1) as f32;
        let x0 = self.left.x.round();
        let x1 = self.right.x.round();
        if x1 < 0.0 || x0 > max {
            return None;
        }
        Some((x0.max(0.0) as usize, x1.min(max) as usize))
    }

    /// Segment row at column `x` by linear interpolation between endpoints.
    pub fn center_row(&self, x: f32) -> f32 {
        let dx = self.right.x - self.left.x;
        if dx.abs() < f32::EPSILON {
            return 0.5 * (self.left.y + self.right.y);
        }
        let t = (x - self.left.x) / dx;
        self.left.y + t * (self.right.y - self.left.y)
    }

    /// First image row of the window at column `x`.
    ///
    /// The window is centred on the segment and shifted to stay inside the
    /// image whenever the image is tall enough to hold it.
    pub fn window_top(&self, x: usize, height: usize) -> usize {
        let top = self.center_row(x as f32).round() as isize - (self.samples / 2) as isize;
        let max_top = height.saturating_sub(self.samples) as isize;
        top.clamp(0, max_top) as usize
    }

    /// Fills `out` (resized to the window length) with column `x` and
    /// returns the window's top row.
    pub fn extract<T: Copy + Into<f32>>(
        &self,
        img: &ImageView<'_, T>,
        x: usize,
        out: &mut Vec<f32>,
    ) -> usize {
        out.resize(self.samples, 0.0);
        let top = self.window_top(x, img.height());
        sample_column_f32(img, x as isize, top as isize, self.border, out);
        top
    }
}

#[cfg(test)]
mod tests {
    use bt_core::{BorderMode, ConfigError, Error, Image, Point};

    use super::SampleExtractor;

    #[test]
    fn needs_two_endpoints() {
        let err = SampleExtractor::new(&[Point::new(1.0, 1.0)], 10, BorderMode::Clamp)
            .expect_err("one endpoint");
        assert_eq!(
            err,
            Error::Configuration(ConfigError::NotEnoughEndpoints { placed: 1 })
        );
        assert!(SampleExtractor::new(&[], 10, BorderMode::Clamp).is_err());
    }

    #[test]
    fn endpoints_are_swapped_and_span_clipped() {
        let s = SampleExtractor::new(
            &[Point::new(40.0, 10.0), Point::new(-5.0, 30.0)],
            10,
            BorderMode::Clamp,
        )
        .expect("valid");
        assert_eq!(s.column_span(30), Some((0, 29)));
        assert_eq!(s.column_span(0), None);

        let off = SampleExtractor::new(
            &[Point::new(40.0, 10.0), Point::new(50.0, 30.0)],
            10,
            BorderMode::Clamp,
        )
        .expect("valid");
        assert_eq!(off.column_span(30), None);
    }

    #[test]
    fn center_row_interpolates() {
        let s = SampleExtractor::new(
            &[Point::new(10.0, 20.0), Point::new(0.0, 10.0)],
            10,
            BorderMode::Clamp,
        )
        .expect("valid");
        assert_eq!(s.center_row(0.0), 10.0);
        assert_eq!(s.center_row(5.0), 15.0);
        assert_eq!(s.center_row(10.0), 20.0);

        let vertical = SampleExtractor::new(
            &[Point::new(3.0, 20.0), Point::new(3.0, 10.0)],
            10,
            BorderMode::Clamp,
        )
        .expect("valid");
        assert_eq!(vertical.center_row(3.0), 15.0);
    }

    #[test]
    fn window_is_centred_then_kept_inside() {
        let s = SampleExtractor::new(
            &[Point::new(0.0, 50.0), Point::new(29.0, 50.0)],
            20,
            BorderMode::Clamp,
        )
        .expect("valid");
        assert_eq!(s.window_top(5, 100), 40);
        assert_eq!(s.window_top(5, 55), 35);
        assert_eq!(s.window_top(5, 10), 0);
    }

    #[test]
    fn extract_reads_column_rows() {
        let img = Image::from_fn(4, 30, |x, y| (x * 100 + y) as u16);
        let s = SampleExtractor::new(
            &[Point::new(0.0, 10.0), Point::new(3.0, 10.0)],
            6,
            BorderMode::Clamp,
        )
        .expect("valid");
        let mut out = Vec::new();
        let top = s.extract(&img.as_view(), 2, &mut out);
        assert_eq!(top, 7);
        assert_eq!(out, vec![207.0, 208.0, 209.0, 210.0, 211.0, 212.0]);
    }
}
