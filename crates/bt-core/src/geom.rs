use serde::{Deserialize, Serialize};

/// Image-space point; `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Inclusive axis-aligned box in pixel indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_col: usize,
    pub max_col: usize,
    pub min_y: usize,
    pub max_y: usize,
}

impl BoundingBox {
    pub fn new(col: usize, y_start: usize, y_end: usize) -> Self {
        Self {
            min_col: col,
            max_col: col,
            min_y: y_start.min(y_end),
            max_y: y_start.max(y_end),
        }
    }

    /// Number of columns covered.
    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Number of rows covered.
    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    pub fn center(&self) -> Point {
        Point {
            x: 0.5 * (self.min_col + self.max_col) as f32,
            y: 0.5 * (self.min_y + self.max_y) as f32,
        }
    }

    pub fn include(&mut self, col: usize, y_start: usize, y_end: usize) {
        self.min_col = self.min_col.min(col);
        self.max_col = self.max_col.max(col);
        self.min_y = self.min_y.min(y_start);
        self.max_y = self.max_y.max(y_end);
    }
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, Point};

    #[test]
    fn box_grows_and_reports_inclusive_extent() {
        let mut b = BoundingBox::new(5, 12, 10);
        assert_eq!((b.min_y, b.max_y), (10, 12));

        b.include(24, 9, 15);
        assert_eq!(b.width(), 20);
        assert_eq!(b.height(), 7);
        assert_eq!(b.center(), Point::new(14.5, 12.0));
    }
}
