use std::ops::RangeInclusive;

use bt_core::{BoundingBox, Error, Point};
use serde::{Deserialize, Serialize};

use crate::object::Object;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlobConfig {
    /// Blurred intensities strictly below this are "on".
    pub threshold: f32,
    /// Accepted bounding-box widths (columns), inclusive.
    pub width: RangeInclusive<usize>,
    /// Accepted bounding-box heights (rows), inclusive.
    pub height: RangeInclusive<usize>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            threshold: 128.0,
            width: 10..=40,
            height: 5..=10,
        }
    }
}

impl BlobConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !self.threshold.is_finite() {
            return Err(Error::invalid_parameter("blob.threshold", "must be finite"));
        }
        if self.width.is_empty() {
            return Err(Error::invalid_parameter("blob.width", "empty range"));
        }
        if self.height.is_empty() {
            return Err(Error::invalid_parameter("blob.height", "empty range"));
        }
        Ok(())
    }

    pub fn keeps(&self, bbox: &BoundingBox) -> bool {
        self.width.contains(&bbox.width()) && self.height.contains(&bbox.height())
    }
}

/// Ordered symbolic names for half-step offsets; the middle entry is offset 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTable(Vec<String>);

const DEFAULT_LABELS: [&str; 17] = [
    "A3", "B3", "C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5", "D5", "E5", "F5", "G5", "A5", "B5",
    "C6",
];

impl Default for LabelTable {
    fn default() -> Self {
        Self(DEFAULT_LABELS.iter().map(|s| s.to_string()).collect())
    }
}

impl LabelTable {
    pub fn new(labels: Vec<String>) -> Result<Self, Error> {
        let table = Self(labels);
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.0.len() % 2 == 0 {
            return Err(Error::invalid_parameter(
                "labels",
                format!("need an odd, non-empty table, got {} entries", self.0.len()),
            ));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Table index of `steps` half-steps above the centerline, clamped to the table.
    pub fn index(&self, steps: i32) -> usize {
        let middle = (self.0.len() / 2) as i64;
        let last = self.0.len().saturating_sub(1) as i64;
        (middle + steps as i64).clamp(0, last) as usize
    }

    pub fn label(&self, steps: i32) -> Option<&str> {
        self.0.get(self.index(steps)).map(String::as_str)
    }
}

/// Rounded offset of `y` from `centerline_row` in half-wavelength units.
///
/// Positive values are above the centerline (smaller row index).
pub fn half_steps(y: f32, centerline_row: f32, wavelength: f32) -> i32 {
    let half = 0.5 * wavelength;
    // `as` saturates, which keeps huge offsets on the table's ends.
    ((centerline_row - y) / half).round() as i32
}

/// Primary centerline as seen by the classifier.
#[derive(Debug, Clone, Copy)]
pub struct CenterlineRef<'a> {
    /// Image column of offset 0.
    pub first_column: usize,
    /// Recorded row per column offset.
    pub rows: &'a [Option<f32>],
    /// Mean band spacing along the track.
    pub wavelength: f32,
}

impl CenterlineRef<'_> {
    /// Centerline row at image column `x`.
    ///
    /// Uses the recorded value when present, interpolates linearly between the
    /// nearest recorded neighbours, and falls back to the single nearest one
    /// outside the recorded span.
    pub fn row_at(&self, x: f32) -> Option<f32> {
        let o = x - self.first_column as f32;
        let left = self
            .rows
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, r)| r.filter(|_| i as f32 <= o).map(|r| (i as f32, r)));
        let right = self
            .rows
            .iter()
            .enumerate()
            .find_map(|(i, r)| r.filter(|_| i as f32 >= o).map(|r| (i as f32, r)));

        match (left, right) {
            (Some((xl, yl)), Some((xr, yr))) if xr > xl => {
                let t = (o - xl) / (xr - xl);
                Some(yl + t * (yr - yl))
            }
            (Some((_, y)), _) | (None, Some((_, y))) => Some(y),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedObject {
    pub bbox: BoundingBox,
    pub label: Option<String>,
    pub center: Point,
    pub offset_steps: Option<i32>,
}

/// Size-filter `objects` and label the survivors against `centerline`.
pub fn classify(
    objects: &[Object],
    cfg: &BlobConfig,
    labels: &LabelTable,
    centerline: Option<&CenterlineRef<'_>>,
) -> Vec<ClassifiedObject> {
    let out: Vec<ClassifiedObject> = objects
        .iter()
        .filter(|o| cfg.keeps(&o.bbox))
        .map(|o| {
            let center = o.bbox.center();
            let offset_steps = centerline.and_then(|cl| {
                let row = cl.row_at(center.x)?;
                (cl.wavelength > 0.0).then(|| half_steps(center.y, row, cl.wavelength))
            });
            ClassifiedObject {
                bbox: o.bbox,
                label: offset_steps.and_then(|s| labels.label(s).map(str::to_owned)),
                center,
                offset_steps,
            }
        })
        .collect();

    log::debug!(
        "classified {} of {} objects (size filter {:?} x {:?})",
        out.len(),
        objects.len(),
        cfg.width,
        cfg.height
    );
    out
}

#[cfg(test)]
mod tests {
    use bt_core::BoundingBox;

    use super::{BlobConfig, CenterlineRef, LabelTable, classify, half_steps};
    use crate::object::{Object, Segment};

    fn rect_object(id: usize, cols: std::ops::Range<usize>, y0: usize, y1: usize) -> Object {
        let mut it = cols.map(|c| Segment::new(c, y0, y1));
        let first = it.next().expect("non-empty range");
        let mut o = Object::start(id, first);
        for s in it {
            o.push(s);
        }
        o
    }

    #[test]
    fn offset_zero_is_middle_entry() {
        let t = LabelTable::default();
        assert_eq!(t.len(), 17);
        assert_eq!(t.index(0), 8);
        assert_eq!(t.label(0), Some("B4"));
        assert_eq!(t.label(2), Some("D5"));
        assert_eq!(t.label(-8), Some("A3"));
        assert_eq!(t.label(8), Some("C6"));
    }

    #[test]
    fn label_index_saturates() {
        let t = LabelTable::default();
        assert_eq!(t.index(100), 16);
        assert_eq!(t.index(-100), 0);
        assert_eq!(t.index(i32::MAX), 16);
        assert_eq!(t.index(i32::MIN), 0);
    }

    #[test]
    fn even_table_is_rejected() {
        assert!(LabelTable::new(vec!["a".into(), "b".into()]).is_err());
        assert!(LabelTable::new(Vec::new()).is_err());
        assert!(LabelTable::new(vec!["mid".into()]).is_ok());
    }

    #[test]
    fn half_steps_rounds_and_signs() {
        assert_eq!(half_steps(42.0, 50.0, 8.0), 2);
        assert_eq!(half_steps(34.0, 50.0, 8.0), 4);
        assert_eq!(half_steps(58.0, 50.0, 8.0), -2);
        assert_eq!(half_steps(48.9, 50.0, 8.0), 0);
        assert_eq!(half_steps(47.5, 50.0, 8.0), 1);
    }

    #[test]
    fn size_filter_is_inclusive() {
        let cfg = BlobConfig::default();
        let mut b = BoundingBox::new(0, 0, 4);
        b.include(9, 0, 4);
        assert!(cfg.keeps(&b));
        b.include(10, 0, 10);
        assert!(!cfg.keeps(&b));

        assert!(cfg.validate().is_ok());
        let bad = BlobConfig {
            height: 6..=5,
            ..BlobConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn row_at_interpolates_and_extends() {
        let rows = [None, Some(50.0), None, Some(54.0), None];
        let cl = CenterlineRef {
            first_column: 10,
            rows: &rows,
            wavelength: 8.0,
        };
        assert_eq!(cl.row_at(11.0), Some(50.0));
        assert_eq!(cl.row_at(12.0), Some(52.0));
        assert_eq!(cl.row_at(12.5), Some(53.0));
        assert_eq!(cl.row_at(10.0), Some(50.0));
        assert_eq!(cl.row_at(30.0), Some(54.0));

        let empty = [None, None];
        let cl = CenterlineRef {
            first_column: 0,
            rows: &empty,
            wavelength: 8.0,
        };
        assert_eq!(cl.row_at(1.0), None);
    }

    #[test]
    fn classify_filters_and_labels() {
        let objects = vec![
            rect_object(0, 5..25, 39, 45),
            rect_object(1, 0..3, 10, 12),
            rect_object(2, 5..25, 54, 60),
        ];
        let rows = vec![Some(50.0); 30];
        let cl = CenterlineRef {
            first_column: 0,
            rows: &rows,
            wavelength: 8.0,
        };

        let out = classify(
            &objects,
            &BlobConfig::default(),
            &LabelTable::default(),
            Some(&cl),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].offset_steps, Some(2));
        assert_eq!(out[0].label.as_deref(), Some("D5"));
        assert_eq!(out[0].center.x, 14.5);
        assert_eq!(out[0].center.y, 42.0);
        assert_eq!(out[1].offset_steps, Some(-2));
        assert_eq!(out[1].label.as_deref(), Some("G4"));
    }

    #[test]
    fn classify_without_centerline_leaves_labels_empty() {
        let objects = vec![rect_object(0, 5..25, 39, 45)];
        let out = classify(
            &objects,
            &BlobConfig::default(),
            &LabelTable::default(),
            None,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, None);
        assert_eq!(out[0].offset_steps, None);
    }
}
