use bt_core::BoundingBox;
use serde::{Deserialize, Serialize};

pub type ObjectId = usize;

/// Maximal run of "on" rows in one column, `y_start..=y_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub column: usize,
    pub y_start: usize,
    pub y_end: usize,
}

impl Segment {
    pub fn new(column: usize, y_start: usize, y_end: usize) -> Self {
        debug_assert!(y_start <= y_end);
        Self {
            column,
            y_start,
            y_end,
        }
    }

    /// Number of rows covered.
    pub fn height(&self) -> usize {
        self.y_end - self.y_start + 1
    }

    /// Non-empty row-range intersection, columns ignored.
    #[inline]
    pub fn overlaps(&self, other: &Segment) -> bool {
        self.y_start <= other.y_end && other.y_start <= self.y_end
    }
}

/// Connected region built from segments of consecutive columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub id: ObjectId,
    pub segments: Vec<Segment>,
    pub bbox: BoundingBox,
}

impl Object {
    pub(crate) fn start(id: ObjectId, seg: Segment) -> Self {
        Self {
            id,
            segments: vec![seg],
            bbox: BoundingBox::new(seg.column, seg.y_start, seg.y_end),
        }
    }

    pub(crate) fn push(&mut self, seg: Segment) {
        self.bbox.include(seg.column, seg.y_start, seg.y_end);
        self.segments.push(seg);
    }

    /// Number of "on" pixels.
    pub fn area(&self) -> usize {
        self.segments.iter().map(Segment::height).sum()
    }
}

/// Segments an object received in the most recent column it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentSegments {
    pub object: ObjectId,
    pub segments: Vec<Segment>,
}

impl RecentSegments {
    pub fn overlaps(&self, seg: &Segment) -> bool {
        self.segments.iter().any(|s| s.overlaps(seg))
    }
}

#[cfg(test)]
mod tests {
    use super::{Object, Segment};

    #[test]
    fn overlap_is_inclusive_and_symmetric() {
        let a = Segment::new(0, 10, 14);
        let b = Segment::new(1, 14, 20);
        let c = Segment::new(1, 15, 20);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn object_tracks_bbox_and_area() {
        let mut o = Object::start(0, Segment::new(5, 10, 12));
        o.push(Segment::new(6, 9, 11));
        o.push(Segment::new(7, 11, 15));
        assert_eq!(o.bbox.width(), 3);
        assert_eq!(o.bbox.height(), 7);
        assert_eq!(o.area(), 3 + 3 + 5);
    }
}
