use bt_core::{Assigner, Assignment};

use crate::object::{Object, ObjectId, RecentSegments, Segment};

/// First-found overlap matching against the recently active objects.
///
/// A segment joins the first object (in active-list order) whose previous
/// column segments share at least one row with it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapLinker;

impl Assigner<Segment, RecentSegments> for OverlapLinker {
    fn assign(&self, candidates: &[Segment], existing: &[RecentSegments]) -> Vec<Assignment> {
        candidates
            .iter()
            .map(|seg| {
                existing
                    .iter()
                    .position(|r| r.overlaps(seg))
                    .map_or(Assignment::New, Assignment::Existing)
            })
            .collect()
    }
}

/// Links per-column segments into [`Object`]s.
///
/// Only objects matched in the immediately preceding column can be extended.
/// An object that misses one column lapses for good; later overlapping
/// segments start a new object.
#[derive(Debug, Clone, Default)]
pub struct ConnectedComponentExtractor<A = OverlapLinker> {
    linker: A,
    objects: Vec<Object>,
    active: Vec<RecentSegments>,
    last_column: Option<usize>,
}

impl ConnectedComponentExtractor<OverlapLinker> {
    pub fn new() -> Self {
        Self::with_linker(OverlapLinker)
    }
}

impl<A: Assigner<Segment, RecentSegments>> ConnectedComponentExtractor<A> {
    pub fn with_linker(linker: A) -> Self {
        Self {
            linker,
            objects: Vec::new(),
            active: Vec::new(),
            last_column: None,
        }
    }

    pub fn reset(&mut self) {
        self.objects.clear();
        self.active.clear();
        self.last_column = None;
    }

    /// Feed the segments of `column`. Columns must increase; skipping one
    /// ends every active object.
    pub fn push_column(&mut self, column: usize, segments: &[Segment]) {
        if let Some(last) = self.last_column {
            assert!(column > last, "columns must be pushed in increasing order");
            if column != last + 1 {
                self.active.clear();
            }
        }
        self.last_column = Some(column);

        let assignments = self.linker.assign(segments, &self.active);
        debug_assert_eq!(assignments.len(), segments.len());

        let n_active = self.active.len();
        let mut continued: Vec<Vec<Segment>> = vec![Vec::new(); n_active];
        let mut created: Vec<RecentSegments> = Vec::new();

        for (&seg, assignment) in segments.iter().zip(assignments) {
            match assignment {
                Assignment::Existing(i) if i < n_active => {
                    self.objects[self.active[i].object].push(seg);
                    continued[i].push(seg);
                }
                Assignment::Existing(i) if i - n_active < created.len() => {
                    let entry = &mut created[i - n_active];
                    self.objects[entry.object].push(seg);
                    entry.segments.push(seg);
                }
                _ => {
                    let id: ObjectId = self.objects.len();
                    self.objects.push(Object::start(id, seg));
                    created.push(RecentSegments {
                        object: id,
                        segments: vec![seg],
                    });
                }
            }
        }

        let mut next: Vec<RecentSegments> = self
            .active
            .drain(..)
            .zip(continued)
            .filter(|(_, segs)| !segs.is_empty())
            .map(|(prev, segments)| RecentSegments {
                object: prev.object,
                segments,
            })
            .collect();
        next.append(&mut created);
        self.active = next;
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Objects still extendable by the next column, in insertion order.
    pub fn active(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.active.iter().map(|r| r.object)
    }

    pub fn finish(self) -> Vec<Object> {
        self.objects
    }
}
