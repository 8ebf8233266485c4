/// Outcome of matching one candidate against the live entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    /// Extend the entity at this index.
    ///
    /// Indices `>= existing.len()` refer to entities created by earlier
    /// [`Assignment::New`] entries of the same call, in creation order.
    Existing(usize),
    /// Start a new entity.
    New,
}

/// Matches one column's candidates against the entities alive before it.
///
/// Returns exactly one [`Assignment`] per candidate, in candidate order.
/// Callers apply the assignments in that same order.
pub trait Assigner<C, E> {
    fn assign(&self, candidates: &[C], existing: &[E]) -> Vec<Assignment>;
}
