//! Column-run connected components and half-step classification.
//!
//! Per column the binary mask (`blurred < threshold`) is split into maximal
//! runs ([`Segment`]s). [`ConnectedComponentExtractor`] links the runs of
//! consecutive columns into [`Object`]s by row overlap:
//! - a run joins the first recently active object it overlaps;
//! - unmatched runs start new objects;
//! - an object missing a single column lapses and is never reopened.
//!
//! After the scan, [`classify`] keeps objects whose bounding box fits
//! [`BlobConfig`] and names their offset from the centerline, counted in
//! half wavelengths, through a [`LabelTable`].

mod build;
mod classify;
mod object;
mod segment;

pub use build::{ConnectedComponentExtractor, OverlapLinker};
pub use classify::{
    BlobConfig, CenterlineRef, ClassifiedObject, LabelTable, classify, half_steps,
};
pub use object::{Object, ObjectId, RecentSegments, Segment};
pub use segment::{column_segments, segments_from_mask, threshold_mask};
