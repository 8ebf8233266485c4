//! Cross-column centerline tracking.
//!
//! Each scanned column contributes zero or more band centres (absolute rows).
//! [`CenterlineTracker`] links them into [`Track`]s:
//! - every centre goes to the track whose smoothed `last_position` is
//!   nearest, if it lies within the gate;
//! - otherwise it starts a new track;
//! - tracks are never deleted during a scan.
//!
//! Matching is greedy and order dependent. The strategy sits behind
//! [`bt_core::Assigner`] so it can be swapped without touching the tracker.

mod tracker;

pub use tracker::{CenterlineTracker, GreedyNearest, Track, TrackConfig, primary_index};
