//! Umbrella crate for the `bandtrack` workspace.
//!
//! Re-exports the image primitives, the 1D signal stage, centerline tracking,
//! object extraction and the scan pipeline. Most callers only need
//! [`scan`], [`ScanConfig`] and [`ScanResult`].

pub use bt_blob::*;
pub use bt_core::*;
pub use bt_scan::*;
pub use bt_signal::*;
pub use bt_track::*;
