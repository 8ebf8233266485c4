//! Foundational primitives for periodic band scanning.
//!
//! ## Image Views and Stride
//! Images use element stride (not byte stride). `stride` is the distance, in
//! elements, between adjacent row starts and may be greater than `width`.
//! Views borrow padded buffers without copying.
//!
//! ## Coordinates
//! Columns are `x`, rows are `y`, and rows grow downwards. "Above" a
//! reference row therefore means a smaller `y`.
//!
//! ## Border Modes
//! Column sampling supports clamp, constant fill, and reflect-101 behavior.
//! Clamp is the default for scans: out-of-image rows saturate to the nearest
//! edge row instead of failing.
//!
//! ## Matching
//! [`Assigner`] is the narrow interface behind which cross-column matching
//! strategies (track and object linking) are expressed.

mod assign;
mod border;
mod error;
mod geom;
mod image;
mod sample;

pub use assign::{Assigner, Assignment};
pub use border::{BorderMode, map_index};
pub use error::{ConfigError, Error, EstimationFailure};
pub use geom::{BoundingBox, Point};
pub use image::{Image, ImageView};
pub use sample::sample_column_f32;
