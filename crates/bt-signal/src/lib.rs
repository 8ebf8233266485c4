//! 1D signal primitives for periodic band scanning.
//!
//! Coordinates follow pixel-center convention: sample `signal[i]` is located
//! at position `i` of the column window.
//!
//! Per column the pipeline is:
//! - [`profile::ProfileBuilder`] derives the intensity gradient, a locally
//!   blurred copy and per-sample darkness.
//! - [`period::WavelengthPhaseEstimator`] measures the dominant wavelength
//!   and the first peak position of the gradient.
//! - [`band::BandLocator`] scores the predicted band centres by darkness and
//!   keeps the best (possibly tied) ones.
//!
//! All thresholds are fixed heuristics carried by the config structs.

pub mod band;
pub mod conv1d;
pub mod kernels1d;
pub mod period;
pub mod profile;
pub mod window;

pub use band::{BandConfig, BandLocator, Candidate};
pub use kernels1d::Kernel1D;
pub use period::{PeriodConfig, PeriodEstimate, WavelengthPhaseEstimator};
pub use profile::{ColumnProfile, Darkness, ProfileBuilder, ProfileConfig};
