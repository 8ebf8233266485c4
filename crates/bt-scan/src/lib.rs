//! Periodic band scanning along a two-point reference segment.
//!
//! [`scan`] walks the image columns spanned by the segment. For every column:
//! - [`SampleExtractor`] reads an `N`-row window centred on the segment;
//! - the window is turned into a gradient, a blurred copy and darkness
//!   values, then the dominant band period/phase is estimated and the
//!   darkest predicted band centres are chosen;
//! - the blurred window is thresholded into "on" runs.
//!
//! The band centres feed the centerline tracker and the runs feed the
//! connected-component extractor, both strictly left to right. The returned
//! [`ScanResult`] holds the primary centerline, classified objects and the
//! per-column estimates. No state survives between scans.
//!
//! Every threshold lives in [`ScanConfig`].

mod config;
mod pipeline;
mod result;
mod sampler;
mod settings;

pub use config::ScanConfig;
pub use pipeline::scan;
pub use result::{Centerline, ColumnDiagnostic, ScanResult};
pub use sampler::SampleExtractor;
pub use settings::{AnnotationSettings, ViewSettings, ViewerSettings, Viewport};
