use bt_blob::{
    CenterlineRef, ConnectedComponentExtractor, Segment, classify, segments_from_mask,
    threshold_mask,
};
use bt_core::{Error, EstimationFailure, ImageView, Point};
use bt_signal::{
    BandLocator, ColumnProfile, PeriodEstimate, ProfileBuilder, WavelengthPhaseEstimator,
};
use bt_track::{CenterlineTracker, primary_index};

use crate::config::ScanConfig;
use crate::result::{Centerline, ColumnDiagnostic, ScanResult};
use crate::sampler::SampleExtractor;

/// Per-column output of the independent stage.
#[derive(Debug, Clone)]
struct ColumnScan {
    estimate: Result<PeriodEstimate, EstimationFailure>,
    window_top: usize,
    /// Chosen band centres as image rows.
    centers: Vec<f32>,
    segments: Vec<Segment>,
}

/// Buffers reused across the columns handled by one worker.
struct ColumnScratch {
    samples: Vec<f32>,
    profile: ColumnProfile,
    mask: Vec<bool>,
    estimator: WavelengthPhaseEstimator,
}

impl ColumnScratch {
    fn new(cfg: &ScanConfig) -> Self {
        Self {
            samples: Vec::with_capacity(cfg.samples_per_column),
            profile: ColumnProfile::default(),
            mask: Vec::with_capacity(cfg.samples_per_column),
            estimator: WavelengthPhaseEstimator::new(&cfg.period),
        }
    }
}

struct ColumnStage<'a> {
    sampler: &'a SampleExtractor,
    builder: ProfileBuilder,
    locator: BandLocator,
    threshold: f32,
    height: usize,
}

impl ColumnStage<'_> {
    fn run<T: Copy + Into<f32>>(
        &self,
        img: &ImageView<'_, T>,
        scratch: &mut ColumnScratch,
        x: usize,
    ) -> ColumnScan {
        let window_top = self.sampler.extract(img, x, &mut scratch.samples);
        self.builder.build_into(&scratch.samples, &mut scratch.profile);
        let profile = &scratch.profile;

        // Rows past the bottom edge only exist through border handling.
        let rows = self.height.saturating_sub(window_top).min(scratch.samples.len());

        threshold_mask(&profile.blurred[..rows], self.threshold, &mut scratch.mask);
        let mut segments = Vec::new();
        segments_from_mask(x, window_top, &scratch.mask, &mut segments);

        let estimate = scratch.estimator.estimate(&profile.gradient);
        let centers = match &estimate {
            Ok(e) => self
                .locator
                .locate(e, &profile.darkness)
                .into_iter()
                .filter(|c| c.position < rows)
                .map(|c| (window_top + c.position) as f32)
                .collect(),
            Err(_) => Vec::new(),
        };

        ColumnScan {
            estimate,
            window_top,
            centers,
            segments,
        }
    }
}

/// Scan `img` along the segment between the first two `endpoints`.
///
/// The per-column stage (sampling, profile, period estimate, band centres,
/// mask runs) is independent across columns and runs on the rayon pool when
/// the `parallel` feature and [`ScanConfig::parallel`] are on. Tracking and
/// object linking then consume the columns strictly left to right.
///
/// Columns whose estimate fails contribute no centres and no diagnostic; they
/// do not fail the scan.
pub fn scan<T>(
    img: &ImageView<'_, T>,
    endpoints: &[Point],
    cfg: &ScanConfig,
) -> Result<ScanResult, Error>
where
    T: Copy + Into<f32> + Sync,
{
    cfg.validate()?;
    let sampler = SampleExtractor::new(endpoints, cfg.samples_per_column, cfg.border)?;
    if img.is_empty() {
        return Err(Error::EmptyImage);
    }

    let Some((first, last)) = sampler.column_span(img.width()) else {
        log::warn!("reference segment misses the {}-column image", img.width());
        return Ok(ScanResult::empty(0));
    };
    let columns = last - first + 1;
    log::debug!(
        "scanning columns {first}..={last} with {}-sample windows",
        cfg.samples_per_column
    );

    let stage = ColumnStage {
        sampler: &sampler,
        builder: ProfileBuilder::new(&cfg.profile),
        locator: BandLocator::new(&cfg.band),
        threshold: cfg.blob.threshold,
        height: img.height(),
    };
    let work = run_columns(img, &stage, cfg, first, last);

    let mut tracker = CenterlineTracker::new(&cfg.track, columns);
    let mut extractor = ConnectedComponentExtractor::new();
    let mut diagnostics = Vec::with_capacity(columns);
    let mut failed = 0usize;

    for (offset, col) in work.iter().enumerate() {
        let x = first + offset;
        match &col.estimate {
            Ok(e) => {
                tracker.push_column(offset, &col.centers, e.wavelength);
                diagnostics.push(Some(ColumnDiagnostic {
                    wavelength: e.wavelength,
                    first_peak_position: e.first_peak_position,
                    window_top: col.window_top,
                }));
            }
            Err(reason) => {
                log::debug!("column {x}: {reason}");
                failed += 1;
                diagnostics.push(None);
            }
        }
        extractor.push_column(x, &col.segments);
    }
    if failed > 0 {
        log::debug!("{failed} of {columns} columns had no period estimate");
    }

    let tracks = tracker.into_tracks();
    let centerline = primary_index(&tracks).and_then(|i| {
        let t = &tracks[i];
        t.mean_width().map(|mean_wavelength| Centerline {
            rows: t.center_positions.clone(),
            mean_wavelength,
            track: i,
        })
    });

    let objects = extractor.finish();
    let centerline_ref = centerline.as_ref().map(|c| CenterlineRef {
        first_column: first,
        rows: &c.rows,
        wavelength: c.mean_wavelength,
    });
    let classified = classify(&objects, &cfg.blob, &cfg.labels, centerline_ref.as_ref());

    log::debug!(
        "{} tracks, primary length {}, {} raw objects, {} kept",
        tracks.len(),
        centerline
            .as_ref()
            .map_or(0, |c| c.rows.iter().flatten().count()),
        objects.len(),
        classified.len()
    );

    Ok(ScanResult {
        first_column: first,
        columns,
        centerline,
        tracks,
        objects: classified,
        diagnostics,
    })
}

#[cfg(feature = "parallel")]
fn run_columns<T>(
    img: &ImageView<'_, T>,
    stage: &ColumnStage<'_>,
    cfg: &ScanConfig,
    first: usize,
    last: usize,
) -> Vec<ColumnScan>
where
    T: Copy + Into<f32> + Sync,
{
    use rayon::prelude::*;

    if !cfg.parallel {
        return run_columns_serial(img, stage, cfg, first, last);
    }
    (first..=last)
        .into_par_iter()
        .map_init(
            || ColumnScratch::new(cfg),
            |scratch, x| stage.run(img, scratch, x),
        )
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_columns<T>(
    img: &ImageView<'_, T>,
    stage: &ColumnStage<'_>,
    cfg: &ScanConfig,
    first: usize,
    last: usize,
) -> Vec<ColumnScan>
where
    T: Copy + Into<f32> + Sync,
{
    run_columns_serial(img, stage, cfg, first, last)
}

fn run_columns_serial<T: Copy + Into<f32>>(
    img: &ImageView<'_, T>,
    stage: &ColumnStage<'_>,
    cfg: &ScanConfig,
    first: usize,
    last: usize,
) -> Vec<ColumnScan> {
    let mut scratch = ColumnScratch::new(cfg);
    (first..=last)
        .map(|x| stage.run(img, &mut scratch, x))
        .collect()
}

#[cfg(test)]
mod tests {
    use bt_core::{ConfigError, Error, Image, Point};

    use super::scan;
    use crate::config::ScanConfig;

    fn striped(width: usize, height: usize, spacing: usize, first: usize) -> Image<u8> {
        Image::from_fn(width, height, |_, y| {
            if y >= first && (y - first) % spacing == 0 {
                20
            } else {
                230
            }
        })
    }

    fn endpoints(width: usize, row: f32) -> [Point; 2] {
        [Point::new(0.0, row), Point::new((width - 1) as f32, row)]
    }

    #[test]
    fn one_endpoint_is_a_configuration_error() {
        let img = striped(10, 100, 8, 2);
        let err = scan(&img.as_view(), &[Point::new(0.0, 50.0)], &ScanConfig::default())
            .expect_err("one endpoint");
        assert_eq!(
            err,
            Error::Configuration(ConfigError::NotEnoughEndpoints { placed: 1 })
        );
    }

    #[test]
    fn empty_image_is_rejected() {
        let img: Image<u8> = Image::from_fn(0, 0, |_, _| 0);
        let err = scan(&img.as_view(), &endpoints(10, 5.0), &ScanConfig::default())
            .expect_err("empty");
        assert_eq!(err, Error::EmptyImage);
    }

    #[test]
    fn flat_image_degrades_to_empty_sets() {
        let img = Image::new_fill(12, 100, 200u8);
        let out = scan(&img.as_view(), &endpoints(12, 50.0), &ScanConfig::default())
            .expect("scan");
        assert_eq!(out.columns, 12);
        assert!(out.tracks.is_empty());
        assert!(out.centerline.is_none());
        assert!(out.objects.is_empty());
        assert!(out.diagnostics.iter().all(Option::is_none));
    }

    #[test]
    fn stripes_give_one_full_length_centerline() {
        let img = striped(16, 100, 8, 2);
        let out = scan(&img.as_view(), &endpoints(16, 50.0), &ScanConfig::default())
            .expect("scan");

        let cl = out.centerline.expect("centerline");
        assert_eq!(cl.rows.iter().flatten().count(), 16);
        assert!((cl.mean_wavelength - 8.0).abs() < 0.5);
        for row in cl.rows.iter().flatten() {
            let r = row.round() as usize;
            assert_eq!((r + 8 - 2) % 8, 0, "row {row} is not on a line");
        }
        assert!(out.diagnostics.iter().all(Option::is_some));
    }

    #[test]
    fn serial_and_parallel_agree() {
        let img = striped(20, 100, 10, 5);
        let mut cfg = ScanConfig::default();
        let par = scan(&img.as_view(), &endpoints(20, 48.0), &cfg).expect("scan");
        cfg.parallel = false;
        let ser = scan(&img.as_view(), &endpoints(20, 48.0), &cfg).expect("scan");
        assert_eq!(par, ser);
    }

    #[test]
    fn reversed_endpoints_scan_the_same_span() {
        let img = striped(20, 100, 8, 2);
        let cfg = ScanConfig::default();
        let [a, b] = endpoints(20, 50.0);
        let fwd = scan(&img.as_view(), &[a, b], &cfg).expect("scan");
        let rev = scan(&img.as_view(), &[b, a], &cfg).expect("scan");
        assert_eq!(fwd, rev);
    }

    #[test]
    fn segment_outside_image_yields_empty_result() {
        let img = striped(10, 100, 8, 2);
        let eps = [Point::new(20.0, 50.0), Point::new(30.0, 50.0)];
        let out = scan(&img.as_view(), &eps, &ScanConfig::default()).expect("scan");
        assert_eq!(out.columns, 0);
        assert!(out.diagnostics.is_empty());
    }
}
