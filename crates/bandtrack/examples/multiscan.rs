//! Example: band scanning on a multi-snap image.
//!
//! Loads a horizontally-merged PNG of N equal-width frames, views each snap
//! in place through a strided view, and runs `scan` on each along a
//! horizontal reference segment at `--row`. Without an input file a synthetic snap with five dark
//! lines and one dark block is generated instead.
//!
//! Results are written to a JSON file; per-snap and total timing is printed.
//!
//! Run from the workspace root:
//!   cargo run -p bandtrack --example multiscan -- --help
//!   cargo run -p bandtrack --example multiscan -- --input data/bands.png --n-snaps 4

use std::time::Instant;

use anyhow::{Context, Result, bail};
use bandtrack::{ClassifiedObject, Image, ImageView, Point, ScanConfig, scan};
use clap::Parser;
use image::ImageReader;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "Scan periodic bands in a horizontally-merged multi-snap image")]
struct Args {
    /// Path to the merged PNG; a synthetic snap is used when omitted
    #[arg(long)]
    input: Option<String>,

    /// Number of equal-width snaps merged in the image
    #[arg(long, default_value_t = 1)]
    n_snaps: usize,

    /// Row of the horizontal reference segment (default: mid-height)
    #[arg(long)]
    row: Option<f32>,

    /// Output JSON path
    #[arg(long, default_value = "multiscan_results.json")]
    out: String,
}

#[derive(Serialize)]
struct SnapResult {
    snap: usize,
    /// Wall-clock time for this snap's scan, in milliseconds.
    elapsed_ms: f64,
    centerline: Vec<Option<f32>>,
    mean_wavelength: Option<f32>,
    objects: Vec<ClassifiedObject>,
}

/// Strided view of one snap (column slice) inside the merged buffer.
fn snap_view(
    pixels: &[u8],
    full_width: usize,
    height: usize,
    snap_w: usize,
    snap_idx: usize,
) -> Result<ImageView<'_, u8>> {
    let offset = snap_idx * snap_w;
    let tail = pixels.get(offset..).context("snap offset past the buffer")?;
    ImageView::from_slice(snap_w, height, full_width, tail)
        .with_context(|| format!("viewing snap {snap_idx}"))
}

fn synthetic_snap() -> Image<u8> {
    let mut img = Image::new_fill(60, 100, 230u8);
    for y in [34, 42, 50, 58, 66] {
        img.fill_rect(0, y, 59, y, 20);
    }
    img.fill_rect(20, 39, 39, 45, 20);
    img
}

fn load_merged(path: &str) -> Result<(Vec<u8>, usize, usize)> {
    let gray = ImageReader::open(path)
        .with_context(|| format!("opening {path}"))?
        .decode()
        .with_context(|| format!("decoding {path}"))?
        .into_luma8();
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    Ok((gray.into_raw(), w, h))
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.n_snaps == 0 {
        bail!("n_snaps must be > 0");
    }

    let (pixels, full_width, height, n_snaps) = match &args.input {
        Some(path) => {
            let (px, w, h) = load_merged(path)?;
            (px, w, h, args.n_snaps)
        }
        None => {
            let img = synthetic_snap();
            (img.data().to_vec(), img.width(), img.height(), 1)
        }
    };
    if full_width % n_snaps != 0 {
        bail!("image width {full_width} is not divisible by n_snaps={n_snaps}");
    }
    let snap_w = full_width / n_snaps;
    let row = args.row.unwrap_or(0.5 * height as f32);

    println!("{full_width}x{height}, {n_snaps} snaps of {snap_w}x{height}, segment at row {row:.1}");

    let cfg = ScanConfig::default();
    let mut results: Vec<SnapResult> = Vec::with_capacity(n_snaps);
    let total_start = Instant::now();

    for snap_idx in 0..n_snaps {
        let snap = snap_view(&pixels, full_width, height, snap_w, snap_idx)?;
        let endpoints = [Point::new(0.0, row), Point::new((snap_w - 1) as f32, row)];

        let t0 = Instant::now();
        let result = scan(&snap, &endpoints, &cfg)
            .with_context(|| format!("scanning snap {snap_idx}"))?;
        let elapsed_ms = t0.elapsed().as_secs_f64() * 1e3;

        let labels: Vec<&str> = result
            .objects
            .iter()
            .map(|o| o.label.as_deref().unwrap_or("-"))
            .collect();
        println!(
            "  snap {snap_idx}: {} objects {labels:?}  ({elapsed_ms:.2} ms)",
            result.objects.len()
        );

        results.push(SnapResult {
            snap: snap_idx,
            elapsed_ms,
            mean_wavelength: result.centerline.as_ref().map(|c| c.mean_wavelength),
            centerline: result.centerline.map(|c| c.rows).unwrap_or_default(),
            objects: result.objects,
        });
    }

    let total_ms = total_start.elapsed().as_secs_f64() * 1e3;
    println!("total scan time: {total_ms:.2} ms");

    let out_file =
        std::fs::File::create(&args.out).with_context(|| format!("creating {}", args.out))?;
    serde_json::to_writer_pretty(out_file, &results)
        .with_context(|| format!("writing JSON to {}", args.out))?;

    println!("results written to {}", args.out);
    Ok(())
}
