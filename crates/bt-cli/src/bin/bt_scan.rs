use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use bt_core::{Image, Point};
use bt_scan::{SampleExtractor, ScanConfig, ScanResult, ViewerSettings, scan};
use bt_signal::{BandLocator, ProfileBuilder, WavelengthPhaseEstimator};
use clap::{Args, Parser, Subcommand};
use image::{GrayImage, Rgb, RgbImage};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "bt_scan")]
#[command(about = "Scan periodic dark bands along a reference segment")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full scan: centerline, objects and per-column estimates.
    #[command(name = "scan")]
    Scan(ScanArgs),
    /// Cross-section and estimate of a single column.
    #[command(name = "profile")]
    Profile(ProfileArgs),
}

#[derive(Args, Debug, Clone)]
struct ScanArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    /// Viewer settings document holding the reference points.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// First reference point as `x,y`; overrides the settings.
    #[arg(long, value_parser = parse_point, requires = "p1")]
    p0: Option<Point>,
    /// Second reference point as `x,y`.
    #[arg(long, value_parser = parse_point, requires = "p0")]
    p1: Option<Point>,
    /// Scan configuration document; defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Run the per-column stage on one thread.
    #[arg(long, default_value_t = false)]
    serial: bool,
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Args, Debug, Clone)]
struct ProfileArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, required = true)]
    column: usize,
    /// Row the window is centred on.
    #[arg(long, required = true)]
    row: f32,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
struct CandidateDto {
    row: usize,
    score: f32,
}

#[derive(Debug, Clone, Serialize)]
struct ProfileEstimateDto {
    column: usize,
    window_top: usize,
    wavelength: Option<f32>,
    first_peak_position: Option<f32>,
    failure: Option<String>,
    chosen: Vec<CandidateDto>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Command::Scan(args) => run_scan(args),
        Command::Profile(args) => run_profile(args),
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let img = load_input_u8(&args.input)?;
    let mut cfg = load_config(args.config.as_deref())?;
    if args.serial {
        cfg.parallel = false;
    }

    let endpoints = match (args.p0, args.p1, &args.settings) {
        (Some(p0), Some(p1), _) => vec![p0, p1],
        (_, _, Some(path)) => {
            ensure_file_exists(path, "settings")?;
            let settings = ViewerSettings::load(path)
                .with_context(|| format!("loading settings {}", path.display()))?;
            settings.endpoints().to_vec()
        }
        _ => ViewerSettings::default().endpoints().to_vec(),
    };
    log::info!(
        "scanning {} ({}x{}) between {:?}",
        args.input.display(),
        img.width(),
        img.height(),
        endpoints
    );

    let result = scan(&img.as_view(), &endpoints, &cfg).context("running scan")?;

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output dir {}", args.out.display()))?;
    write_json(args.out.join("result.json"), &result)?;
    render_scan_overlay(&img, &result, cfg.samples_per_column)?
        .save(args.out.join("overlay.png"))
        .context("writing overlay.png")?;

    print_summary(&result);
    Ok(())
}

fn run_profile(args: ProfileArgs) -> Result<()> {
    let img = load_input_u8(&args.input)?;
    let cfg = load_config(args.config.as_deref())?;
    if args.column >= img.width() {
        bail!(
            "column {} is outside the {}-column image",
            args.column,
            img.width()
        );
    }

    let at = Point::new(args.column as f32, args.row);
    let sampler = SampleExtractor::new(&[at, at], cfg.samples_per_column, cfg.border)?;
    let mut samples = Vec::new();
    let top = sampler.extract(&img.as_view(), args.column, &mut samples);

    let profile = ProfileBuilder::new(&cfg.profile).build(&samples);
    let mut estimator = WavelengthPhaseEstimator::new(&cfg.period);
    let estimate = estimator.estimate(&profile.gradient);
    let chosen = match &estimate {
        Ok(e) => BandLocator::new(&cfg.band)
            .locate(e, &profile.darkness)
            .into_iter()
            .map(|c| CandidateDto {
                row: top + c.position,
                score: c.score,
            })
            .collect(),
        Err(_) => Vec::new(),
    };

    fs::create_dir_all(&args.out)
        .with_context(|| format!("creating output dir {}", args.out.display()))?;
    write_profile_csv(args.out.join("profile.csv"), top, &samples, &profile)?;
    write_json(
        args.out.join("estimate.json"),
        &ProfileEstimateDto {
            column: args.column,
            window_top: top,
            wavelength: estimate.as_ref().ok().map(|e| e.wavelength),
            first_peak_position: estimate.as_ref().ok().map(|e| e.first_peak_position),
            failure: estimate.as_ref().err().map(|f| f.to_string()),
            chosen,
        },
    )?;

    match estimate {
        Ok(e) => println!(
            "column {}: wavelength {:.2}, first peak {:.2} (window top {top})",
            args.column, e.wavelength, e.first_peak_position
        ),
        Err(f) => println!("column {}: {f}", args.column),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(p) => {
            ensure_file_exists(p, "config")?;
            ScanConfig::load_json(p).with_context(|| format!("loading config {}", p.display()))
        }
        None => Ok(ScanConfig::default()),
    }
}

fn parse_point(s: &str) -> std::result::Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok(Point::new(x, y))
}

fn print_summary(result: &ScanResult) {
    println!(
        "columns {}..{}: {} tracks",
        result.first_column,
        result.first_column + result.columns,
        result.tracks.len()
    );
    match &result.centerline {
        Some(cl) => println!(
            "centerline: {} of {} columns, mean wavelength {:.2}",
            cl.rows.iter().flatten().count(),
            result.columns,
            cl.mean_wavelength
        ),
        None => println!("centerline: none"),
    }
    for o in &result.objects {
        println!(
            "object at ({:.1}, {:.1}) {}x{}: {}",
            o.center.x,
            o.center.y,
            o.bbox.width(),
            o.bbox.height(),
            o.label.as_deref().unwrap_or("-")
        );
    }
}

fn load_input_u8(path: &Path) -> Result<Image<u8>> {
    ensure_file_exists(path, "input")?;
    let dyn_img =
        image::open(path).with_context(|| format!("opening input image {}", path.display()))?;
    let luma = dyn_img.to_luma8();
    let (w, h) = luma.dimensions();
    let data = luma.into_raw();

    Image::from_vec(w as usize, h as usize, data)
        .with_context(|| format!("constructing image from {}", path.display()))
}

fn write_json(path: PathBuf, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(&path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn write_profile_csv(
    path: PathBuf,
    top: usize,
    samples: &[f32],
    profile: &bt_signal::ColumnProfile,
) -> Result<()> {
    let mut file =
        fs::File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    writeln!(file, "index,row,value,gradient,blurred,darkness").context("writing csv header")?;
    for (i, v) in samples.iter().enumerate() {
        writeln!(
            file,
            "{i},{},{v},{},{},{}",
            top + i,
            profile.gradient[i],
            profile.blurred[i],
            profile.darkness[i]
        )
        .context("writing csv row")?;
    }
    Ok(())
}

fn render_scan_overlay(input: &Image<u8>, result: &ScanResult, window: usize) -> Result<RgbImage> {
    let gray = GrayImage::from_raw(
        input.width() as u32,
        input.height() as u32,
        input.data().to_vec(),
    )
    .context("constructing GrayImage from raw bytes")?;
    let mut rgb = image::DynamicImage::ImageLuma8(gray).to_rgb8();

    for (offset, d) in result.diagnostics.iter().enumerate() {
        let Some(d) = d else { continue };
        let x = (result.first_column + offset) as u32;
        for y in d.band_rows(window) {
            put(&mut rgb, x as i64, y.round() as i64, Rgb([64, 128, 255]));
        }
    }

    for o in &result.objects {
        let b = o.bbox;
        draw_rect(
            &mut rgb,
            b.min_col as i64,
            b.min_y as i64,
            b.max_col as i64,
            b.max_y as i64,
            Rgb([64, 220, 64]),
        );
    }

    if let Some(cl) = &result.centerline {
        for (x, y) in cl.points(result.first_column) {
            draw_dot(&mut rgb, x as f32, y, Rgb([255, 64, 64]));
        }
    }

    Ok(rgb)
}

fn put(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 {
        return;
    }
    img.put_pixel(x as u32, y as u32, color);
}

fn draw_dot(img: &mut RgbImage, x: f32, y: f32, color: Rgb<u8>) {
    let xi = x.round() as i64;
    let yi = y.round() as i64;
    for dy in -1..=1 {
        for dx in -1..=1 {
            put(img, xi + dx, yi + dy, color);
        }
    }
}

fn draw_rect(img: &mut RgbImage, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgb<u8>) {
    for x in x0..=x1 {
        put(img, x, y0, color);
        put(img, x, y1, color);
    }
    for y in y0..=y1 {
        put(img, x0, y, color);
        put(img, x1, y, color);
    }
}

fn ensure_file_exists(path: &Path, what: &str) -> Result<()> {
    if !path.exists() {
        bail!("{} file does not exist: {}", what, path.display());
    }
    if !path.is_file() {
        bail!("{} path is not a file: {}", what, path.display());
    }
    Ok(())
}
