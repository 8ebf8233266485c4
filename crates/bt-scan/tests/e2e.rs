use bt_core::{Image, Point};
use bt_scan::{ScanConfig, scan};

const WIDTH: usize = 30;
const HEIGHT: usize = 100;
const LINES: [usize; 5] = [34, 42, 50, 58, 66];
const SPACING: usize = 8;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Five dark lines on a light background with an optional dark 20x7 block
/// centred `spacings` line spacings above the middle line.
fn synthetic(spacings: Option<usize>) -> Image<u8> {
    let mut img = Image::new_fill(WIDTH, HEIGHT, 230u8);
    for &y in &LINES {
        img.fill_rect(0, y, WIDTH - 1, y, 20);
    }
    if let Some(k) = spacings {
        let cy = LINES[2] - k * SPACING;
        img.fill_rect(5, cy - 3, 24, cy + 3, 20);
    }
    img
}

fn endpoints() -> [Point; 2] {
    [Point::new(0.0, 50.0), Point::new((WIDTH - 1) as f32, 50.0)]
}

#[test]
fn centerline_follows_the_middle_line() {
    init_logger();
    let img = synthetic(None);
    let out = scan(&img.as_view(), &endpoints(), &ScanConfig::default()).expect("scan");

    assert_eq!(out.first_column, 0);
    assert_eq!(out.columns, WIDTH);
    let cl = out.centerline.expect("primary centerline");
    assert_eq!(cl.rows.iter().flatten().count(), WIDTH);
    for row in cl.rows.iter().flatten() {
        assert!((row - LINES[2] as f32).abs() <= 1.0, "row {row}");
    }
    assert!((cl.mean_wavelength - SPACING as f32).abs() < 0.4);
    assert!(out.objects.is_empty());

    for d in out.diagnostics.iter().flatten() {
        let rows = d.band_rows(100);
        assert!(rows.iter().any(|r| (r - 50.0).abs() < 1.0));
    }
}

#[test]
fn block_one_spacing_above_is_two_half_steps_up() {
    init_logger();
    let img = synthetic(Some(1));
    let cfg = ScanConfig::default();
    let out = scan(&img.as_view(), &endpoints(), &cfg).expect("scan");

    let cl = out.centerline.as_ref().expect("primary centerline");
    assert!(
        cl.rows
            .iter()
            .flatten()
            .all(|r| (r - LINES[2] as f32).abs() <= 1.0)
    );

    assert_eq!(out.objects.len(), 1);
    let obj = &out.objects[0];
    assert!(obj.bbox.width().abs_diff(20) <= 1);
    assert!(obj.bbox.height().abs_diff(7) <= 1);
    assert!((obj.center.y - 42.0).abs() <= 1.0);
    assert_eq!(obj.offset_steps, Some(2));
    assert_eq!(obj.label.as_deref(), cfg.labels.label(2));
    assert_eq!(obj.label.as_deref(), Some("D5"));
}

#[test]
fn block_two_spacings_above_is_four_half_steps_up() {
    init_logger();
    let img = synthetic(Some(2));
    let cfg = ScanConfig::default();
    let out = scan(&img.as_view(), &endpoints(), &cfg).expect("scan");

    assert_eq!(out.objects.len(), 1);
    let obj = &out.objects[0];
    assert_eq!(obj.offset_steps, Some(4));
    assert_eq!(obj.label.as_deref(), cfg.labels.label(4));
    assert_eq!(obj.label.as_deref(), Some("F5"));
}

#[test]
fn result_serializes_to_json() {
    let img = synthetic(Some(1));
    let out = scan(&img.as_view(), &endpoints(), &ScanConfig::default()).expect("scan");
    let json = out.to_json_string().expect("serialize");
    let v: serde_json::Value = serde_json::from_str(&json).expect("json");
    assert_eq!(v["columns"], WIDTH);
    assert_eq!(v["objects"][0]["label"], "D5");
}
