use bt_core::{Image, Point};
use bt_scan::{ScanConfig, scan};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn build_striped(width: usize, height: usize, spacing: usize) -> Image<u8> {
    let mut img = Image::from_fn(width, height, |_, y| {
        if y % spacing == 0 { 20u8 } else { 230u8 }
    });
    img.fill_rect(width / 4, height / 2 - spacing - 3, width / 4 + 20, height / 2 - spacing + 3, 20);
    img
}

fn bench_scan(c: &mut Criterion) {
    let img = build_striped(1024, 400, 8);
    let view = img.as_view();
    let endpoints = [Point::new(0.0, 200.0), Point::new(1023.0, 210.0)];

    let cfg = ScanConfig::default();
    c.bench_function("scan_1024_cols", |b| {
        b.iter(|| {
            let out = scan(black_box(&view), &endpoints, &cfg).expect("scan");
            black_box(out.objects.len());
        });
    });

    let serial = ScanConfig {
        parallel: false,
        ..ScanConfig::default()
    };
    c.bench_function("scan_1024_cols_serial", |b| {
        b.iter(|| {
            let out = scan(black_box(&view), &endpoints, &serial).expect("scan");
            black_box(out.objects.len());
        });
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
