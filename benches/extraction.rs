use bitplane_stego::analysis::detect_steganography;
use bitplane_stego::extraction::Extractor;
use bitplane_stego::ingest::{Decoder, Raster};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn generate_gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x + y) % 256) as u8,
            ((x * 3) % 256) as u8,
            ((y * 7) % 256) as u8,
        ])
    })
}

fn benchmark_extraction_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("extraction_by_size");

    let sizes = vec![
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ];

    for (width, height, label) in sizes {
        let raster = Raster::from_rgb_image(generate_gradient(width, height))
            .expect("valid gradient raster");

        group.bench_with_input(BenchmarkId::from_parameter(label), &raster, |b, raster| {
            let extractor = Extractor::new();
            b.iter(|| extractor.process(black_box(raster)));
        });
    }

    group.finish();
}

fn benchmark_detection(c: &mut Criterion) {
    let raster = Raster::from_rgb_image(generate_gradient(500, 500)).expect("valid gradient raster");
    let extraction = Extractor::new()
        .process(&raster)
        .expect("extraction succeeds");

    c.bench_function("detect_500x500", |b| {
        b.iter(|| detect_steganography(black_box(&extraction.lsb)));
    });
}

fn benchmark_decode_png(c: &mut Criterion) {
    let mut encoded = Cursor::new(Vec::new());
    generate_gradient(500, 500)
        .write_to(&mut encoded, ImageFormat::Png)
        .expect("png encoding succeeds");
    let encoded = encoded.into_inner();

    c.bench_function("decode_png_500x500", |b| {
        let decoder = Decoder::default();
        b.iter(|| decoder.decode(black_box(&encoded)));
    });
}

criterion_group!(
    benches,
    benchmark_extraction_sizes,
    benchmark_detection,
    benchmark_decode_png
);
criterion_main!(benches);
