//! Benchmarks for wind encoding and PNG output.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use test_utils::vortex_field;
use wind_codec::EncodedImage;
use wind_common::EncodingRange;

fn bench_encode(c: &mut Criterion) {
    let field = vortex_field(0.0, 0.0, 1.0, 1024, 1024, 45.0);
    let range = EncodingRange::default();

    c.bench_function("encode_1024", |b| {
        b.iter(|| {
            EncodedImage::encode(
                1024,
                1024,
                black_box(&field.u),
                black_box(&field.v),
                None,
                &range,
            )
        })
    });

    let image = EncodedImage::encode(1024, 1024, &field.u, &field.v, None, &range).unwrap();
    c.bench_function("png_1024", |b| b.iter(|| black_box(&image).to_png()));
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
