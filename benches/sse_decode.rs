use criterion::{criterion_group, criterion_main, Criterion};
use greenroom::core::sse::SseDecoder;

fn build_wire(lines: usize) -> Vec<u8> {
    let mut wire = Vec::new();
    for i in 0..lines {
        wire.extend_from_slice(
            format!("data: {{\"data\":{{\"content\":\"delta number {i} héllo 🦀\"}}}}\n").as_bytes(),
        );
    }
    wire.extend_from_slice(b"data: [DONE]\n");
    wire
}

fn bench_decode(c: &mut Criterion) {
    let wire = build_wire(2_000);

    c.bench_function("decode_single_chunk", |b| {
        b.iter(|| {
            let mut decoder = SseDecoder::new();
            let events = decoder.feed_chunk(std::hint::black_box(&wire));
            decoder.finish();
            events.len()
        })
    });

    c.bench_function("decode_small_chunks", |b| {
        b.iter(|| {
            let mut decoder = SseDecoder::new();
            let mut total = 0;
            for chunk in wire.chunks(113) {
                total += decoder.feed_chunk(std::hint::black_box(chunk)).len();
            }
            decoder.finish();
            total
        })
    });
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
