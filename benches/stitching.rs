use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tts_worker::pipeline::{AudioAggregator, TimelineStitcher};
use tts_worker::synthesis::{RawToken, SynthesisSegment};

/// Build `count` segments of `words` tokens each, 0.3s per word.
fn segments(count: usize, words: usize) -> Vec<SynthesisSegment> {
    (0..count)
        .map(|_| {
            let tokens = (0..words)
                .map(|i| {
                    let start = i as f64 * 0.3;
                    RawToken::timed("word", start, start + 0.3)
                })
                .collect();
            SynthesisSegment::new(vec![0.0; 7200 * words], tokens)
        })
        .collect()
}

fn bench_stitching(c: &mut Criterion) {
    let mut group = c.benchmark_group("stitch_segments");
    for count in [1usize, 10, 100] {
        let input = segments(count, 12);
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| {
                let mut stitcher = TimelineStitcher::new();
                for segment in input {
                    stitcher.consume_segment(black_box(segment));
                }
                black_box(stitcher.into_tokens())
            })
        });
    }
    group.finish();
}

fn bench_aggregation(c: &mut Criterion) {
    let input = segments(20, 12);
    c.bench_function("aggregate_20_segments", |b| {
        b.iter(|| {
            let mut aggregator = AudioAggregator::new();
            for segment in &input {
                aggregator.consume_segment(black_box(segment));
            }
            black_box(aggregator.finalize())
        })
    });
}

criterion_group!(benches, bench_stitching, bench_aggregation);
criterion_main!(benches);
