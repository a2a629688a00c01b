//! Benchmarks for the per-frame hot path
//!
//! - Filtering and extracting the stream key and rolling counter
//! - Classifying frames through the engine with many interleaved streams

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use svsi_analyser::ContinuityEngine;
use svsi_analyser::svsi::{extract, filter};
use svsi_analyser::test_utils::SvsiFrameBuilder;

/// Interleaved frames for `streams` streams, one full counter cycle each
fn interleaved_frames(streams: u8) -> Vec<Vec<u8>> {
    let mut frames = Vec::with_capacity(usize::from(streams) * 256);
    for rolling in 0..=255u8 {
        for stream in 0..streams {
            frames.push(SvsiFrameBuilder::new([239, 0, 1, stream]).rolling(rolling).build());
        }
    }
    frames
}

fn bench_decode(c: &mut Criterion) {
    let frame = SvsiFrameBuilder::new([239, 0, 0, 1]).rolling(7).payload_len(1316).build();

    let mut group = c.benchmark_group("svsi_decode");
    group.throughput(Throughput::Elements(1));
    group.bench_function("filter_and_extract", |b| {
        b.iter(|| {
            let offset = filter(black_box(&frame)).expect("qualifying frame");
            black_box(extract(&frame, offset).expect("complete frame"))
        })
    });
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_process");

    for streams in [1u8, 16, 128] {
        let frames = interleaved_frames(streams);
        group.throughput(Throughput::Elements(frames.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(streams), &frames, |b, frames| {
            b.iter(|| {
                let mut engine = ContinuityEngine::new();
                for frame in frames {
                    black_box(engine.process(frame).expect("complete frame"));
                }
                black_box(engine.frames_classified())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_decode, bench_engine);
criterion_main!(benches);
