//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pitchwave::dsp::oscillator::{self, OscillatorBlock};
use pitchwave::dsp::Waveform;

use crate::{NOTE_SECONDS, SAMPLE_RATE};

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &seconds in NOTE_SECONDS {
        let samples = oscillator::sample_count(seconds, SAMPLE_RATE);

        // Whole buffers, as the cache produces them
        for waveform in Waveform::ALL {
            group.bench_with_input(
                BenchmarkId::new(format!("generate_{}", waveform), samples),
                &seconds,
                |b, &seconds| {
                    b.iter(|| {
                        oscillator::generate(
                            black_box(waveform),
                            black_box(440.0),
                            black_box(seconds),
                            SAMPLE_RATE,
                        )
                    })
                },
            );
        }
    }

    // Streaming blocks at device chunk size
    let mut buffer = vec![0.0f32; pitchwave::DEFAULT_CHUNK_SIZE];
    for waveform in Waveform::ALL {
        let mut osc = OscillatorBlock::new(waveform, 440.0, SAMPLE_RATE).unwrap();
        group.bench_with_input(
            BenchmarkId::new(format!("block_{}", waveform), buffer.len()),
            &waveform,
            |b, _| {
                b.iter(|| osc.render(black_box(&mut buffer)));
            },
        );
    }

    group.finish();
}
