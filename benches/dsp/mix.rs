//! Benchmarks for chord mixing.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pitchwave::dsp::{mix, oscillator, MixMode, SampleBuffer, Waveform};

use crate::SAMPLE_RATE;

fn chord_buffers(notes: usize) -> Vec<SampleBuffer> {
    (0..notes)
        .filter_map(|i| {
            let frequency = 220.0 * 2f64.powf(i as f64 * 4.0 / 12.0);
            oscillator::generate(Waveform::Sine, frequency, 0.5, SAMPLE_RATE).ok()
        })
        .collect()
}

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for notes in [2, 3, 6] {
        let buffers = chord_buffers(notes);

        group.bench_with_input(BenchmarkId::new("sum", notes), &buffers, |b, buffers| {
            b.iter(|| mix::mix_with(black_box(buffers), MixMode::Sum))
        });

        group.bench_with_input(BenchmarkId::new("average", notes), &buffers, |b, buffers| {
            b.iter(|| mix::mix_with(black_box(buffers), MixMode::Average))
        });
    }

    // Raw accumulate, no allocation
    let a = chord_buffers(1).remove(0);
    let mut acc = vec![0.0f32; a.len()];
    group.bench_function("sum_in_place", |b| {
        b.iter(|| mix::sum_in_place(black_box(&mut acc), black_box(&a)))
    });

    group.finish();
}
