//! Benchmarks for the note buffer cache.
//!
//! A hit should cost a lock and an Arc clone, whatever the note length.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pitchwave::dsp::Waveform;
use pitchwave::sequencing::{NoteClass, Pitch};
use pitchwave::synth::BufferCache;

use crate::{NOTE_SECONDS, SAMPLE_RATE};

pub fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/cache");
    let pitch = Pitch::new(NoteClass::C, 4);

    for &seconds in NOTE_SECONDS {
        // Every iteration regenerates
        group.bench_with_input(BenchmarkId::new("miss", seconds), &seconds, |b, &seconds| {
            let cache = BufferCache::unbounded();
            b.iter(|| {
                cache.clear();
                cache.get_or_generate(black_box(pitch), Waveform::Sine, seconds, SAMPLE_RATE)
            })
        });

        let cache = BufferCache::unbounded();
        let _ = cache.get_or_generate(pitch, Waveform::Sine, seconds, SAMPLE_RATE);
        group.bench_with_input(BenchmarkId::new("hit", seconds), &seconds, |b, &seconds| {
            b.iter(|| cache.get_or_generate(black_box(pitch), Waveform::Sine, seconds, SAMPLE_RATE))
        });
    }

    // Bounded cache cycling through more keys than it holds
    let cache = BufferCache::with_capacity(8);
    let pitches: Vec<Pitch> = (0..12).map(|i| pitch.transpose(i)).collect();
    group.bench_function("evicting_12_of_8", |b| {
        b.iter(|| {
            for &p in &pitches {
                let _ = cache.get_or_generate(black_box(p), Waveform::Square, 0.05, SAMPLE_RATE);
            }
        })
    });

    group.finish();
}
