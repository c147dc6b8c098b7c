//! Benchmarks for whole-sequence playback into memory.

use std::hint::black_box;
use std::sync::Arc;

use criterion::Criterion;
use pitchwave::engine::Sequencer;
use pitchwave::io::RecordingOutput;
use pitchwave::sequencing::{NoteClass, Pitch, Sequence};
use pitchwave::synth::Synth;
use pitchwave::EngineConfig;

use crate::SAMPLE_RATE;

fn progression() -> Sequence {
    let triad = |root: Pitch| [root, root.transpose(4), root.transpose(7)];
    let c = Pitch::new(NoteClass::C, 4);
    Sequence::builder()
        .note(c, 0.25)
        .note(c.transpose(2), 0.25)
        .note(c.transpose(4), 0.25)
        .wait(0.1)
        .chord(&triad(c), 0.5)
        .chord(&triad(c.transpose(5)), 0.5)
        .chord(&triad(c.transpose(7)), 0.5)
        .chord(&triad(c), 0.5)
        .hold()
        .wait(0.5)
        .build()
        .unwrap()
}

pub fn bench_playback(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/playback");
    let sequence = progression();
    let config = EngineConfig::default().sample_rate(SAMPLE_RATE);

    // Fresh synth each time: every note is generated
    group.bench_function("progression_cold", |b| {
        b.iter(|| {
            let synth = Arc::new(Synth::new(&config));
            let mut sequencer = Sequencer::new(synth, RecordingOutput::new(SAMPLE_RATE)).unwrap();
            black_box(sequencer.play_sequence(black_box(&sequence)))
        })
    });

    // Shared synth: notes come from the cache
    let synth = Arc::new(Synth::new(&config));
    group.bench_function("progression_warm", |b| {
        b.iter(|| {
            let mut sequencer = Sequencer::new(synth.clone(), RecordingOutput::new(SAMPLE_RATE)).unwrap();
            black_box(sequencer.play_sequence(black_box(&sequence)))
        })
    });

    group.finish();
}
