use std::collections::VecDeque;
use std::sync::Arc;

use pitchwave::dsp::{DspError, MixMode, Waveform};
use pitchwave::engine::{PlaybackError, Sequencer};
use pitchwave::io::{DeviceError, KeyMap, OutputStream, RecordingOutput, Trigger, WavOutput};
use pitchwave::sequencing::{NoteClass, Pitch, Sequence};
use pitchwave::synth::Synth;
use pitchwave::EngineConfig;

fn pitch(s: &str) -> Pitch {
    s.parse().unwrap()
}

fn recording_sequencer(config: &EngineConfig) -> Sequencer<RecordingOutput> {
    let synth = Arc::new(Synth::new(config));
    Sequencer::new(synth, RecordingOutput::new(config.sample_rate)).unwrap()
}

/// Accepts `ok_writes` writes, then fails every write after that.
struct FlakyOutput {
    ok_writes: usize,
    writes: usize,
    stop_calls: usize,
}

impl OutputStream for FlakyOutput {
    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn write(&mut self, _samples: &[f32]) -> Result<(), DeviceError> {
        if self.writes >= self.ok_writes {
            return Err(DeviceError::Write("device unplugged".into()));
        }
        self.writes += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DeviceError> {
        self.stop_calls += 1;
        Ok(())
    }
}

#[test]
fn scale_is_written_in_order() {
    let seq = Sequence::builder()
        .note(pitch("C4"), 0.5)
        .note(pitch("D4"), 0.5)
        .note(pitch("E4"), 0.5)
        .build()
        .unwrap();

    let mut sequencer = recording_sequencer(&EngineConfig::default());
    let report = sequencer.play_sequence(&seq).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.events_played, 3);

    let output = sequencer.finish().unwrap();
    let writes = output.writes();
    assert_eq!(writes.len(), 3);
    assert!(writes.iter().all(|w| w.len() == 22_050));

    // Each write is exactly the note rendered on its own
    let synth = Synth::new(&EngineConfig::default());
    for (write, name) in writes.iter().zip(["C4", "D4", "E4"]) {
        let expected = synth
            .render_note(&pitchwave::sequencing::NoteEvent::new(pitch(name), Waveform::Sine, 0.5))
            .unwrap();
        assert_eq!(write.as_slice(), expected.samples());
    }
}

#[test]
fn chord_is_one_write() {
    let seq = Sequence::builder()
        .chord(&[pitch("C4"), pitch("E4"), pitch("G4")], 0.5)
        .build()
        .unwrap();

    let mut sequencer = recording_sequencer(&EngineConfig::default());
    sequencer.play_sequence(&seq).unwrap();

    let writes = sequencer.output().writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].len(), 22_050);
    assert_eq!(writes[0][0], 0.0);
}

#[test]
fn averaged_chord_stays_in_range() {
    let config = EngineConfig::default().mix_mode(MixMode::Average);
    let seq = Sequence::builder()
        .waveform(Waveform::Square)
        .chord(&[pitch("A3"), pitch("A4"), pitch("A5")], 0.25)
        .build()
        .unwrap();

    let mut sequencer = recording_sequencer(&config);
    sequencer.play_sequence(&seq).unwrap();
    assert!(sequencer.output().samples().iter().all(|s| s.abs() <= 1.0));
}

#[test]
fn held_note_absorbs_delay() {
    let seq = Sequence::builder()
        .note(pitch("A4"), 0.25)
        .hold()
        .wait(0.25)
        .note(pitch("B4"), 0.25)
        .wait(0.25)
        .build()
        .unwrap();

    let mut sequencer = recording_sequencer(&EngineConfig::default());
    let report = sequencer.play_sequence(&seq).unwrap();

    let lengths: Vec<usize> = sequencer.output().writes().iter().map(Vec::len).collect();
    assert_eq!(lengths, [22_050, 11_025, 11_025]);
    assert_eq!(report.samples_written, 44_100);
}

#[test]
fn generation_failure_skips_only_that_event() {
    let seq = Sequence::builder()
        .note(pitch("C4"), 0.1)
        .note(Pitch::new(NoteClass::A, -2000), 0.1)
        .note(pitch("E4"), 0.1)
        .build()
        .unwrap();

    let mut sequencer = recording_sequencer(&EngineConfig::default());
    let report = sequencer.play_sequence(&seq).unwrap();

    assert_eq!(report.events_played, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(matches!(report.failures[0].error, DspError::InvalidFrequency(_)));
    assert_eq!(sequencer.output().writes().len(), 2);
    assert!(!sequencer.output().is_stopped());
}

#[test]
fn device_failure_stops_stream() {
    let seq = Sequence::builder()
        .note(pitch("C4"), 0.1)
        .note(pitch("D4"), 0.1)
        .note(pitch("E4"), 0.1)
        .build()
        .unwrap();

    let synth = Arc::new(Synth::new(&EngineConfig::default()));
    let output = FlakyOutput {
        ok_writes: 1,
        writes: 0,
        stop_calls: 0,
    };
    let mut sequencer = Sequencer::new(synth, output).unwrap();

    let err = sequencer.play_sequence(&seq).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, PlaybackError::Device(DeviceError::Write(_))));
    assert_eq!(sequencer.output().writes, 1);
    assert_eq!(sequencer.output().stop_calls, 1);
}

#[test]
fn rate_mismatch_is_rejected() {
    let config = EngineConfig::default().sample_rate(48_000);
    let synth = Arc::new(Synth::new(&config));
    let result = Sequencer::new(synth, RecordingOutput::new(44_100));
    assert!(matches!(result, Err(PlaybackError::SampleRateMismatch { .. })));
}

#[test]
fn queued_triggers_play_in_order() {
    let keymap = KeyMap::default();
    let mut queue: VecDeque<Trigger> = VecDeque::new();
    queue.push_back(keymap.trigger('a', Waveform::Sine, 0.1).unwrap());
    queue.push_back(Trigger {
        pitch: Pitch::new(NoteClass::C, -2000),
        waveform: Waveform::Sine,
        duration: 0.1,
    });
    queue.push_back(keymap.trigger('s', Waveform::Sawtooth, 0.2).unwrap());

    let mut sequencer = recording_sequencer(&EngineConfig::default());
    let played = sequencer.drain_triggers(&mut queue).unwrap();

    assert_eq!(played, 2);
    assert!(queue.is_empty());
    let lengths: Vec<usize> = sequencer.output().writes().iter().map(Vec::len).collect();
    assert_eq!(lengths, [4_410, 8_820]);
}

#[test]
fn writes_after_finish_are_refused() {
    let sequencer = recording_sequencer(&EngineConfig::default());
    let mut output = sequencer.finish().unwrap();
    assert!(output.is_stopped());
    assert_eq!(output.write(&[0.0]), Err(DeviceError::Closed));
}

#[test]
fn sequence_renders_to_wav() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scale.wav");

    let seq = Sequence::builder()
        .note(pitch("A4"), 0.25)
        .wait(0.25)
        .chord(&[pitch("C4"), pitch("E4")], 0.25)
        .build()
        .unwrap();

    let synth = Arc::new(Synth::new(&EngineConfig::default()));
    let output = WavOutput::create(&path, 44_100).unwrap();
    let mut sequencer = Sequencer::new(synth, output).unwrap();
    sequencer.play_sequence(&seq).unwrap();
    sequencer.finish().unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 44_100);
    assert_eq!(reader.duration(), 33_075);
}
