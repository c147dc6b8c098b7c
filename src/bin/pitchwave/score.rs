//! Building sequences from command-line tokens

use color_eyre::eyre::{eyre, Result, WrapErr};
use pitchwave::dsp::Waveform;
use pitchwave::sequencing::{NoteClass, Pitch, Sequence};

/// Note length used by `play` when none is given
pub const DEFAULT_NOTE_SECONDS: f64 = 0.5;

/// Parse tokens like `C4`, `C4+E4+G4` and `_` into a sequence.
///
/// Every token lasts `duration` seconds and is followed by `delay` seconds.
pub fn parse_tokens(tokens: &[String], waveform: Waveform, duration: f64, delay: f64) -> Result<Sequence> {
    if tokens.is_empty() {
        return Err(eyre!("nothing to play"));
    }

    let mut builder = Sequence::builder().waveform(waveform);
    for token in tokens {
        let token = token.trim();
        builder = if token == "_" {
            builder.rest(duration)
        } else if token.contains('+') {
            let pitches = token
                .split('+')
                .map(|part| part.parse::<Pitch>())
                .collect::<Result<Vec<_>, _>>()
                .wrap_err_with(|| format!("invalid chord '{}'", token))?;
            builder.chord(&pitches, duration)
        } else {
            let pitch = token
                .parse::<Pitch>()
                .wrap_err_with(|| format!("invalid note '{}'", token))?;
            builder.note(pitch, duration)
        };
        builder = builder.wait(delay);
    }

    builder.build().wrap_err("invalid sequence")
}

/// A short scale followed by a I-IV-V-I progression.
pub fn demo(waveform: Waveform) -> Result<Sequence> {
    use NoteClass::*;

    let scale = [C, D, E, F, G];
    let mut builder = Sequence::builder().waveform(waveform);
    for class in scale {
        builder = builder.note(Pitch::new(class, 4), 0.3);
    }

    let triad = |root: Pitch| [root, root.transpose(4), root.transpose(7)];
    let c = Pitch::new(C, 4);
    builder = builder
        .rest(0.2)
        .chord(&triad(c), 0.5)
        .chord(&triad(Pitch::new(F, 4)), 0.5)
        .chord(&triad(Pitch::new(G, 4)), 0.5)
        .chord(&triad(c), 0.5)
        .hold()
        .wait(0.5);

    builder.build().wrap_err("demo sequence is invalid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchwave::sequencing::Event;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn notes_chords_and_rests() {
        let seq = parse_tokens(&tokens("C4 C4+E4+G4 _"), Waveform::Sine, 0.25, 0.1).unwrap();
        assert_eq!(seq.len(), 3);
        assert!(matches!(seq.steps()[0].event, Event::Note(_)));
        match &seq.steps()[1].event {
            Event::Chord(chord) => assert_eq!(chord.notes().len(), 3),
            other => panic!("expected chord, got {:?}", other),
        }
        assert!(matches!(seq.steps()[2].event, Event::Rest(_)));
        assert!(seq.steps().iter().all(|s| s.delay == 0.1));
    }

    #[test]
    fn bad_tokens_are_rejected() {
        assert!(parse_tokens(&tokens("H4"), Waveform::Sine, 0.5, 0.0).is_err());
        assert!(parse_tokens(&tokens("C4+X"), Waveform::Sine, 0.5, 0.0).is_err());
        assert!(parse_tokens(&tokens("C4"), Waveform::Sine, 0.5, -1.0).is_err());
        assert!(parse_tokens(&[], Waveform::Sine, 0.5, 0.0).is_err());
        assert!(parse_tokens(&tokens("C4 _"), Waveform::Sine, f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn demo_builds() {
        let seq = demo(Waveform::Triangle).unwrap();
        assert_eq!(seq.len(), 10);
        assert!(seq.steps()[9].event.is_held());
    }
}
