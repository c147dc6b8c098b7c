pub mod notes;
pub mod sequence;

pub use notes::{pitch_table, NoteClass, ParsePitchError, Pitch};
pub use sequence::{ChordEvent, Event, NoteEvent, Sequence, SequenceBuilder, SequenceError, Step};
