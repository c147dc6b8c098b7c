pub mod sequencer;

pub use sequencer::{EventFailure, PlaybackError, PlaybackReport, Sequencer};
