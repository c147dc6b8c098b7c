//! Live keyboard mode
//!
//! The terminal thread reads key presses and pushes triggers into an rtrb
//! ring. A player thread owns the output stream (cpal streams cannot move
//! between threads) and drains the ring until the producer goes away.

use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use rtrb::{Consumer, RingBuffer};
use tracing::{debug, warn};

use pitchwave::dsp::Waveform;
use pitchwave::engine::Sequencer;
use pitchwave::io::{CpalOutput, KeyMap, Trigger};
use pitchwave::synth::Synth;
use pitchwave::EngineConfig;

const TRIGGER_QUEUE: usize = 64;
const POLL: Duration = Duration::from_millis(10);

/// Restores the terminal even when the key loop bails out early
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().wrap_err("failed to enable raw mode")?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            warn!(%err, "failed to restore terminal");
        }
    }
}

pub fn run(config: EngineConfig, waveform: Waveform, duration: f64, octave: i32) -> Result<()> {
    let mut keymap = KeyMap::piano(octave);
    let (mut producer, consumer) = RingBuffer::<Trigger>::new(TRIGGER_QUEUE);

    let player = thread::Builder::new()
        .name("pitchwave-player".into())
        .spawn(move || player_loop(config, consumer))
        .wrap_err("failed to spawn player thread")?;

    println!("a w s d r f t g h u j i k: play    z/x: octave down/up    q/esc: quit");
    println!("octave {}, {} waveform", keymap.base_octave(), waveform);

    {
        let _raw = RawMode::enable()?;
        while !player.is_finished() {
            if !event::poll(POLL).wrap_err("failed to poll terminal")? {
                continue;
            }
            let Event::Key(key) = event::read().wrap_err("failed to read terminal event")? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match key.code {
                KeyCode::Esc | KeyCode::Char('q') => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('z') => {
                    debug!(octave = keymap.shift_octave(-1), "octave down");
                }
                KeyCode::Char('x') => {
                    debug!(octave = keymap.shift_octave(1), "octave up");
                }
                KeyCode::Char(c) => match keymap.trigger(c, waveform, duration) {
                    Ok(trigger) => {
                        if producer.push(trigger).is_err() {
                            warn!(key = %c, "trigger queue full, note dropped");
                        }
                    }
                    Err(err) => warn!(%err, "ignored key"),
                },
                _ => {}
            }
        }
    }

    // Abandons the ring so the player finishes what is queued and exits
    drop(producer);
    player
        .join()
        .map_err(|_| eyre!("player thread panicked"))?
}

fn player_loop(config: EngineConfig, mut consumer: Consumer<Trigger>) -> Result<()> {
    let output = CpalOutput::open(&config.stream_settings()).wrap_err("failed to open audio output")?;
    let synth = std::sync::Arc::new(Synth::new(&config));
    let mut sequencer = Sequencer::new(synth.clone(), output)?;

    loop {
        let played = sequencer.drain_triggers(&mut consumer)?;
        if played == 0 {
            if consumer.is_abandoned() && consumer.is_empty() {
                break;
            }
            thread::sleep(POLL);
        }
    }

    sequencer.finish()?;
    synth.shutdown();
    Ok(())
}
