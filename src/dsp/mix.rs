//! Chord mixing: summing equally shaped buffers.

/*
Chord Mixing
============

A chord is several notes sounding at once. In the sample domain that is
plain addition: the chord buffer holds, at every index, the sum of the note
buffers at that index.

    C4:     [ 0.00,  0.06,  0.12, ...]
    E4:     [ 0.00,  0.07,  0.15, ...]
    G4:     [ 0.00,  0.09,  0.18, ...]
    chord:  [ 0.00,  0.22,  0.45, ...]

Shape Rules
-----------

Every input must have the same length AND the same sample rate. Buffers that
differ are rejected before any summing happens; nothing is truncated or
padded. An empty input list is also rejected, since there is no sample rate
to give the result.


Clipping
--------

Summing is additive synthesis at full level: three notes that each peak at
1.0 can reach 3.0. MixMode::Sum (the default) leaves that alone and the
output stage clips anything past ±1.0. MixMode::Average divides by the
number of notes instead, which keeps the chord inside [-1, 1] at the cost of
making each note quieter the more notes are added:

    Sum       out[i] = a[i] + b[i] + c[i]
    Average   out[i] = (a[i] + b[i] + c[i]) / 3


Phase
-----

All generated waveforms start at phase 0, so sines (and squares) sum to
exactly 0.0 at index 0 regardless of how many notes a chord holds.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{DspError, SampleBuffer};

/// How a chord's summed amplitude is scaled.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixMode {
    /// Plain sum; may exceed [-1, 1].
    #[default]
    Sum,
    /// Sum scaled by 1/N.
    Average,
}

/// Sum `buffers` element-wise without rescaling.
pub fn mix(buffers: &[SampleBuffer]) -> Result<SampleBuffer, DspError> {
    mix_with(buffers, MixMode::Sum)
}

/// Sum `buffers` element-wise, scaling according to `mode`.
pub fn mix_with(buffers: &[SampleBuffer], mode: MixMode) -> Result<SampleBuffer, DspError> {
    let (first, rest) = buffers.split_first().ok_or(DspError::EmptyMix)?;

    for buffer in rest {
        if buffer.len() != first.len() || buffer.sample_rate() != first.sample_rate() {
            return Err(DspError::MismatchedBufferShape {
                expected_len: first.len(),
                expected_rate: first.sample_rate(),
                actual_len: buffer.len(),
                actual_rate: buffer.sample_rate(),
            });
        }
    }

    // Mixing one buffer is the identity for both modes.
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let mut out = first.to_vec();
    for buffer in rest {
        sum_in_place(&mut out, buffer);
    }

    if mode == MixMode::Average {
        scale_in_place(&mut out, 1.0 / buffers.len() as f32);
    }

    Ok(SampleBuffer::new(out, first.sample_rate()))
}

/// Add signal B into signal A in-place (summing).
///
/// ⚠️ WARNING: Can exceed [-1.0, +1.0] range!
#[inline]
pub fn sum_in_place(a: &mut [f32], b: &[f32]) {
    debug_assert_eq!(a.len(), b.len());

    for (sa, &sb) in a.iter_mut().zip(b.iter()) {
        *sa += sb;
    }
}

/// Multiply every sample by `gain`.
#[inline]
pub fn scale_in_place(buffer: &mut [f32], gain: f32) {
    for sample in buffer.iter_mut() {
        *sample *= gain;
    }
}
