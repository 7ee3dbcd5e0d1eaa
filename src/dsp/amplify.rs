//! Gain conversion and additive channel mixing.

/*
Gain in Decibels
================

Output level is exposed in decibels because hearing is logarithmic - we
perceive loudness ratios, not differences.

    dB   = 20 × log₁₀(amplitude_ratio)
    gain = 10 ^ (dB / 20)

Common reference points:
    ×1.0    =    0 dB  (unity, no change)
    ×0.5    ≈   -6 dB  (half amplitude)
    ×0.251  ≈  -12 dB  (default output level)
    ×0.001  =  -60 dB  (bottom of the gain fader, barely audible)

Anything at or below `MINUS_INFINITY_DB` is treated as true silence, so a
fader pulled all the way down never leaves a faint residue.


Additive Mixing
---------------

Voices never overwrite the output buffer; they add into it:

    out[ch][i] += voice_sample[i]     for every channel ch

Addition is commutative, so the order voices render in does not matter, and
silence (0.0) is the identity. The host clears the buffer once per block
before the first voice adds to it.
*/

/// Level treated as silence by [`db_to_gain`].
pub const MINUS_INFINITY_DB: f32 = -100.0;

/// Convert decibels to a linear gain factor.
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    if db > MINUS_INFINITY_DB {
        10.0f32.powf(db * 0.05)
    } else {
        0.0
    }
}

/// Convert a linear gain factor to decibels, flooring at [`MINUS_INFINITY_DB`].
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    if gain > 0.0 {
        (20.0 * gain.log10()).max(MINUS_INFINITY_DB)
    } else {
        MINUS_INFINITY_DB
    }
}

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

/// Add one value into every channel at `index`.
///
/// Channels shorter than `index` are skipped.
#[inline]
pub fn add_to_channels<C: AsMut<[f32]>>(channels: &mut [C], index: usize, value: f32) {
    for channel in channels.iter_mut() {
        if let Some(slot) = channel.as_mut().get_mut(index) {
            *slot += value;
        }
    }
}

/// Add a mono block into every channel starting at `offset`.
pub fn mix_mono_into<C: AsMut<[f32]>>(channels: &mut [C], offset: usize, mono: &[f32]) {
    for channel in channels.iter_mut() {
        let channel = channel.as_mut();
        if offset >= channel.len() {
            continue;
        }
        for (o, &s) in channel[offset..].iter_mut().zip(mono) {
            *o += s;
        }
    }
}

/// Clear every channel to silence.
pub fn clear_channels<C: AsMut<[f32]>>(channels: &mut [C]) {
    for channel in channels.iter_mut() {
        channel.as_mut().fill(0.0);
    }
}
