//! presets.rs - Stock timbres, tones, chords and sweep domains.
//!
//! The spectra and domains the dissertation figures are built from. All of
//! them are plain constructors over the core types; nothing here carries
//! state.

use crate::core::curve::TransposeDomain;
use crate::core::spectrum::{ChordSpectrum, IntervalKind, Timbre};

pub const A4_HZ: f64 = 440.0;
pub const A3_HZ: f64 = 220.0;
pub const C4_HZ: f64 = 261.6255653005986;
pub const D4_HZ: f64 = 293.6647679174076;

/// C(-1). Anchoring a chord at this fundamental lets plain MIDI note
/// numbers act as semitone intervals.
pub const MIDI_ZERO_HZ: f64 = 8.175798915643707;

pub const DEFAULT_FUND_HZ: f64 = A3_HZ;

/// Harmonic timbre with 0.88^k amplitude rolloff, as in Sethares 1993,
/// Fig. 2 (7 partials there).
pub fn sethares_timbre(partials: usize) -> Timbre {
    let multiples: Vec<f64> = (1..=partials).map(|p| p as f64).collect();
    let amps: Vec<f64> = (0..partials).map(|p| 0.88f64.powi(p as i32)).collect();
    Timbre::new(&multiples, &amps)
}

/// Single unit-amplitude partial.
pub fn sine_timbre() -> Timbre {
    Timbre::flat(&[1.0])
}

/// Harmonic series at unit amplitude throughout.
pub fn flat_saw_timbre(partials: usize) -> Timbre {
    let multiples: Vec<f64> = (1..=partials).map(|p| p as f64).collect();
    Timbre::flat(&multiples)
}

/// Harmonic series with 1/n amplitude rolloff.
pub fn filtered_saw_timbre(partials: usize) -> Timbre {
    let multiples: Vec<f64> = (1..=partials).map(|p| p as f64).collect();
    let amps: Vec<f64> = (1..=partials).map(|p| 1.0 / p as f64).collect();
    Timbre::new(&multiples, &amps)
}

/// The workhorse 12-partial Sethares timbre.
pub fn default_timbre() -> Timbre {
    sethares_timbre(12)
}

pub fn sine_tone(fund_hz: f64) -> ChordSpectrum {
    ChordSpectrum::new(&[0.0], IntervalKind::SemitoneDiff, &sine_timbre(), fund_hz)
}

pub fn sethares_tone(partials: usize, fund_hz: f64) -> ChordSpectrum {
    ChordSpectrum::new(
        &[0.0],
        IntervalKind::SemitoneDiff,
        &sethares_timbre(partials),
        fund_hz,
    )
}

pub fn flat_saw_tone(partials: usize, fund_hz: f64) -> ChordSpectrum {
    ChordSpectrum::new(
        &[0.0],
        IntervalKind::SemitoneDiff,
        &flat_saw_timbre(partials),
        fund_hz,
    )
}

pub fn filtered_saw_tone(partials: usize, fund_hz: f64) -> ChordSpectrum {
    ChordSpectrum::new(
        &[0.0],
        IntervalKind::SemitoneDiff,
        &filtered_saw_timbre(partials),
        fund_hz,
    )
}

/// Major triad (root, major third, fifth) through the Sethares timbre.
pub fn sethares_major_triad(partials: usize, fund_hz: f64) -> ChordSpectrum {
    ChordSpectrum::new(
        &[0.0, 4.0, 7.0],
        IntervalKind::SemitoneDiff,
        &sethares_timbre(partials),
        fund_hz,
    )
}

/// One octave with half-semitone margins, 0.01 st resolution.
pub fn one_octave() -> TransposeDomain {
    TransposeDomain::new(-0.5, 12.5, 1301, IntervalKind::SemitoneDiff)
}

/// Two octaves upward with half-semitone margins.
pub fn two_octaves() -> TransposeDomain {
    TransposeDomain::new(-0.5, 24.5, 2501, IntervalKind::SemitoneDiff)
}

/// Two octaves centered on the unison.
pub fn two_octaves_symmetric() -> TransposeDomain {
    TransposeDomain::new(-12.5, 12.5, 2501, IntervalKind::SemitoneDiff)
}
