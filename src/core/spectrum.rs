//! core/spectrum.rs - Spectral data model.
//!
//! A `Timbre` is the relative shape of one tone (harmonic multiples with
//! amplitudes). A `ChordSpectrum` realizes a list of intervals through a
//! timbre into a concrete partial table, sorted ascending by frequency.
//! `MergedSpectrum` is the short-lived union fed to the summation engines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::CoreError;

/// One sinusoidal component of a realized chord.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Partial {
    /// Live frequency in Hz. The only field transposition touches.
    pub hz: f64,
    /// Linear amplitude.
    pub amp: f64,
    /// Index of the owning note in the chord's interval list.
    pub note_id: usize,
    /// Harmonic multiple this partial had in the source timbre.
    pub fund_multiple: f64,
    /// Frequency at construction time; transposition re-derives from this.
    pub hz_orig: f64,
}

/// One entry of a timbre template.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimbrePartial {
    pub multiple: f64,
    pub amp: f64,
}

/// Relative spectral shape of a tone, independent of its fundamental.
#[derive(Clone, Debug, PartialEq)]
pub struct Timbre {
    partials: Vec<TimbrePartial>,
}

impl Timbre {
    /// Build from parallel multiple/amplitude lists.
    pub fn new(multiples: &[f64], amps: &[f64]) -> Self {
        debug_assert_eq!(multiples.len(), amps.len());
        let partials = multiples
            .iter()
            .zip(amps)
            .map(|(&multiple, &amp)| TimbrePartial { multiple, amp })
            .collect();
        Self { partials }
    }

    /// All partials at unit amplitude.
    pub fn flat(multiples: &[f64]) -> Self {
        let partials = multiples
            .iter()
            .map(|&multiple| TimbrePartial { multiple, amp: 1.0 })
            .collect();
        Self { partials }
    }

    pub fn partials(&self) -> &[TimbrePartial] {
        &self.partials
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }
}

/// How interval values and transposition positions are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntervalKind {
    /// Semitone offsets: `hz = 2^(v/12) * ref`.
    #[serde(rename = "ST_DIFF")]
    SemitoneDiff,
    /// Frequency ratios: `hz = v * ref`.
    #[serde(rename = "SCALE_FACTOR")]
    ScaleFactor,
    /// Absolute offsets in Hz: `hz = v + ref`.
    #[serde(rename = "HZ_SHIFT")]
    HzShift,
}

impl IntervalKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalKind::SemitoneDiff => "ST_DIFF",
            IntervalKind::ScaleFactor => "SCALE_FACTOR",
            IntervalKind::HzShift => "HZ_SHIFT",
        }
    }

    /// Interval value that leaves a reference frequency unchanged.
    pub fn identity_interval(self) -> f64 {
        match self {
            IntervalKind::SemitoneDiff | IntervalKind::HzShift => 0.0,
            IntervalKind::ScaleFactor => 1.0,
        }
    }

    /// Frequency reached from `ref_hz` at interval/position `value`.
    #[inline]
    pub fn apply(self, value: f64, ref_hz: f64) -> f64 {
        match self {
            IntervalKind::SemitoneDiff => (value / 12.0).exp2() * ref_hz,
            IntervalKind::ScaleFactor => value * ref_hz,
            IntervalKind::HzShift => value + ref_hz,
        }
    }
}

impl fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntervalKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ST_DIFF" => Ok(IntervalKind::SemitoneDiff),
            "SCALE_FACTOR" => Ok(IntervalKind::ScaleFactor),
            "HZ_SHIFT" => Ok(IntervalKind::HzShift),
            _ => Err(CoreError::InvalidIntervalKind(s.to_string())),
        }
    }
}

/// A chord realized as partials: N intervals x P timbre partials, each
/// partial tagged with the note it belongs to. The table stays sorted
/// ascending by live `hz` through every mutation.
#[derive(Clone, Debug, PartialEq)]
pub struct ChordSpectrum {
    partials: Vec<Partial>,
    interval_kind: IntervalKind,
    fund_hz: f64,
    note_count: usize,
}

impl ChordSpectrum {
    /// Realize `intervals` through `timbre` above `fund_hz`.
    ///
    /// `fund_hz = 0` means the timbre already carries absolute frequencies
    /// and no fundamental multiplication happens.
    pub fn new(intervals: &[f64], kind: IntervalKind, timbre: &Timbre, fund_hz: f64) -> Self {
        let mut partials = Vec::with_capacity(intervals.len() * timbre.len());
        for (note_id, &interval) in intervals.iter().enumerate() {
            for tp in timbre.partials() {
                let ref_hz = if fund_hz > 0.0 {
                    tp.multiple * fund_hz
                } else {
                    tp.multiple
                };
                let hz = kind.apply(interval, ref_hz);
                partials.push(Partial {
                    hz,
                    amp: tp.amp,
                    note_id,
                    fund_multiple: tp.multiple,
                    hz_orig: hz,
                });
            }
        }
        partials.sort_by(|a, b| a.hz.total_cmp(&b.hz));
        Self {
            partials,
            interval_kind: kind,
            fund_hz,
            note_count: intervals.len(),
        }
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    pub fn interval_kind(&self) -> IntervalKind {
        self.interval_kind
    }

    pub fn fund_hz(&self) -> f64 {
        self.fund_hz
    }

    /// Number of intervals the chord was built from.
    pub fn note_count(&self) -> usize {
        self.note_count
    }

    /// Lowest construction-time frequency, infinity for an empty chord.
    pub fn min_hz_orig(&self) -> f64 {
        self.partials
            .iter()
            .map(|p| p.hz_orig)
            .fold(f64::INFINITY, f64::min)
    }

    /// Move every live `hz` to `position` on the transposition axis.
    ///
    /// Frequencies are re-derived from `hz_orig`, so repeated transpositions
    /// never accumulate. `kind` must match the chord's own interval kind.
    pub fn transpose(&mut self, position: f64, kind: IntervalKind) -> Result<(), CoreError> {
        if kind != self.interval_kind {
            return Err(CoreError::IntervalKindMismatch {
                chord: self.interval_kind,
                requested: kind,
            });
        }
        self.apply_transpose(position, kind);
        Ok(())
    }

    /// `transpose` without the interval-kind guard.
    ///
    /// Logs a warning when the kinds actually disagree; the resulting
    /// frequencies mix two interval semantics and are rarely meaningful.
    pub fn transpose_unchecked(&mut self, position: f64, kind: IntervalKind) {
        if kind != self.interval_kind {
            tracing::warn!(
                chord_kind = self.interval_kind.as_str(),
                requested_kind = kind.as_str(),
                position,
                "transposing with a mismatched interval kind"
            );
        }
        self.apply_transpose(position, kind);
    }

    fn apply_transpose(&mut self, position: f64, kind: IntervalKind) {
        for p in &mut self.partials {
            p.hz = kind.apply(position, p.hz_orig);
        }
        self.partials.sort_by(|a, b| a.hz.total_cmp(&b.hz));
    }

    /// Restore every live `hz` to its construction-time value.
    pub fn reset(&mut self) {
        for p in &mut self.partials {
            p.hz = p.hz_orig;
        }
        self.partials.sort_by(|a, b| a.hz.total_cmp(&b.hz));
    }

    /// Independent single-note copy carrying this chord's absolute partial
    /// frequencies as its timbre, anchored at a 1 Hz fundamental with
    /// `fund_multiple` rescaled to the lowest original frequency.
    ///
    /// The sweep engine transposes this copy when a chord is compared
    /// against itself, so the caller's chord never aliases the moving one.
    pub fn detached_copy(&self) -> ChordSpectrum {
        let multiples: Vec<f64> = self.partials.iter().map(|p| p.hz_orig).collect();
        let amps: Vec<f64> = self.partials.iter().map(|p| p.amp).collect();
        let timbre = Timbre::new(&multiples, &amps);
        let identity = [self.interval_kind.identity_interval()];
        let mut copy = ChordSpectrum::new(&identity, self.interval_kind, &timbre, 1.0);
        let min_hz = copy.min_hz_orig();
        if min_hz > 0.0 && min_hz.is_finite() {
            for p in &mut copy.partials {
                p.fund_multiple /= min_hz;
            }
        }
        copy
    }
}

/// Union of one or more chords' partials, re-sorted by frequency.
///
/// Built fresh at every sweep step; it records how many chords went in and
/// the largest note count among them so Helmholtz summation can reject
/// spectra it is not defined for.
#[derive(Clone, Debug)]
pub struct MergedSpectrum {
    partials: Vec<Partial>,
    source_chords: usize,
    max_note_count: usize,
}

impl MergedSpectrum {
    pub fn new<'a>(spectra: impl IntoIterator<Item = &'a ChordSpectrum>) -> Self {
        let mut partials = Vec::new();
        let mut source_chords = 0;
        let mut max_note_count = 0;
        for chord in spectra {
            partials.extend_from_slice(chord.partials());
            source_chords += 1;
            max_note_count = max_note_count.max(chord.note_count());
        }
        partials.sort_by(|a, b| a.hz.total_cmp(&b.hz));
        Self {
            partials,
            source_chords,
            max_note_count,
        }
    }

    pub fn partials(&self) -> &[Partial] {
        &self.partials
    }

    pub fn len(&self) -> usize {
        self.partials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partials.is_empty()
    }

    pub fn source_chords(&self) -> usize {
        self.source_chords
    }

    pub fn max_note_count(&self) -> usize {
        self.max_note_count
    }
}
