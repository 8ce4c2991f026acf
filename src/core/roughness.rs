//! core/roughness.rs - Pairwise roughness kernels and whole-spectrum summation.
//!
//! Four pairwise models (Sethares 1993, critical-bandwidth indicator,
//! Bigand/Parncutt/Lerdahl 1996, Helmholtz) and the O(n^2) engine that sums
//! their contributions over every unordered partial pair of a merged
//! spectrum. Helmholtz is the odd one out: it compares a single moving tone
//! against a fixed reference partial list and gets its own loop shape.

use std::f64::consts::{E, PI};
use std::str::FromStr;

use crate::core::CoreError;
use crate::core::hearing::{bark_zwicker, cbw_volk};
use crate::core::pair::{
    AmpScale, SLOW_BEAT_LIMIT_HZ, SetharesConstants, pair_distance, pair_volume,
};
use crate::core::spectrum::{MergedSpectrum, Partial};

/// Width parameter of the Parncutt bell, in Bark (Bigand, Parncutt &
/// Lerdahl 1996).
pub const PARNCUTT_A: f64 = 0.25;

/// Bark distance beyond which the Parncutt models contribute nothing.
pub const PARNCUTT_BARK_LIMIT: f64 = 1.2;

// Helmholtz gives no values for the oscillator strengths; unity makes the
// curve resemble his published figures.
const B_PRIME_1: f64 = 1.0;
const B_PRIME_2: f64 = 1.0;

/// Configuration of the Sethares (1993) pair model.
#[derive(Clone, Copy, Debug)]
pub struct SetharesParams {
    pub constants: SetharesConstants,
    pub amp_scale: AmpScale,
    /// Sethares' own MATLAB calibration: product amplitude combinator and
    /// scaling 5. Off, the combinator is `amp_scale` and scaling 5/0.8986,
    /// which puts the unit-amplitude pair maximum at 1.
    pub original: bool,
    /// Zero the pair outside the window [15 Hz, 1.2 CBW/2) around the upper
    /// partial (Hutchinson & Knopoff 1978).
    pub cutoff: bool,
}

impl Default for SetharesParams {
    fn default() -> Self {
        Self {
            constants: SetharesConstants::default(),
            amp_scale: AmpScale::Min,
            original: false,
            cutoff: false,
        }
    }
}

/// Configuration of the critical-bandwidth indicator model.
#[derive(Clone, Copy, Debug, Default)]
pub struct CbwParams {
    pub amp_scale: AmpScale,
}

/// Configuration of the Helmholtz beat-amplitude model.
#[derive(Clone, Debug)]
pub struct HelmholtzParams {
    /// Resonator damping. 0.3 roughly matches Helmholtz's own figures; 0.01
    /// reproduces the sharper sine-pair calibration.
    pub beta: f64,
    /// Fixed reference partial frequencies (Hz) the moving tone is scored
    /// against. The curve engine fills this from the reference chord when
    /// left empty.
    pub reference: Vec<f64>,
}

impl Default for HelmholtzParams {
    fn default() -> Self {
        Self {
            beta: 0.3,
            reference: Vec::new(),
        }
    }
}

/// Roughness model selection, each variant carrying exactly the options its
/// pair function reads.
#[derive(Clone, Debug)]
pub enum RoughnessModel {
    Sethares(SetharesParams),
    CriticalBandwidth(CbwParams),
    Parncutt,
    Helmholtz(HelmholtzParams),
}

impl RoughnessModel {
    pub fn kind(&self) -> RoughnessModelKind {
        match self {
            RoughnessModel::Sethares(_) => RoughnessModelKind::Sethares,
            RoughnessModel::CriticalBandwidth(_) => RoughnessModelKind::CriticalBandwidth,
            RoughnessModel::Parncutt => RoughnessModelKind::Parncutt,
            RoughnessModel::Helmholtz(_) => RoughnessModelKind::Helmholtz,
        }
    }
}

impl Default for RoughnessModel {
    fn default() -> Self {
        RoughnessModel::Sethares(SetharesParams::default())
    }
}

/// Bare model names, for selection by tag (config files, CLI).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoughnessModelKind {
    Sethares,
    CriticalBandwidth,
    Parncutt,
    Helmholtz,
}

impl RoughnessModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RoughnessModelKind::Sethares => "SETHARES",
            RoughnessModelKind::CriticalBandwidth => "CBW",
            RoughnessModelKind::Parncutt => "PARNCUTT",
            RoughnessModelKind::Helmholtz => "HELMHOLTZ",
        }
    }

    /// Model with this kind's default configuration.
    pub fn default_model(self) -> RoughnessModel {
        match self {
            RoughnessModelKind::Sethares => RoughnessModel::Sethares(SetharesParams::default()),
            RoughnessModelKind::CriticalBandwidth => {
                RoughnessModel::CriticalBandwidth(CbwParams::default())
            }
            RoughnessModelKind::Parncutt => RoughnessModel::Parncutt,
            RoughnessModelKind::Helmholtz => RoughnessModel::Helmholtz(HelmholtzParams::default()),
        }
    }
}

impl std::fmt::Display for RoughnessModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoughnessModelKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SETHARES" => Ok(RoughnessModelKind::Sethares),
            "CBW" => Ok(RoughnessModelKind::CriticalBandwidth),
            "PARNCUTT" => Ok(RoughnessModelKind::Parncutt),
            "HELMHOLTZ" => Ok(RoughnessModelKind::Helmholtz),
            _ => Err(CoreError::InvalidModel(s.to_string())),
        }
    }
}

/// Sethares (1993) sensory dissonance of one partial pair.
///
/// `s` places the curve maximum near a quarter critical bandwidth of the
/// lower partial; the difference of exponentials is 0 at unison, rises to a
/// single hump and decays.
pub fn sethares_pair(hz_a: f64, hz_b: f64, amp_a: f64, amp_b: f64, params: &SetharesParams) -> f64 {
    let c = &params.constants;
    let s = c.s_star / (c.s1 * hz_a.min(hz_b) + c.s2);

    let amp_scale = if params.original {
        AmpScale::Product
    } else {
        params.amp_scale
    };
    let mut v12 = pair_volume(amp_a, amp_b, amp_scale);
    let scaling = if params.original { 5.0 } else { 5.0 / 0.8986 };

    let distance = pair_distance(hz_a, hz_b);
    if params.cutoff {
        let cbw_limit = 1.2 * cbw_volk(hz_a.max(hz_b)) / 2.0;
        if distance < SLOW_BEAT_LIMIT_HZ || distance >= cbw_limit {
            v12 = 0.0;
        }
    }

    let value = v12 * scaling * ((-c.a * s * distance).exp() - (-c.b * s * distance).exp());
    if value.is_finite() {
        value
    } else {
        tracing::warn!(
            a = c.a,
            b = c.b,
            s,
            distance,
            "non-finite roughness contribution, substituting 0"
        );
        0.0
    }
}

/// Indicator roughness: the pair volume when the pair beats faster than the
/// slow-beat limit but sits inside half a critical bandwidth, else 0.
pub fn cbw_pair(hz_a: f64, hz_b: f64, amp_a: f64, amp_b: f64, params: &CbwParams) -> f64 {
    let distance = pair_distance(hz_a, hz_b);
    let cbw_limit = cbw_volk(hz_a.max(hz_b)) / 2.0;
    if distance >= SLOW_BEAT_LIMIT_HZ && distance < cbw_limit {
        pair_volume(amp_a, amp_b, params.amp_scale)
    } else {
        0.0
    }
}

/// Bigand, Parncutt & Lerdahl (1996) pair roughness on the Bark scale,
/// weighted by the amplitude product (Hutchinson & Knopoff 1978).
pub fn parncutt_pair(hz_a: f64, hz_b: f64, amp_a: f64, amp_b: f64) -> f64 {
    let distance = (bark_zwicker(hz_a) - bark_zwicker(hz_b)).abs();
    if distance < PARNCUTT_BARK_LIMIT {
        let shape = (E / PARNCUTT_A) * distance * (-distance / PARNCUTT_A).exp();
        amp_a * amp_b * shape * shape
    } else {
        0.0
    }
}

/// Helmholtz beat-amplitude roughness of the moving tone's partial of rank
/// `x_rank` (1-indexed) at `x_hz`, against a reference partial at `ref_hz`.
///
/// Asymmetric: the reference side enters only through `ref_hz`, the moving
/// side through both its frequency and its rank.
pub fn helmholtz_pair(x_hz: f64, x_rank: usize, ref_hz: f64, beta: f64) -> f64 {
    let p = x_rank as f64;
    let delta = (x_hz / ref_hz - 1.0) / 2.0;
    let theta = 15.0 / ref_hz;

    let s =
        4.0 * B_PRIME_1 * B_PRIME_2 * beta * beta / (beta * beta + (2.0 * PI * delta).powi(2));

    s * (2.0 * theta * delta * p).powi(2) / (theta * theta + (p * delta).powi(2)).powi(2)
}

/// Options shared by both summation engines.
#[derive(Clone, Copy, Debug)]
pub struct SumOptions {
    /// Also collect the index pairs whose raw contribution exceeds
    /// `report_limit`. Informational; never changes the total.
    pub show_partials: bool,
    /// Reporting threshold for `Summation::loud_pairs`, compared against the
    /// raw per-pair value before any spectrum-level normalizer.
    pub report_limit: f64,
}

impl Default for SumOptions {
    fn default() -> Self {
        Self {
            show_partials: false,
            report_limit: 0.1,
        }
    }
}

/// Result of a whole-spectrum summation.
#[derive(Clone, Debug, Default)]
pub struct Summation {
    /// Sum over all pairs, after any model-specific normalizer.
    pub total: f64,
    /// `(i, j)` index pairs over the reporting threshold. For Helmholtz `i`
    /// indexes the moving spectrum and `j` the reference list; otherwise both
    /// index the merged spectrum with `i < j`.
    pub loud_pairs: Vec<(usize, usize)>,
}

/// Sum a roughness model over every unordered partial pair of `spectrum`.
///
/// Parncutt divides the raw sum by the spectrum-wide normalizer
/// `sum(amp_i^2)` (Hutchinson & Knopoff 1978). Helmholtz dispatches to its
/// own (moving x reference) loop and is rejected for anything but a
/// single-note, single-chord spectrum.
pub fn roughness_total(
    spectrum: &MergedSpectrum,
    model: &RoughnessModel,
    options: &SumOptions,
) -> Result<Summation, CoreError> {
    match model {
        RoughnessModel::Sethares(params) => Ok(pair_sum(spectrum, options, |a, b| {
            sethares_pair(a.hz, b.hz, a.amp, b.amp, params)
        })),
        RoughnessModel::CriticalBandwidth(params) => Ok(pair_sum(spectrum, options, |a, b| {
            cbw_pair(a.hz, b.hz, a.amp, b.amp, params)
        })),
        RoughnessModel::Parncutt => {
            let mut sum = pair_sum(spectrum, options, |a, b| {
                parncutt_pair(a.hz, b.hz, a.amp, b.amp)
            });
            let norm: f64 = spectrum.partials().iter().map(|p| p.amp * p.amp).sum();
            sum.total = if norm > 0.0 { sum.total / norm } else { 0.0 };
            Ok(sum)
        }
        RoughnessModel::Helmholtz(params) => helmholtz_total(spectrum, params, options),
    }
}

pub(crate) fn pair_sum(
    spectrum: &MergedSpectrum,
    options: &SumOptions,
    mut pair_fn: impl FnMut(&Partial, &Partial) -> f64,
) -> Summation {
    let partials = spectrum.partials();
    let mut total = 0.0;
    let mut loud_pairs = Vec::new();
    for i in 0..partials.len() {
        for j in (i + 1)..partials.len() {
            let value = pair_fn(&partials[i], &partials[j]);
            total += value;
            if options.show_partials && value > options.report_limit {
                loud_pairs.push((i, j));
            }
        }
    }
    Summation { total, loud_pairs }
}

fn helmholtz_total(
    spectrum: &MergedSpectrum,
    params: &HelmholtzParams,
    options: &SumOptions,
) -> Result<Summation, CoreError> {
    if spectrum.source_chords() > 1 || spectrum.max_note_count() > 1 {
        return Err(CoreError::HelmholtzCardinality {
            chords: spectrum.source_chords(),
            max_notes: spectrum.max_note_count(),
        });
    }

    let mut total = 0.0;
    let mut loud_pairs = Vec::new();
    for (i, partial) in spectrum.partials().iter().enumerate() {
        for (j, &ref_hz) in params.reference.iter().enumerate() {
            let value = helmholtz_pair(partial.hz, i + 1, ref_hz, params.beta);
            total += value;
            if options.show_partials && value > options.report_limit {
                loud_pairs.push((i, j));
            }
        }
    }
    Ok(Summation { total, loud_pairs })
}
