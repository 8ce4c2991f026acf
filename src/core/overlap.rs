//! core/overlap.rs - Pairwise overlap kernels and whole-spectrum summation.
//!
//! Mirror image of the roughness family: each model estimates how much two
//! partials mask or fuse with each other instead of how much they beat.
//! Overlap is largest at unison, where roughness vanishes.

use std::f64::consts::PI;
use std::str::FromStr;

use crate::core::CoreError;
use crate::core::hearing::{bark_zwicker, cbw_volk};
use crate::core::pair::{
    AmpScale, SLOW_BEAT_LIMIT_HZ, SetharesConstants, pair_distance, pair_volume,
};
use crate::core::roughness::{
    CbwParams, PARNCUTT_A, PARNCUTT_BARK_LIMIT, SumOptions, Summation, pair_sum,
};
use crate::core::spectrum::MergedSpectrum;

/// Decay slope of the Sethares-shaped overlap bell.
pub const SETHARES_BELL_K: f64 = -2.374;

/// Width calibration of the Parncutt-shaped overlap bell, chosen so the
/// overlap curve crosses the matching roughness curve at half height.
pub const PARNCUTT_BELL_K: f64 = 1.19614;

/// Configuration of the Sethares-shaped overlap bell.
#[derive(Clone, Copy, Debug)]
pub struct BellParams {
    pub constants: SetharesConstants,
    pub amp_scale: AmpScale,
    /// Decay slope; more negative narrows the bell.
    pub k: f64,
    /// Zero the pair outside [15 Hz, 1.2 CBW/2), as in Sethares roughness.
    pub cutoff: bool,
}

impl Default for BellParams {
    fn default() -> Self {
        Self {
            constants: SetharesConstants::default(),
            amp_scale: AmpScale::Min,
            k: SETHARES_BELL_K,
            cutoff: false,
        }
    }
}

/// Configuration of the cosine-bump overlap model.
#[derive(Clone, Copy, Debug, Default)]
pub struct CosParams {
    pub amp_scale: AmpScale,
}

/// Overlap model selection, each variant carrying the options its pair
/// function reads.
#[derive(Clone, Debug)]
pub enum OverlapModel {
    SetharesBell(BellParams),
    ParncuttBell,
    Cosine(CosParams),
    CriticalBandwidth(CbwParams),
}

impl OverlapModel {
    pub fn kind(&self) -> OverlapModelKind {
        match self {
            OverlapModel::SetharesBell(_) => OverlapModelKind::SetharesBell,
            OverlapModel::ParncuttBell => OverlapModelKind::ParncuttBell,
            OverlapModel::Cosine(_) => OverlapModelKind::Cosine,
            OverlapModel::CriticalBandwidth(_) => OverlapModelKind::CriticalBandwidth,
        }
    }
}

impl Default for OverlapModel {
    fn default() -> Self {
        OverlapModel::SetharesBell(BellParams::default())
    }
}

/// Bare overlap model names, for selection by tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlapModelKind {
    SetharesBell,
    ParncuttBell,
    Cosine,
    CriticalBandwidth,
}

impl OverlapModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OverlapModelKind::SetharesBell => "SETHARES_BELL",
            OverlapModelKind::ParncuttBell => "PARNCUTT_BELL",
            OverlapModelKind::Cosine => "COS",
            OverlapModelKind::CriticalBandwidth => "CBW",
        }
    }

    /// Model with this kind's default configuration.
    pub fn default_model(self) -> OverlapModel {
        match self {
            OverlapModelKind::SetharesBell => OverlapModel::SetharesBell(BellParams::default()),
            OverlapModelKind::ParncuttBell => OverlapModel::ParncuttBell,
            OverlapModelKind::Cosine => OverlapModel::Cosine(CosParams::default()),
            OverlapModelKind::CriticalBandwidth => {
                OverlapModel::CriticalBandwidth(CbwParams::default())
            }
        }
    }
}

impl std::fmt::Display for OverlapModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlapModelKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            // BELL is the historical name for the Sethares-shaped bell.
            "BELL" | "SETHARES_BELL" => Ok(OverlapModelKind::SetharesBell),
            "PARNCUTT_BELL" => Ok(OverlapModelKind::ParncuttBell),
            "COS" => Ok(OverlapModelKind::Cosine),
            "CBW" => Ok(OverlapModelKind::CriticalBandwidth),
            _ => Err(CoreError::InvalidModel(s.to_string())),
        }
    }
}

/// Indicator overlap: the pair volume while the pair still beats slowly
/// (distance under 15 Hz), else 0. The critical bandwidth itself plays no
/// part; the name pairs this with the indicator roughness model.
pub fn cbw_overlap_pair(hz_a: f64, hz_b: f64, amp_a: f64, amp_b: f64, params: &CbwParams) -> f64 {
    if pair_distance(hz_a, hz_b) < SLOW_BEAT_LIMIT_HZ {
        pair_volume(amp_a, amp_b, params.amp_scale)
    } else {
        0.0
    }
}

/// Cosine-bump overlap: the indicator value shaped by a raised cosine, so
/// the estimate falls smoothly to 0 at the slow-beat limit instead of
/// cutting off.
pub fn cos_overlap_pair(hz_a: f64, hz_b: f64, amp_a: f64, amp_b: f64, params: &CosParams) -> f64 {
    let distance = pair_distance(hz_a, hz_b);
    if distance < SLOW_BEAT_LIMIT_HZ {
        let v12 = pair_volume(amp_a, amp_b, params.amp_scale);
        v12 * 0.5 * (1.0 + (PI * distance / SLOW_BEAT_LIMIT_HZ).cos())
    } else {
        0.0
    }
}

/// Sethares-shaped overlap bell: the same `s` factor as Sethares roughness
/// driving a single decaying exponential, maximal at unison.
pub fn bell_overlap_pair(hz_a: f64, hz_b: f64, amp_a: f64, amp_b: f64, params: &BellParams) -> f64 {
    let c = &params.constants;
    let s = c.s_star / (c.s1 * hz_a.min(hz_b) + c.s2);
    let mut v12 = pair_volume(amp_a, amp_b, params.amp_scale);

    let distance = pair_distance(hz_a, hz_b);
    if params.cutoff {
        let cbw_limit = 1.2 * cbw_volk(hz_a.max(hz_b)) / 2.0;
        if distance < SLOW_BEAT_LIMIT_HZ || distance >= cbw_limit {
            v12 = 0.0;
        }
    }

    let value = v12 * (params.k * c.b * s * distance).exp();
    if value.is_finite() {
        value
    } else {
        tracing::warn!(
            k = params.k,
            b = c.b,
            s,
            distance,
            "non-finite overlap contribution, substituting 0"
        );
        0.0
    }
}

/// Parncutt-shaped overlap bell on the Bark scale. The normalized amplitude
/// combinator tops out at 1/2 for equal amplitudes; `PARNCUTT_BELL_K` sets
/// the bell width.
pub fn parncutt_bell_overlap_pair(hz_a: f64, hz_b: f64, amp_a: f64, amp_b: f64) -> f64 {
    let distance = (bark_zwicker(hz_a) - bark_zwicker(hz_b)).abs();
    if distance >= PARNCUTT_BARK_LIMIT {
        return 0.0;
    }
    let denom = amp_a * amp_a + amp_b * amp_b;
    if denom <= 0.0 {
        return 0.0;
    }
    let amp = amp_a * amp_b / denom;
    amp * (-(distance * distance) / (PARNCUTT_A.powi(3) / PARNCUTT_BELL_K)).exp()
}

/// Sum an overlap model over every unordered partial pair of `spectrum`.
///
/// Mirrors `roughness_total`, without any spectrum-level normalizer.
pub fn overlap_total(
    spectrum: &MergedSpectrum,
    model: &OverlapModel,
    options: &SumOptions,
) -> Result<Summation, CoreError> {
    let sum = match model {
        OverlapModel::SetharesBell(params) => pair_sum(spectrum, options, |a, b| {
            bell_overlap_pair(a.hz, b.hz, a.amp, b.amp, params)
        }),
        OverlapModel::ParncuttBell => pair_sum(spectrum, options, |a, b| {
            parncutt_bell_overlap_pair(a.hz, b.hz, a.amp, b.amp)
        }),
        OverlapModel::Cosine(params) => pair_sum(spectrum, options, |a, b| {
            cos_overlap_pair(a.hz, b.hz, a.amp, b.amp, params)
        }),
        OverlapModel::CriticalBandwidth(params) => pair_sum(spectrum, options, |a, b| {
            cbw_overlap_pair(a.hz, b.hz, a.amp, b.amp, params)
        }),
    };
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::spectrum::{ChordSpectrum, IntervalKind, Timbre};

    #[test]
    fn indicator_overlap_band() {
        let params = CbwParams::default();
        assert_eq!(cbw_overlap_pair(220.0, 225.0, 1.0, 0.5, &params), 0.5);
        assert_eq!(cbw_overlap_pair(220.0, 235.0, 1.0, 0.5, &params), 0.0);
        assert_eq!(cbw_overlap_pair(220.0, 500.0, 1.0, 0.5, &params), 0.0);
    }

    #[test]
    fn cosine_bump_shape() {
        let params = CosParams::default();
        // Full value at unison, half value halfway to the limit, 0 beyond.
        assert!((cos_overlap_pair(220.0, 220.0, 1.0, 1.0, &params) - 1.0).abs() < 1e-12);
        assert!((cos_overlap_pair(220.0, 227.5, 1.0, 1.0, &params) - 0.5).abs() < 1e-9);
        assert_eq!(cos_overlap_pair(220.0, 240.0, 1.0, 1.0, &params), 0.0);
    }

    #[test]
    fn bell_peaks_at_unison_and_decays() {
        let params = BellParams::default();
        let at_unison = bell_overlap_pair(220.0, 220.0, 1.0, 0.5, &params);
        assert!((at_unison - 0.5).abs() < 1e-12);
        let near = bell_overlap_pair(220.0, 230.0, 1.0, 0.5, &params);
        let far = bell_overlap_pair(220.0, 300.0, 1.0, 0.5, &params);
        assert!(at_unison > near && near > far && far > 0.0);
        // Symmetric in its arguments.
        assert!((near - bell_overlap_pair(230.0, 220.0, 0.5, 1.0, &params)).abs() < 1e-12);
    }

    #[test]
    fn bell_cutoff_window() {
        let cut = BellParams {
            cutoff: true,
            ..BellParams::default()
        };
        assert_eq!(bell_overlap_pair(220.0, 220.0, 1.0, 1.0, &cut), 0.0);
        assert_eq!(bell_overlap_pair(220.0, 440.0, 1.0, 1.0, &cut), 0.0);
        assert!(bell_overlap_pair(220.0, 260.0, 1.0, 1.0, &cut) > 0.0);
    }

    #[test]
    fn parncutt_bell_amplitude_combinator() {
        // Equal amplitudes give the 1/2 ceiling at unison.
        assert!((parncutt_bell_overlap_pair(300.0, 300.0, 1.0, 1.0) - 0.5).abs() < 1e-12);
        assert!((parncutt_bell_overlap_pair(300.0, 300.0, 2.0, 2.0) - 0.5).abs() < 1e-12);
        // Far apart in Bark, or silent, gives nothing.
        assert_eq!(parncutt_bell_overlap_pair(220.0, 880.0, 1.0, 1.0), 0.0);
        assert_eq!(parncutt_bell_overlap_pair(300.0, 300.0, 0.0, 0.0), 0.0);
        let near = parncutt_bell_overlap_pair(440.0, 450.0, 1.0, 1.0);
        assert!(near > 0.0 && near < 0.5);
        assert!((near - parncutt_bell_overlap_pair(450.0, 440.0, 1.0, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn summation_matches_manual_pairs() {
        let timbre = Timbre::new(&[1.0, 2.0, 3.0], &[1.0, 0.5, 0.33]);
        let chord = ChordSpectrum::new(&[0.0, 0.5], IntervalKind::SemitoneDiff, &timbre, 220.0);
        let merged = MergedSpectrum::new([&chord]);
        let params = BellParams::default();

        let got = overlap_total(
            &merged,
            &OverlapModel::SetharesBell(params),
            &SumOptions::default(),
        )
        .unwrap();

        let p = merged.partials();
        let mut expected = 0.0;
        for i in 0..p.len() {
            for j in (i + 1)..p.len() {
                expected += bell_overlap_pair(p[i].hz, p[j].hz, p[i].amp, p[j].amp, &params);
            }
        }
        assert!((got.total - expected).abs() < 1e-12);
        assert!(got.total > 0.0);
    }

    #[test]
    fn kind_names_round_trip_with_historical_alias() {
        for kind in [
            OverlapModelKind::SetharesBell,
            OverlapModelKind::ParncuttBell,
            OverlapModelKind::Cosine,
            OverlapModelKind::CriticalBandwidth,
        ] {
            assert_eq!(kind.as_str().parse::<OverlapModelKind>().unwrap(), kind);
            assert_eq!(kind.default_model().kind(), kind);
        }
        assert_eq!(
            "bell".parse::<OverlapModelKind>().unwrap(),
            OverlapModelKind::SetharesBell
        );
        let err = "gauss".parse::<OverlapModelKind>().unwrap_err();
        assert_eq!(err, CoreError::InvalidModel("gauss".into()));
    }
}
