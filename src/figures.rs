//! figures.rs - Dissertation-style figure scenarios.
//!
//! Each builder computes the data for one figure through the public curve
//! API; rendering belongs to the `curve_plots` binary. Nothing here reaches
//! into summation internals.

use crate::core::CoreError;
use crate::core::curve::{CurveOptions, TransposeDomain, overlap_curve, roughness_curve};
use crate::core::overlap::OverlapModel;
use crate::core::roughness::{HelmholtzParams, RoughnessModel, SetharesParams};
use crate::core::spectrum::{ChordSpectrum, IntervalKind};
use crate::presets;

/// One plotted line.
#[derive(Clone, Debug)]
pub struct Series {
    pub label: String,
    pub values: Vec<f64>,
}

/// Data behind one figure: shared x positions plus one or more series.
#[derive(Clone, Debug)]
pub struct FigureCurve {
    pub name: &'static str,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub positions: Vec<f64>,
    pub series: Vec<Series>,
}

/// Figure names accepted by the `curve_plots` binary.
pub const FIGURE_NAMES: &[&str] = &[
    "helmholtz-sine-pair",
    "sethares-dyad",
    "triad-vs-tone",
    "roughness-vs-overlap",
];

/// Build one figure by name; `None` for an unknown name.
pub fn build(name: &str) -> Option<Result<FigureCurve, CoreError>> {
    match name {
        "helmholtz-sine-pair" => Some(helmholtz_sine_pair()),
        "sethares-dyad" => Some(sethares_dyad()),
        "triad-vs-tone" => Some(triad_vs_tone()),
        "roughness-vs-overlap" => Some(roughness_vs_overlap()),
        _ => None,
    }
}

/// Helmholtz's estimate of the roughness created by adding a second sine
/// tone to one fixed at 220 Hz, swept +/-100 Hz (Sensations of Tone,
/// p. 418; beta = 0.01 reproduces his plate).
pub fn helmholtz_sine_pair() -> Result<FigureCurve, CoreError> {
    let tone = ChordSpectrum::new(&[0.0], IntervalKind::HzShift, &presets::sine_timbre(), 220.0);
    let domain = TransposeDomain::new(-100.0, 100.0, 401, IntervalKind::HzShift);
    let model = RoughnessModel::Helmholtz(HelmholtzParams {
        beta: 0.01,
        reference: Vec::new(),
    });

    let values = roughness_curve(&tone, &tone, &domain, &model, &CurveOptions::default())?;
    Ok(FigureCurve {
        name: "helmholtz_sine_pair",
        title: "Helmholtz pair roughness, sine tones at 220 Hz".into(),
        x_label: "offset (Hz)",
        y_label: "roughness (arbitrary units)",
        positions: domain.positions().to_vec(),
        series: vec![Series {
            label: "beta = 0.01".into(),
            values,
        }],
    })
}

/// The classic Sethares (1993) dissonance curve: a 7-partial harmonic tone
/// against its own transposition across one octave, original calibration.
pub fn sethares_dyad() -> Result<FigureCurve, CoreError> {
    let tone = presets::sethares_tone(7, presets::DEFAULT_FUND_HZ);
    let domain = presets::one_octave();
    let model = RoughnessModel::Sethares(SetharesParams {
        original: true,
        ..SetharesParams::default()
    });

    let values = roughness_curve(
        &tone,
        &tone,
        &domain,
        &model,
        &CurveOptions {
            normalize: true,
            ..CurveOptions::default()
        },
    )?;
    Ok(FigureCurve {
        name: "sethares_dyad",
        title: "Sethares dissonance curve, 7-partial tones at 220 Hz".into(),
        x_label: "interval (semitones)",
        y_label: "roughness (normalized)",
        positions: domain.positions().to_vec(),
        series: vec![Series {
            label: "SETHARES, original constants".into(),
            values,
        }],
    })
}

/// A fixed major triad against a moving tone, cross-chord terms only, so
/// the triad's own internal roughness does not flood the picture.
pub fn triad_vs_tone() -> Result<FigureCurve, CoreError> {
    let triad = presets::sethares_major_triad(12, presets::DEFAULT_FUND_HZ);
    let tone = presets::sethares_tone(12, presets::DEFAULT_FUND_HZ);
    let domain = presets::one_octave();

    let values = roughness_curve(
        &triad,
        &tone,
        &domain,
        &RoughnessModel::default(),
        &CurveOptions {
            normalize: true,
            crossterms_only: true,
            ..CurveOptions::default()
        },
    )?;
    Ok(FigureCurve {
        name: "triad_vs_tone",
        title: "Major triad vs. moving tone, cross terms only".into(),
        x_label: "interval (semitones)",
        y_label: "roughness (normalized)",
        positions: domain.positions().to_vec(),
        series: vec![Series {
            label: "SETHARES crossterms".into(),
            values,
        }],
    })
}

/// Roughness and overlap of the same sine pair on one x axis, both
/// peak-normalized: the hump against the unison-centered bell.
pub fn roughness_vs_overlap() -> Result<FigureCurve, CoreError> {
    let tone = presets::sine_tone(presets::DEFAULT_FUND_HZ);
    let domain = presets::one_octave();
    let opts = CurveOptions {
        normalize: true,
        ..CurveOptions::default()
    };

    let rough = roughness_curve(&tone, &tone, &domain, &RoughnessModel::default(), &opts)?;
    let lap = overlap_curve(&tone, &tone, &domain, &OverlapModel::default(), &opts)?;
    Ok(FigureCurve {
        name: "roughness_vs_overlap",
        title: "Roughness vs. overlap, sine pair at 220 Hz".into(),
        x_label: "interval (semitones)",
        y_label: "normalized value",
        positions: domain.positions().to_vec(),
        series: vec![
            Series {
                label: "roughness (SETHARES)".into(),
                values: rough,
            },
            Series {
                label: "overlap (BELL)".into(),
                values: lap,
            },
        ],
    })
}
