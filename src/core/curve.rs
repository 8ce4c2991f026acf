//! core/curve.rs - Transposition domains and the curve-sweep engine.
//!
//! A sweep scores a fixed reference chord against a test chord moved to
//! every position of a `TransposeDomain`, producing one scalar per position.
//! The engine transposes a private copy of the test chord, so callers'
//! chords come back exactly as they went in, on every path.

use crate::core::CoreError;
use crate::core::overlap::{OverlapModel, overlap_total};
use crate::core::roughness::{RoughnessModel, SumOptions, Summation, roughness_total};
use crate::core::spectrum::{ChordSpectrum, IntervalKind, MergedSpectrum};

/// Evenly spaced, inclusive transposition positions plus the interval
/// semantics they move chords along. Immutable; build once, sweep many.
#[derive(Clone, Debug, PartialEq)]
pub struct TransposeDomain {
    positions: Vec<f64>,
    kind: IntervalKind,
}

impl TransposeDomain {
    /// Inclusive linspace from `start` to `stop` with `len` points.
    ///
    /// Both endpoints are hit exactly. Panics if `len < 2`.
    pub fn new(start: f64, stop: f64, len: usize, kind: IntervalKind) -> Self {
        assert!(len >= 2, "transpose domain needs at least 2 positions");
        let span = stop - start;
        let last = (len - 1) as f64;
        let mut positions: Vec<f64> = (0..len)
            .map(|i| start + span * i as f64 / last)
            .collect();
        // start + span can land an ulp off stop; pin the endpoint.
        positions[len - 1] = stop;
        Self { positions, kind }
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn kind(&self) -> IntervalKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Options of a curve sweep.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurveOptions {
    /// Divide every sample by the curve maximum.
    pub normalize: bool,
    /// Subtract both chords' self-measures at each position, leaving only
    /// the interaction terms between the two chords. Removes the
    /// register-dependent floor that self-roughness alone contributes.
    pub crossterms_only: bool,
    /// Options forwarded to the summation engine.
    pub sum: SumOptions,
}

/// Roughness of (reference, test-at-position) for every domain position.
///
/// The test chord is swept on a private copy; when `reference` and `test`
/// are the same chord (by identity or value) the copy is rebuilt from the
/// reference's original partials so the two sides never alias. Interval-kind
/// and model preconditions are checked before the first sample, so an `Err`
/// never carries a partially computed curve.
pub fn roughness_curve(
    reference: &ChordSpectrum,
    test: &ChordSpectrum,
    domain: &TransposeDomain,
    model: &RoughnessModel,
    options: &CurveOptions,
) -> Result<Vec<f64>, CoreError> {
    let mut working = working_copy(reference, test);
    check_domain_kind(&working, domain)?;

    let helmholtz = matches!(model, RoughnessModel::Helmholtz(_));
    check_helmholtz_cardinality(model, reference, &working)?;
    let model = resolve_roughness_model(model, reference);

    let ref_self = if options.crossterms_only {
        roughness_total(&MergedSpectrum::new([reference]), &model, &options.sum)?.total
    } else {
        0.0
    };

    let mut samples = Vec::with_capacity(domain.len());
    for &position in domain.positions() {
        working.transpose(position, domain.kind())?;

        let merged = if helmholtz {
            MergedSpectrum::new([&working])
        } else {
            MergedSpectrum::new([reference, &working])
        };
        let mut value = roughness_total(&merged, &model, &options.sum)?.total;

        if options.crossterms_only {
            let own =
                roughness_total(&MergedSpectrum::new([&working]), &model, &options.sum)?.total;
            value -= ref_self + own;
        }
        samples.push(value);
    }
    tracing::debug!(
        model = model.kind().as_str(),
        samples = samples.len(),
        "roughness sweep done"
    );

    finalize(samples, options.normalize)
}

/// Overlap of (reference, test-at-position) for every domain position.
///
/// Same sweep contract as `roughness_curve`.
pub fn overlap_curve(
    reference: &ChordSpectrum,
    test: &ChordSpectrum,
    domain: &TransposeDomain,
    model: &OverlapModel,
    options: &CurveOptions,
) -> Result<Vec<f64>, CoreError> {
    let mut working = working_copy(reference, test);
    check_domain_kind(&working, domain)?;

    let ref_self = if options.crossterms_only {
        overlap_total(&MergedSpectrum::new([reference]), model, &options.sum)?.total
    } else {
        0.0
    };

    let mut samples = Vec::with_capacity(domain.len());
    for &position in domain.positions() {
        working.transpose(position, domain.kind())?;

        let merged = MergedSpectrum::new([reference, &working]);
        let mut value = overlap_total(&merged, model, &options.sum)?.total;

        if options.crossterms_only {
            let own = overlap_total(&MergedSpectrum::new([&working]), model, &options.sum)?.total;
            value -= ref_self + own;
        }
        samples.push(value);
    }
    tracing::debug!(
        model = model.kind().as_str(),
        samples = samples.len(),
        "overlap sweep done"
    );

    finalize(samples, options.normalize)
}

/// Diagnostic variant of `roughness_curve`: the full `Summation` (total plus
/// loud pairs) at every position instead of the bare totals.
pub fn roughness_curve_detailed(
    reference: &ChordSpectrum,
    test: &ChordSpectrum,
    domain: &TransposeDomain,
    model: &RoughnessModel,
    options: &SumOptions,
) -> Result<Vec<Summation>, CoreError> {
    let mut working = working_copy(reference, test);
    check_domain_kind(&working, domain)?;
    let helmholtz = matches!(model, RoughnessModel::Helmholtz(_));
    check_helmholtz_cardinality(model, reference, &working)?;
    let model = resolve_roughness_model(model, reference);

    let mut samples = Vec::with_capacity(domain.len());
    for &position in domain.positions() {
        working.transpose(position, domain.kind())?;
        let merged = if helmholtz {
            MergedSpectrum::new([&working])
        } else {
            MergedSpectrum::new([reference, &working])
        };
        samples.push(roughness_total(&merged, &model, options)?);
    }
    Ok(samples)
}

fn working_copy(reference: &ChordSpectrum, test: &ChordSpectrum) -> ChordSpectrum {
    if std::ptr::eq(reference, test) || reference == test {
        reference.detached_copy()
    } else {
        test.clone()
    }
}

fn check_domain_kind(working: &ChordSpectrum, domain: &TransposeDomain) -> Result<(), CoreError> {
    if working.interval_kind() != domain.kind() {
        return Err(CoreError::IntervalKindMismatch {
            chord: working.interval_kind(),
            requested: domain.kind(),
        });
    }
    Ok(())
}

/// Reject a Helmholtz sweep unless both sides are single tones.
fn check_helmholtz_cardinality(
    model: &RoughnessModel,
    reference: &ChordSpectrum,
    working: &ChordSpectrum,
) -> Result<(), CoreError> {
    if let RoughnessModel::Helmholtz(params) = model {
        // The reference side only matters when its chord is about to become
        // the comparison list.
        let ref_notes = if params.reference.is_empty() {
            reference.note_count()
        } else {
            1
        };
        let max_notes = working.note_count().max(ref_notes);
        if max_notes > 1 {
            return Err(CoreError::HelmholtzCardinality {
                chords: 2,
                max_notes,
            });
        }
    }
    Ok(())
}

/// Fill an empty Helmholtz reference list from the reference chord's
/// original partial frequencies.
fn resolve_roughness_model(model: &RoughnessModel, reference: &ChordSpectrum) -> RoughnessModel {
    match model {
        RoughnessModel::Helmholtz(params) if params.reference.is_empty() => {
            let mut filled = params.clone();
            filled.reference = reference.partials().iter().map(|p| p.hz_orig).collect();
            RoughnessModel::Helmholtz(filled)
        }
        other => other.clone(),
    }
}

fn finalize(mut samples: Vec<f64>, normalize: bool) -> Result<Vec<f64>, CoreError> {
    if normalize {
        let max = samples.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v));
        if max <= 0.0 {
            return Err(CoreError::DegenerateNormalization);
        }
        for v in &mut samples {
            *v /= max;
        }
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::roughness::{HelmholtzParams, SetharesParams};
    use crate::core::spectrum::Timbre;

    fn sine(fund: f64) -> ChordSpectrum {
        ChordSpectrum::new(
            &[0.0],
            IntervalKind::SemitoneDiff,
            &Timbre::flat(&[1.0]),
            fund,
        )
    }

    #[test]
    fn domain_is_an_inclusive_linspace() {
        let domain = TransposeDomain::new(-0.5, 12.5, 1301, IntervalKind::SemitoneDiff);
        assert_eq!(domain.len(), 1301);
        assert_eq!(domain.positions()[0], -0.5);
        assert_eq!(domain.positions()[1300], 12.5);
        assert!((domain.positions()[1] - (-0.49)).abs() < 1e-12);
        let steps: Vec<f64> = domain.positions().windows(2).map(|w| w[1] - w[0]).collect();
        for s in steps {
            assert!((s - 0.01).abs() < 1e-10);
        }
    }

    #[test]
    #[should_panic(expected = "at least 2")]
    fn domain_rejects_single_point() {
        TransposeDomain::new(0.0, 1.0, 1, IntervalKind::SemitoneDiff);
    }

    #[test]
    fn domain_endpoints_are_exact_for_uneven_spans() {
        // Bounds whose span does not re-add to the stop in f64.
        let (start, stop) = (1.1, 5.7);
        assert_ne!(start + (stop - start), stop);

        let domain = TransposeDomain::new(start, stop, 17, IntervalKind::SemitoneDiff);
        assert_eq!(domain.positions()[0], start);
        assert_eq!(domain.positions()[16], stop);
        assert!(domain.positions().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn self_sweep_leaves_caller_chord_alone() {
        let tone = sine(220.0);
        let before = tone.clone();
        let domain = TransposeDomain::new(-2.0, 2.0, 41, IntervalKind::SemitoneDiff);

        let curve = roughness_curve(
            &tone,
            &tone,
            &domain,
            &RoughnessModel::default(),
            &CurveOptions::default(),
        )
        .unwrap();

        assert_eq!(curve.len(), 41);
        assert_eq!(tone, before);
        // Position 0 is the unison sample and sits in the middle.
        assert_eq!(curve[20], 0.0);
        assert!(curve.iter().all(|&v| v >= 0.0));
        assert!(curve[0] > 0.0 && curve[40] > 0.0);
    }

    #[test]
    fn normalized_curve_peaks_at_one() {
        let a = sine(220.0);
        let b = sine(220.0);
        let domain = TransposeDomain::new(-6.0, 6.0, 121, IntervalKind::SemitoneDiff);
        let curve = roughness_curve(
            &a,
            &b,
            &domain,
            &RoughnessModel::default(),
            &CurveOptions {
                normalize: true,
                ..CurveOptions::default()
            },
        )
        .unwrap();
        let max = curve.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!((max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn all_zero_curve_cannot_be_normalized() {
        // Both domain endpoints coincide at the unison, so every sample is 0.
        let tone = sine(220.0);
        let domain = TransposeDomain::new(0.0, 0.0, 2, IntervalKind::SemitoneDiff);
        let err = roughness_curve(
            &tone,
            &tone,
            &domain,
            &RoughnessModel::default(),
            &CurveOptions {
                normalize: true,
                ..CurveOptions::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, CoreError::DegenerateNormalization);
    }

    #[test]
    fn domain_kind_mismatch_is_eager() {
        let tone = sine(220.0);
        let domain = TransposeDomain::new(0.5, 2.0, 16, IntervalKind::ScaleFactor);
        let err = roughness_curve(
            &tone,
            &tone,
            &domain,
            &RoughnessModel::default(),
            &CurveOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CoreError::IntervalKindMismatch {
                chord: IntervalKind::SemitoneDiff,
                requested: IntervalKind::ScaleFactor,
            }
        );
    }

    #[test]
    fn crossterms_match_plain_curve_for_sine_pair() {
        // Single partials have no self-roughness, so dropping self terms
        // changes nothing.
        let a = sine(220.0);
        let b = sine(261.6);
        let domain = TransposeDomain::new(-3.0, 3.0, 61, IntervalKind::SemitoneDiff);
        let model = RoughnessModel::Sethares(SetharesParams::default());

        let plain = roughness_curve(&a, &b, &domain, &model, &CurveOptions::default()).unwrap();
        let cross = roughness_curve(
            &a,
            &b,
            &domain,
            &model,
            &CurveOptions {
                crossterms_only: true,
                ..CurveOptions::default()
            },
        )
        .unwrap();
        for (p, c) in plain.iter().zip(&cross) {
            assert!((p - c).abs() < 1e-12);
        }
    }

    #[test]
    fn crossterms_never_exceed_the_total() {
        let timbre = Timbre::new(&[1.0, 2.0, 3.0], &[1.0, 0.7, 0.4]);
        let a = ChordSpectrum::new(&[0.0], IntervalKind::SemitoneDiff, &timbre, 220.0);
        let b = ChordSpectrum::new(&[0.0], IntervalKind::SemitoneDiff, &timbre, 220.0);
        let domain = TransposeDomain::new(-2.0, 14.0, 33, IntervalKind::SemitoneDiff);
        let model = RoughnessModel::default();

        let plain = roughness_curve(&a, &b, &domain, &model, &CurveOptions::default()).unwrap();
        let cross = roughness_curve(
            &a,
            &b,
            &domain,
            &model,
            &CurveOptions {
                crossterms_only: true,
                ..CurveOptions::default()
            },
        )
        .unwrap();
        for (p, c) in plain.iter().zip(&cross) {
            assert!(c <= p);
        }
    }

    #[test]
    fn helmholtz_sweep_is_zero_at_reference() {
        let tone = sine(220.0);
        let domain = TransposeDomain::new(-2.0, 2.0, 5, IntervalKind::SemitoneDiff);
        let model = RoughnessModel::Helmholtz(HelmholtzParams::default());
        let curve = roughness_curve(&tone, &tone, &domain, &model, &CurveOptions::default())
            .unwrap();
        assert_eq!(curve[2], 0.0);
        assert!(curve[0] > 0.0 && curve[4] > 0.0);
    }

    #[test]
    fn helmholtz_sweep_rejects_chords_before_sampling() {
        let triad = ChordSpectrum::new(
            &[0.0, 4.0, 7.0],
            IntervalKind::SemitoneDiff,
            &Timbre::flat(&[1.0]),
            220.0,
        );
        let tone = sine(220.0);
        let domain = TransposeDomain::new(-1.0, 1.0, 3, IntervalKind::SemitoneDiff);
        let model = RoughnessModel::Helmholtz(HelmholtzParams::default());

        let err =
            roughness_curve(&tone, &triad, &domain, &model, &CurveOptions::default()).unwrap_err();
        assert_eq!(
            err,
            CoreError::HelmholtzCardinality {
                chords: 2,
                max_notes: 3
            }
        );
    }

    #[test]
    fn overlap_curve_peaks_at_unison() {
        let a = sine(220.0);
        let b = sine(220.0);
        let domain = TransposeDomain::new(-6.0, 6.0, 121, IntervalKind::SemitoneDiff);
        let curve = overlap_curve(
            &a,
            &b,
            &domain,
            &OverlapModel::default(),
            &CurveOptions {
                normalize: true,
                ..CurveOptions::default()
            },
        )
        .unwrap();
        assert_eq!(curve.len(), 121);
        // Unison sits at the domain midpoint and dominates.
        assert!((curve[60] - 1.0).abs() < 1e-12);
        assert!(curve.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn detailed_sweep_reports_loud_pairs() {
        let a = sine(220.0);
        let b = sine(220.0);
        let domain = TransposeDomain::new(-1.0, 1.0, 3, IntervalKind::SemitoneDiff);
        let detailed = roughness_curve_detailed(
            &a,
            &b,
            &domain,
            &RoughnessModel::default(),
            &SumOptions {
                show_partials: true,
                report_limit: 0.1,
            },
        )
        .unwrap();
        assert_eq!(detailed.len(), 3);
        // A semitone off unison beats hard; the unison itself reports nothing.
        assert_eq!(detailed[0].loud_pairs, vec![(0, 1)]);
        assert!(detailed[1].loud_pairs.is_empty());
        assert_eq!(detailed[2].loud_pairs, vec![(0, 1)]);
    }
}
