//! Core engine: pairwise roughness/overlap kernels, whole-spectrum summation,
//! and the transposition curve sweep.

pub mod curve;
pub mod hearing;
pub mod overlap;
pub mod pair;
pub mod roughness;
pub mod spectrum;

use crate::core::spectrum::IntervalKind;

/// Errors surfaced by spectrum construction, model selection and curve sweeps.
///
/// Exponential overflow in the Sethares-family formulas is deliberately *not*
/// here: it is recoverable, logged through `tracing` and replaced by a zero
/// contribution so a sweep never aborts mid-curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Unrecognized interval/transposition tag (expected ST_DIFF,
    /// SCALE_FACTOR or HZ_SHIFT).
    InvalidIntervalKind(String),
    /// Unrecognized roughness/overlap model name.
    InvalidModel(String),
    /// `transpose` called with a kind that disagrees with the chord's own
    /// interval kind.
    IntervalKindMismatch {
        chord: IntervalKind,
        requested: IntervalKind,
    },
    /// Helmholtz summation requested for something other than one single-note
    /// spectrum against a single reference tone.
    HelmholtzCardinality { chords: usize, max_notes: usize },
    /// Peak normalization requested on a curve whose maximum is not positive.
    DegenerateNormalization,
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreError::InvalidIntervalKind(tag) => {
                write!(f, "invalid chord structure type: {tag}")
            }
            CoreError::InvalidModel(name) => {
                write!(f, "invalid assessment function type: {name}")
            }
            CoreError::IntervalKindMismatch { chord, requested } => write!(
                f,
                "transpose kind {requested} disagrees with chord kind {chord}"
            ),
            CoreError::HelmholtzCardinality { chords, max_notes } => write!(
                f,
                "Helmholtz model needs two single tones, got {chords} chord(s) with up to {max_notes} note(s)"
            ),
            CoreError::DegenerateNormalization => {
                write!(f, "cannot peak-normalize a curve with non-positive maximum")
            }
        }
    }
}

impl std::error::Error for CoreError {}
