// core/pair.rs
// Shared primitives for the pairwise kernels: amplitude weighting,
// spectral distance, and the Sethares curve-fit constants.

/// Beat rates below this are heard as loudness fluctuation, not roughness.
pub const SLOW_BEAT_LIMIT_HZ: f64 = 15.0;

/// How a pair of partial amplitudes collapses into one pair weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmpScale {
    /// Weaker partial dominates. Matches Sethares' 1993 revision.
    Min,
    /// Plain product, as in the original MATLAB curve fit.
    Product,
}

impl Default for AmpScale {
    fn default() -> Self {
        AmpScale::Min
    }
}

#[inline]
pub fn pair_volume(amp_a: f64, amp_b: f64, scale: AmpScale) -> f64 {
    match scale {
        AmpScale::Min => amp_a.min(amp_b),
        AmpScale::Product => amp_a * amp_b,
    }
}

#[inline]
pub fn pair_distance(hz_a: f64, hz_b: f64) -> f64 {
    (hz_a - hz_b).abs()
}

/// Fit parameters for the Sethares (1993) sensory dissonance curve.
///
/// `a` and `b` set the rise and fall of the two exponentials, `s_star`,
/// `s1` and `s2` place the curve maximum at roughly a quarter of the
/// critical bandwidth of the lower partial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SetharesConstants {
    pub a: f64,
    pub b: f64,
    pub s_star: f64,
    pub s1: f64,
    pub s2: f64,
}

impl SetharesConstants {
    /// Constants from Sethares' published MATLAB code.
    pub const MATLAB: Self = Self {
        a: 3.51,
        b: 5.75,
        s_star: 0.24,
        s1: 0.0207,
        s2: 18.96,
    };

    /// Rounded constants as printed in the 1993 paper.
    pub const PAPER_1993: Self = Self {
        a: 3.5,
        b: 5.75,
        s_star: 0.24,
        s1: 0.021,
        s2: 19.0,
    };
}

impl Default for SetharesConstants {
    fn default() -> Self {
        Self::MATLAB
    }
}
