// core/hearing.rs
// Auditory frequency-warping models shared by the pairwise kernels.

/// Bark rate (Zwicker & Terhardt 1980 convention, eq. 6 of Terhardt,
/// Stoll & Seewann 1982).
pub fn bark_zwicker(hz: f64) -> f64 {
    let khz = hz / 1000.0;
    13.0 * (0.76 * khz).atan() + 3.5 * ((khz / 7.5).powi(2)).atan()
}

/// Critical bandwidth in Hz, Voelk 2015 revision of the Zwicker curve.
///
/// The second factor pulls the bandwidth toward zero below ~50 Hz, where the
/// plain Zwicker formula overestimates.
pub fn cbw_volk(hz: f64) -> f64 {
    let khz = hz / 1000.0;
    let gz = 25.0 + 75.0 * (1.0 + 1.4 * khz * khz).powf(0.69);
    gz * (1.0 - 1.0 / ((38.73 * khz).powi(2) + 1.0))
}

/// Critical bandwidth in Hz, Zwicker & Terhardt 1980.
pub fn cbw_zwicker(hz: f64) -> f64 {
    let khz = hz / 1000.0;
    25.0 + 75.0 * (1.0 + 1.4 * khz * khz).powf(0.69)
}
