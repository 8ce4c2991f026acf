//! Psychoacoustic roughness and spectral-overlap curves for tone complexes.
//!
//! `core` holds the pair models (Helmholtz, Sethares, critical-bandwidth,
//! Parncutt), the spectrum data model and the transposition sweep engine.
//! `presets` supplies common timbres, tones and sweep domains; `figures`
//! and the `curve_plots` binary reproduce the reference figures.

pub mod config;
pub mod core;
pub mod figures;
pub mod presets;
