//! Sampled semantic validation of selected layouts

/// Deterministic choice of representative frames
pub mod sampler;
/// Scoring capability interface and the external process adapter
pub mod scorer;
/// Single shared scoring worker with per-sheet deadlines
pub mod service;
/// Per-sheet verdicts from sampled frame scores
pub mod validator;
