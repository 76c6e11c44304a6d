//! Input/output operations, configuration and error handling

/// Command-line interface and stage orchestration
pub mod cli;
/// Pipeline constants and runtime configuration defaults
pub mod configuration;
/// Error types shared by every stage
pub mod error;
/// Sprite sheet decoding, cropping and PNG export
pub mod image;
/// Tracing subscriber setup
pub mod logging;
/// Per-stage progress display
pub mod progress;
/// JSON stage documents
pub mod store;
