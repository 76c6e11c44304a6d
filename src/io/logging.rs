//! Tracing subscriber setup for the command-line tool

use tracing::Level;

/// Pick the log level from the quiet/verbose switches
///
/// Quiet wins when both are given.
pub const fn level_for(quiet: bool, verbose: bool) -> Level {
    if quiet {
        Level::WARN
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Install the global stderr subscriber
///
/// Returns false when a subscriber was already installed, which leaves the
/// existing one in place.
pub fn init(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
