//! Tracing subscriber setup.

use tracing::level_filters::LevelFilter;

/// Install the global stderr subscriber. `verbosity` counts `-v` flags.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
