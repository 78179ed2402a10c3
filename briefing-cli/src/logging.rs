//! Logs go to stderr so stdout only carries the summary.
//!
//! `RUST_LOG` takes precedence over `-v`:
//! ```bash
//! RUST_LOG=briefing_core=debug briefing weather --city Oslo
//! ```

use tracing_subscriber::EnvFilter;

/// Level for a `-v` count: warn, info, debug, then trace.
fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init(verbosity: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level_for(verbosity))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
