//! Diagnostic output of the binary. Results go to stdout, logs to stderr.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Level selected by the global flags; `--quiet` wins over `--debug`.
pub fn level(debug: bool, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::OFF
    } else if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
}

/// Installs the stderr subscriber. `RUST_LOG` refines the filter unless
/// `--quiet` is set.
pub fn init(debug: bool, quiet: bool) {
    let level = level(debug, quiet);
    let filter = match std::env::var("RUST_LOG") {
        Ok(spec) if !quiet => EnvFilter::builder()
            .with_default_directive(level.into())
            .parse_lossy(spec),
        _ => EnvFilter::default().add_directive(level.into()),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if debug && !quiet {
        tracing::debug!("Debug mode enabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_overrides_debug() {
        assert_eq!(level(true, true), LevelFilter::OFF);
        assert_eq!(level(true, false), LevelFilter::DEBUG);
        assert_eq!(level(false, false), LevelFilter::INFO);
    }
}
