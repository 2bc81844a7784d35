//! Diagnostics for sdf itself, always on stderr.
//!
//! Stdout carries product output only (usage, command messages, traced
//! paths), so `sdf trace vim > opened.txt` never captures log lines.
//!
//! `SDF_LOG` takes precedence over `RUST_LOG`; either accepts
//! `EnvFilter` directives such as `sdf=info` or `sdf::trace=trace`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "SDF_LOG";
/// Best-effort engine failures are logged at `info`, below this.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Pick the filter directive: `SDF_LOG`, then `RUST_LOG`, then the default.
/// Blank values count as unset.
pub fn directive(sdf_log: Option<String>, rust_log: Option<String>) -> String {
    [sdf_log, rust_log]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.to_string())
}

/// Install the stderr subscriber.
///
/// An unparsable directive falls back to the default.
pub fn init() {
    let directive = directive(
        std::env::var(LOG_ENV).ok(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
    );
    let filter =
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false)
                .compact(),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sdf_log_wins_over_rust_log() {
        assert_eq!(
            directive(Some("sdf=debug".to_string()), Some("info".to_string())),
            "sdf=debug"
        );
    }

    #[test]
    fn rust_log_is_used_when_sdf_log_is_blank() {
        assert_eq!(
            directive(Some("  ".to_string()), Some("sdf=info".to_string())),
            "sdf=info"
        );
    }

    #[test]
    fn default_is_warn() {
        assert_eq!(directive(None, None), DEFAULT_DIRECTIVE);
    }
}
