//! Log output for the `decksmith` binary.
//!
//! Logs go to stderr; stdout is reserved for result paths and JSON output.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Log line encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    /// Newline-delimited JSON.
    Json,
}

/// Crates whose events are shown at the requested level.
const DECKSMITH_TARGETS: [&str; 6] = [
    "decksmith",
    "decksmith_card",
    "decksmith_evaluator",
    "decksmith_genetic",
    "decksmith_research",
    "decksmith_stats",
];

/// Filter used when `RUST_LOG` is unset: dependencies at `warn`, our crates
/// at `level`.
fn default_directives(level: Level) -> String {
    let mut directives = String::from("warn");
    for target in DECKSMITH_TARGETS {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level.as_str());
    }
    directives
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(format: LogFormat, level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let text = (format == LogFormat::Text)
        .then(|| fmt::layer().with_target(false).with_writer(std::io::stderr));
    let json = (format == LogFormat::Json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .try_init()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        let directives = default_directives(Level::DEBUG);
        assert!(directives.starts_with("warn,decksmith=DEBUG,"));
        assert!(directives.contains("decksmith_genetic=DEBUG"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
