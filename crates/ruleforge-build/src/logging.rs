//! Tracing subscriber setup.

use std::io;

use ruleforge_config::LoggingConfig;
use ruleforge_core::{DEFAULT_LOG_FORMAT, DEFAULT_LOG_LEVEL, DEFAULT_LOG_OUTPUT};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Build the filter directive from the base level and per-module filters.
fn filter_directive(config: &LoggingConfig) -> String {
    let mut directive = config
        .level
        .as_deref()
        .unwrap_or(DEFAULT_LOG_LEVEL)
        .to_string();
    let mut filters: Vec<_> = config.filters.iter().collect();
    filters.sort();
    for (module, level) in filters {
        directive.push(',');
        directive.push_str(module);
        directive.push('=');
        directive.push_str(level);
    }
    directive
}

/// Install the global subscriber described by `config`.
///
/// An unparsable filter directive falls back to the default level. Calling
/// this twice keeps the first subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(filter_directive(config))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));
    let writer = match config.output.as_deref().unwrap_or(DEFAULT_LOG_OUTPUT) {
        "stdout" => BoxMakeWriter::new(io::stdout),
        _ => BoxMakeWriter::new(io::stderr),
    };
    let layer = fmt::layer().with_writer(writer);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format.as_deref().unwrap_or(DEFAULT_LOG_FORMAT) {
        "json" => layer.json().boxed(),
        "compact" => layer.compact().boxed(),
        _ => layer.boxed(),
    };

    let _ = tracing_subscriber::registry()
        .with(layer.with_filter(filter))
        .try_init();
}
