//! Global `tracing` subscriber setup

use formstep_conf::LoggingSettings;
use tracing_subscriber::EnvFilter;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
	#[error("Invalid log filter '{directive}': {reason}")]
	InvalidFilter { directive: String, reason: String },
}

/// Install a fmt subscriber filtered by `settings.level`
///
/// `RUST_LOG`, when set, takes precedence over the configured level.
/// Returns `Ok(false)` when a global subscriber was already installed, so
/// calling this more than once is harmless.
///
/// # Examples
///
/// ```
/// use formstep_conf::LoggingSettings;
/// use formstep_utils::init_logging;
///
/// let settings = LoggingSettings::default();
/// init_logging(&settings).unwrap();
/// assert!(!init_logging(&settings).unwrap());
/// ```
pub fn init_logging(settings: &LoggingSettings) -> Result<bool, LoggingError> {
	let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
		Ok(directive) if !directive.trim().is_empty() => build_filter(&directive)?,
		_ => build_filter(&settings.level)?,
	};

	let installed = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_ansi(settings.ansi)
		.with_target(true)
		.try_init()
		.is_ok();

	if installed {
		tracing::debug!(level = %settings.level, "logging initialised");
	}
	Ok(installed)
}

fn build_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
	EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
		directive: directive.to_string(),
		reason: e.to_string(),
	})
}
