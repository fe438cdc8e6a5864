//! Typed settings and the builder that merges sources into them

use crate::sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Your form has been submitted successfully!";

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Failed to load {source_name}: {error}")]
	Source {
		source_name: String,
		#[source]
		error: SourceError,
	},

	#[error("Failed to deserialize settings: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid setting {key}: {reason}")]
	Invalid { key: &'static str, reason: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
	Text(String),
	Integer(i64),
	Float(f64),
	Flag(bool),
}

/// String settings also take numbers and booleans, which environment values are typed as
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Scalar::deserialize(deserializer)? {
		Scalar::Text(text) => text,
		Scalar::Integer(n) => n.to_string(),
		Scalar::Float(f) => f.to_string(),
		Scalar::Flag(b) => b.to_string(),
	})
}

/// Simulated submission round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionSettings {
	pub delay_ms: u64,
}

impl SubmissionSettings {
	pub fn delay(&self) -> Duration {
		Duration::from_millis(self.delay_ms)
	}
}

impl Default for SubmissionSettings {
	fn default() -> Self {
		Self { delay_ms: 2000 }
	}
}

/// Success acknowledgement shown after a completed submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackSettings {
	pub success_display_ms: u64,
	#[serde(deserialize_with = "lenient_string")]
	pub success_message: String,
}

impl FeedbackSettings {
	pub fn success_window(&self) -> Duration {
		Duration::from_millis(self.success_display_ms)
	}
}

impl Default for FeedbackSettings {
	fn default() -> Self {
		Self {
			success_display_ms: 5000,
			success_message: DEFAULT_SUCCESS_MESSAGE.to_string(),
		}
	}
}

/// Human-verification widget
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationSettings {
	/// Public site key handed to the widget. Empty means no widget configured.
	#[serde(deserialize_with = "lenient_string")]
	pub site_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
	#[serde(deserialize_with = "lenient_string")]
	pub visit_counter_key: String,
	/// JSON file backing the visit counter; in-memory when unset
	pub path: Option<PathBuf>,
}

impl Default for StorageSettings {
	fn default() -> Self {
		Self {
			visit_counter_key: "visitCount".to_string(),
			path: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
	/// `EnvFilter` directive, e.g. `info` or `formstep_pages=debug`
	#[serde(deserialize_with = "lenient_string")]
	pub level: String,
	pub ansi: bool,
}

impl Default for LoggingSettings {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			ansi: true,
		}
	}
}

/// All formstep settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub submission: SubmissionSettings,
	pub feedback: FeedbackSettings,
	pub verification: VerificationSettings,
	pub storage: StorageSettings,
	pub logging: LoggingSettings,
}

impl Settings {
	/// Defaults, then an optional TOML file, then `FORMSTEP_*` variables
	pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
		let mut builder = SettingsBuilder::new();
		if let Some(path) = path {
			builder = builder.add_source(TomlFileSource::new(path));
		}
		builder.add_source(EnvSource::new()).build()
	}

	pub fn validate(&self) -> Result<(), SettingsError> {
		if self.submission.delay_ms == 0 {
			return Err(SettingsError::Invalid {
				key: "submission.delay_ms",
				reason: "must be greater than zero".to_string(),
			});
		}
		if self.feedback.success_display_ms == 0 {
			return Err(SettingsError::Invalid {
				key: "feedback.success_display_ms",
				reason: "must be greater than zero".to_string(),
			});
		}
		if self.storage.visit_counter_key.trim().is_empty() {
			return Err(SettingsError::Invalid {
				key: "storage.visit_counter_key",
				reason: "must not be empty".to_string(),
			});
		}
		Ok(())
	}
}

/// Merges configuration sources by priority
///
/// [`DefaultSource`] is always present, so sources only need to carry the
/// keys they override.
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self {
			sources: vec![Box::new(DefaultSource)],
		}
	}

	pub fn add_source<S: ConfigSource + 'static>(mut self, source: S) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merge, deserialize and validate
	pub fn build(mut self) -> Result<Settings, SettingsError> {
		// Stable sort keeps insertion order between equal priorities.
		self.sources.sort_by_key(|source| source.priority());

		let mut merged: IndexMap<String, Value> = IndexMap::new();
		for source in &self.sources {
			let layer = source.load().map_err(|error| SettingsError::Source {
				source_name: source.description(),
				error,
			})?;
			tracing::debug!(source = %source.description(), keys = layer.len(), "loaded configuration layer");
			for (key, value) in layer {
				match merged.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						merged.insert(key, value);
					}
				}
			}
		}

		let root = Value::Object(merged.into_iter().collect());
		let settings: Settings = serde_json::from_value(root)?;
		settings.validate()?;
		Ok(settings)
	}
}

impl Default for SettingsBuilder {
	fn default() -> Self {
		Self::new()
	}
}

fn merge_value(base: &mut Value, overlay: Value) {
	match (base, overlay) {
		(Value::Object(base), Value::Object(overlay)) => {
			for (key, value) in overlay {
				match base.get_mut(&key) {
					Some(existing) => merge_value(existing, value),
					None => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, overlay) => *base = overlay,
	}
}
