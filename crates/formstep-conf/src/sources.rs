//! Configuration sources for layered settings

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source as top-level sections
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Required configuration file not found: {0}")]
	Missing(PathBuf),
}

/// Built-in defaults, lowest priority
pub struct DefaultSource;

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let value = serde_json::to_value(crate::Settings::default())?;
		match value {
			Value::Object(map) => Ok(map.into_iter().collect()),
			_ => Err(SourceError::Parse("Expected object at root".to_string())),
		}
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Defaults".to_string()
	}
}

/// TOML file configuration source
pub struct TomlFileSource {
	path: PathBuf,
	required: bool,
}

impl TomlFileSource {
	/// Create an optional TOML source; a missing file contributes nothing
	///
	/// # Examples
	///
	/// ```
	/// use formstep_conf::{ConfigSource, TomlFileSource};
	///
	/// let source = TomlFileSource::new("does-not-exist.toml");
	/// assert!(source.load().unwrap().is_empty());
	/// ```
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			required: false,
		}
	}

	/// Fail loading when the file does not exist
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			if self.required {
				return Err(SourceError::Missing(self.path.clone()));
			}
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		let map = json_value
			.as_object()
			.ok_or_else(|| SourceError::Parse("Expected object at root".to_string()))?;

		Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// Environment variable configuration source
///
/// `FORMSTEP_SUBMISSION__DELAY_MS=1500` sets `submission.delay_ms`; a double
/// underscore separates the section from the key.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

/// Default prefix for environment variables.
pub const ENV_PREFIX: &str = "FORMSTEP_";

impl EnvSource {
	/// Read the process environment
	pub fn new() -> Self {
		Self {
			prefix: ENV_PREFIX.to_string(),
			vars: None,
		}
	}

	/// Read a fixed set of variables instead of the process environment
	///
	/// # Examples
	///
	/// ```
	/// use formstep_conf::{ConfigSource, EnvSource};
	/// use serde_json::json;
	///
	/// let source = EnvSource::from_vars([
	///     ("FORMSTEP_LOGGING__LEVEL", "debug"),
	///     ("FORMSTEP_LOGGING__ANSI", "false"),
	///     ("HOME", "/root"),
	/// ]);
	/// let config = source.load().unwrap();
	/// assert_eq!(config["logging"], json!({"level": "debug", "ansi": false}));
	/// assert!(!config.contains_key("home"));
	/// ```
	pub fn from_vars<I, K, V>(vars: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self {
			prefix: ENV_PREFIX.to_string(),
			vars: Some(
				vars.into_iter()
					.map(|(k, v)| (k.into(), v.into()))
					.collect(),
			),
		}
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	fn vars(&self) -> Vec<(String, String)> {
		match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::new()
	}
}

/// Type a variable's value; numbers only when they print back unchanged, so `007` stays text
fn parse_env_value(value: String) -> Value {
	if let Ok(num) = value.parse::<i64>()
		&& num.to_string() == value
	{
		Value::Number(num.into())
	} else if let Ok(b) = value.parse::<bool>() {
		Value::Bool(b)
	} else {
		Value::String(value)
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let mut config: IndexMap<String, Value> = IndexMap::new();

		for (key, value) in self.vars() {
			let Some(clean_key) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let lower_key = clean_key.to_lowercase();

			let Some((section, field)) = lower_key.split_once("__") else {
				tracing::warn!(variable = %key, "ignoring variable without a section");
				continue;
			};

			let entry = config
				.entry(section.to_string())
				.or_insert_with(|| Value::Object(Default::default()));
			match entry {
				Value::Object(map) => {
					map.insert(field.to_string(), parse_env_value(value));
				}
				_ => {
					return Err(SourceError::Parse(format!(
						"Section '{}' is not a table",
						section
					)));
				}
			}
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}
