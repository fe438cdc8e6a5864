//! Settings for formstep
//!
//! Settings are assembled from layered sources merged in priority order
//! (environment variables > TOML file > defaults), then deserialized into
//! [`Settings`] and validated.
//!
//! ## Example
//!
//! ```
//! use formstep_conf::{EnvSource, SettingsBuilder};
//! use std::time::Duration;
//!
//! let settings = SettingsBuilder::new()
//!     .add_source(EnvSource::from_vars([("FORMSTEP_SUBMISSION__DELAY_MS", "500")]))
//!     .build()
//!     .unwrap();
//! assert_eq!(settings.submission.delay(), Duration::from_millis(500));
//! assert_eq!(settings.feedback.success_window(), Duration::from_secs(5));
//! ```

pub mod settings;
pub mod sources;

pub use settings::{
	FeedbackSettings, LoggingSettings, Settings, SettingsBuilder, SettingsError,
	StorageSettings, SubmissionSettings, VerificationSettings,
};
pub use sources::{ConfigSource, DefaultSource, EnvSource, SourceError, TomlFileSource};
