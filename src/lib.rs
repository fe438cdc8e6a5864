//! # formstep
//!
//! Multi-step form wizards: a registry of step layouts, per-step validation,
//! a navigation state machine and an asynchronous submission workflow with
//! timed feedback.
//!
//! ## Feature Flags
//!
//! - `forms` - field registry, validation engine, wizard state machine
//! - `tasks` - cancellable delayed tasks
//! - `conf` - layered settings (defaults, TOML file, `FORMSTEP_*` variables)
//! - `utils` - visit counter storage and logging setup
//! - `pages` - mounted form controllers, submission, feedback, theme, routing
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use formstep::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::load(Some(std::path::Path::new("formstep.toml")))?;
//! init_logging(&settings.logging)?;
//!
//! let form = FormController::for_path(&FormRouter::default(), "/multi")?
//!     .with_settings(settings)
//!     .mount()
//!     .await?;
//!
//! form.change_field("fullName", "Ada Lovelace").await?;
//! form.advance().await?;
//! println!("{}", form.snapshot().await?.step_label);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "conf")]
pub mod conf;
#[cfg(feature = "forms")]
pub mod forms;
#[cfg(feature = "pages")]
pub mod pages;
#[cfg(feature = "tasks")]
pub mod tasks;
#[cfg(feature = "utils")]
pub mod utils;

pub mod prelude {
	#[cfg(feature = "forms")]
	pub use crate::forms::{
		ErrorMap, FieldKind, FieldSpec, FieldValue, FormValues, FormVariant, FormWizard,
		Transition, WizardDefinition, WizardError, steps_for, validate,
	};

	#[cfg(feature = "tasks")]
	pub use crate::tasks::TaskGroup;

	#[cfg(feature = "conf")]
	pub use crate::conf::{Settings, SettingsBuilder, SettingsError};

	#[cfg(feature = "utils")]
	pub use crate::utils::{KeyValueStore, VisitCounter, init_logging};

	#[cfg(feature = "pages")]
	pub use crate::pages::{
		ControllerError, FormController, FormHandle, FormRouter, FormSnapshot,
		SubmissionBackend, Theme,
	};
}
