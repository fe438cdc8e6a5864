use crate::field::{FieldKind, FieldValue, FormValues};
use crate::registry::{FormVariant, StepDefinition, WizardDefinition, steps_for};
use crate::validation::{ErrorMap, validate};
use serde::Serialize;
use std::sync::Arc;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
	#[error("Already at last step")]
	AlreadyAtLastStep,
	#[error("Already at first step")]
	AlreadyAtFirstStep,
	#[error("Submission is only possible from step {terminal} (currently at step {current})")]
	NotAtTerminalStep { current: usize, terminal: usize },
	#[error("A submission is already in progress")]
	SubmissionInProgress,
	#[error("No submission is in progress")]
	NotSubmitting,
}

pub type WizardResult<T> = Result<T, WizardError>;

/// Result of a navigation or submission request that was not misuse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
	/// The current step changed
	Moved { from: usize, to: usize },
	/// Validation failed; the errors are now exposed on the session
	Blocked(ErrorMap),
	/// The terminal step validated and the session is now submitting these values
	Submitting(FormValues),
}

/// Mutable state of one form instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardSession {
	pub current_step: usize,
	pub values: FormValues,
	pub errors: ErrorMap,
	pub is_submitting: bool,
	pub is_verified_by_captcha: bool,
}

impl WizardSession {
	/// Step 1, empty defaults, no errors, not submitting
	pub fn initial(definition: &WizardDefinition) -> Self {
		Self {
			current_step: 1,
			values: FormValues::defaults_for(definition.fields()),
			errors: ErrorMap::new(),
			is_submitting: false,
			is_verified_by_captcha: false,
		}
	}
}

/// FormWizard drives a [`WizardSession`] through the steps of a [`WizardDefinition`]
///
/// All mutation goes through the named transitions below.
pub struct FormWizard {
	definition: Arc<WizardDefinition>,
	session: WizardSession,
}

impl FormWizard {
	/// Create a wizard positioned on the first step
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FormWizard, FormVariant, steps_for};
	///
	/// let wizard = FormWizard::new(steps_for(FormVariant::TwoStep));
	/// assert_eq!(wizard.current_step(), 1);
	/// assert_eq!(wizard.total_steps(), 2);
	/// assert!(wizard.errors().is_empty());
	/// ```
	pub fn new(definition: impl Into<Arc<WizardDefinition>>) -> Self {
		let definition = definition.into();
		let session = WizardSession::initial(&definition);
		Self {
			definition,
			session,
		}
	}

	pub fn for_variant(variant: FormVariant) -> Self {
		Self::new(steps_for(variant))
	}

	pub fn definition(&self) -> &Arc<WizardDefinition> {
		&self.definition
	}

	pub fn session(&self) -> &WizardSession {
		&self.session
	}

	pub fn current_step(&self) -> usize {
		self.session.current_step
	}

	pub fn current_step_definition(&self) -> Option<&StepDefinition> {
		self.definition.step(self.session.current_step)
	}

	fn validate_current(&self) -> ErrorMap {
		self.current_step_definition()
			.map(|step| validate(step, &self.session.values))
			.unwrap_or_default()
	}

	pub fn total_steps(&self) -> usize {
		self.definition.step_count()
	}

	pub fn is_first_step(&self) -> bool {
		self.session.current_step == 1
	}

	pub fn is_last_step(&self) -> bool {
		self.session.current_step >= self.definition.step_count()
	}

	pub fn values(&self) -> &FormValues {
		&self.session.values
	}

	pub fn errors(&self) -> &ErrorMap {
		&self.session.errors
	}

	pub fn is_submitting(&self) -> bool {
		self.session.is_submitting
	}

	pub fn is_verified_by_captcha(&self) -> bool {
		self.session.is_verified_by_captcha
	}

	/// "Step N of M"
	pub fn step_label(&self) -> String {
		format!("Step {} of {}", self.current_step(), self.total_steps())
	}

	/// Whether the tracker marks step `index` as reached
	pub fn is_step_reached(&self, index: usize) -> bool {
		index >= 1 && index <= self.session.current_step
	}

	pub fn progress_percentage(&self) -> f32 {
		(self.session.current_step as f32 / self.total_steps() as f32) * 100.0
	}

	/// Store a new value and revalidate the current step
	///
	/// Values for declared fields are first coerced to the field's kind (see
	/// [`FieldSpec::coerce`](crate::field::FieldSpec::coerce)), so text can never stand in
	/// for a checked box or a confirmed verification.
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FormWizard, FormVariant};
	///
	/// let mut wizard = FormWizard::for_variant(FormVariant::FourStep);
	/// let errors = wizard.on_field_change("fullName", "");
	/// assert_eq!(errors.get("fullName"), Some("Full Name is required"));
	///
	/// let errors = wizard.on_field_change("fullName", "Ada");
	/// assert!(errors.is_empty());
	/// assert_eq!(wizard.current_step(), 1);
	/// ```
	pub fn on_field_change(
		&mut self,
		name: impl Into<String>,
		value: impl Into<FieldValue>,
	) -> &ErrorMap {
		let name = name.into();
		let mut value = value.into();

		if let Some(field) = self.definition.fields().find(|field| field.name == name) {
			value = field.coerce(value);
			if field.kind == FieldKind::Verification {
				self.session.is_verified_by_captcha = value.as_bool().unwrap_or(false);
			}
		}

		tracing::trace!(field = %name, step = self.session.current_step, "field changed");
		self.session.values = self.session.values.with(name, value);
		self.session.errors = self.validate_current();
		&self.session.errors
	}

	/// Record the outcome of the human-verification widget
	///
	/// Only the verification entry of the error map is touched.
	pub fn on_verification(&mut self, verified: bool) {
		self.session.is_verified_by_captcha = verified;

		let Some(field) = self.definition.verification_field() else {
			return;
		};
		self.session.values = self.session.values.with(field.name.clone(), verified);

		if verified {
			self.session.errors.remove(field.error_key());
		} else if self
			.current_step_definition()
			.is_some_and(|step| step.verification_field().is_some())
		{
			self.session
				.errors
				.insert(field.error_key(), field.error_message());
		}
		tracing::debug!(verified, "verification updated");
	}

	/// Move to the next step if the current one validates
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FormWizard, FormVariant, Transition};
	///
	/// let mut wizard = FormWizard::for_variant(FormVariant::FourStep);
	/// assert!(matches!(wizard.advance(), Ok(Transition::Blocked(_))));
	/// assert_eq!(wizard.current_step(), 1);
	///
	/// wizard.on_field_change("fullName", "Ada");
	/// assert_eq!(wizard.advance(), Ok(Transition::Moved { from: 1, to: 2 }));
	/// ```
	pub fn advance(&mut self) -> WizardResult<Transition> {
		if self.session.is_submitting {
			return Err(WizardError::SubmissionInProgress);
		}
		if self.is_last_step() {
			return Err(WizardError::AlreadyAtLastStep);
		}

		let errors = self.validate_current();
		if !errors.is_empty() {
			tracing::debug!(step = self.session.current_step, errors = errors.len(), "advance blocked");
			self.session.errors = errors.clone();
			return Ok(Transition::Blocked(errors));
		}

		let from = self.session.current_step;
		self.session.current_step += 1;
		self.session.errors.clear();
		tracing::debug!(from, to = self.session.current_step, "advanced");
		Ok(Transition::Moved {
			from,
			to: self.session.current_step,
		})
	}

	/// Move to the previous step without validating or touching values and errors
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FormWizard, FormVariant, Transition, WizardError};
	///
	/// let mut wizard = FormWizard::for_variant(FormVariant::TwoStep);
	/// assert_eq!(wizard.retreat(), Err(WizardError::AlreadyAtFirstStep));
	///
	/// wizard.on_field_change("fullName", "Ada");
	/// wizard.on_field_change("address", "London");
	/// wizard.advance().unwrap();
	/// assert_eq!(wizard.retreat(), Ok(Transition::Moved { from: 2, to: 1 }));
	/// ```
	pub fn retreat(&mut self) -> WizardResult<Transition> {
		if self.session.is_submitting {
			return Err(WizardError::SubmissionInProgress);
		}
		if self.is_first_step() {
			return Err(WizardError::AlreadyAtFirstStep);
		}

		let from = self.session.current_step;
		self.session.current_step -= 1;
		tracing::debug!(from, to = self.session.current_step, "retreated");
		Ok(Transition::Moved {
			from,
			to: self.session.current_step,
		})
	}

	/// Validate the terminal step and enter the submitting state
	pub fn submit(&mut self) -> WizardResult<Transition> {
		if self.session.is_submitting {
			return Err(WizardError::SubmissionInProgress);
		}
		if !self.is_last_step() {
			return Err(WizardError::NotAtTerminalStep {
				current: self.session.current_step,
				terminal: self.total_steps(),
			});
		}

		let errors = self.validate_current();
		if !errors.is_empty() {
			tracing::debug!(errors = errors.len(), "submit blocked");
			self.session.errors = errors.clone();
			return Ok(Transition::Blocked(errors));
		}

		self.session.errors.clear();
		self.session.is_submitting = true;
		tracing::debug!("submitting");
		Ok(Transition::Submitting(self.session.values.clone()))
	}

	/// Finish a submission successfully: the session starts over
	pub fn complete_submission(&mut self) -> WizardResult<()> {
		if !self.session.is_submitting {
			return Err(WizardError::NotSubmitting);
		}
		self.reset();
		Ok(())
	}

	/// Abandon a submission, staying on the terminal step with values and errors intact
	pub fn fail_submission(&mut self) -> WizardResult<()> {
		if !self.session.is_submitting {
			return Err(WizardError::NotSubmitting);
		}
		self.session.is_submitting = false;
		Ok(())
	}

	pub fn reset(&mut self) {
		self.session = WizardSession::initial(&self.definition);
	}
}
