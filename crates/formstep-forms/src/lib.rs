//! Multi-step form processing for formstep
//!
//! This crate provides the engine shared by every form variant:
//! - Field model with string and boolean values
//! - Field registry declaring the ordered steps of each variant
//! - Validation engine producing per-field error messages
//! - Wizard state machine gating navigation and submission on validation

pub mod field;
pub mod registry;
pub mod validation;
pub mod wizard;

pub use field::{FieldKind, FieldSpec, FieldValue, FormValues};
pub use registry::{
	FormVariant, RegistryError, StepDefinition, WizardDefinition, WizardDefinitionBuilder,
	steps_for,
};
pub use validation::{
	CAPTCHA_ERROR_KEY, ErrorMap, ValidationErrorKind, validate, violations,
};
pub use wizard::{FormWizard, Transition, WizardError, WizardResult, WizardSession};
