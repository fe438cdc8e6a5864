//! Validation engine
//!
//! Rules are applied to every field of the active step independently; all violations
//! are collected. Fields that do not belong to the step are never looked at, so a
//! value entered on another step cannot produce an error here.

use crate::field::{FieldKind, FieldSpec, FormValues};
use crate::registry::StepDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Error-map key of the human-verification violation.
pub const CAPTCHA_ERROR_KEY: &str = "captcha";

/// Why a field is in violation
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationErrorKind {
	#[error("{0} is required")]
	MissingRequiredField(String),
	#[error("Terms not accepted")]
	TermsNotAccepted,
	#[error("Human verification not confirmed")]
	VerificationNotConfirmed,
}

/// Field name to message, holding only the fields currently in violation
///
/// # Examples
///
/// ```
/// use formstep_forms::ErrorMap;
///
/// let mut errors = ErrorMap::new();
/// assert!(errors.is_empty());
/// errors.insert("email", "Email is required");
/// assert_eq!(errors.get("email"), Some("Email is required"));
/// assert!(!errors.contains("phone"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<String, String>);

impl ErrorMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.insert(field.into(), message.into());
	}

	pub fn remove(&mut self, field: &str) -> Option<String> {
		self.0.remove(field)
	}

	pub fn get(&self, field: &str) -> Option<&str> {
		self.0.get(field).map(String::as_str)
	}

	pub fn contains(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn clear(&mut self) {
		self.0.clear();
	}

	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

fn check(field: &FieldSpec, values: &FormValues) -> Option<ValidationErrorKind> {
	if !field.required || !field.is_unfilled(values) {
		return None;
	}
	Some(match field.kind {
		FieldKind::Acceptance => ValidationErrorKind::TermsNotAccepted,
		FieldKind::Verification => ValidationErrorKind::VerificationNotConfirmed,
		_ => ValidationErrorKind::MissingRequiredField(field.name.clone()),
	})
}

/// Every violated rule of `step`, in declaration order
pub fn violations<'a>(
	step: &'a StepDefinition,
	values: &FormValues,
) -> Vec<(&'a FieldSpec, ValidationErrorKind)> {
	step.fields
		.iter()
		.filter_map(|field| check(field, values).map(|kind| (field, kind)))
		.collect()
}

/// Validate `values` against the rules of `step`
///
/// # Examples
///
/// ```
/// use formstep_forms::{FormValues, FormVariant, steps_for, validate};
///
/// let definition = steps_for(FormVariant::FourStep);
/// let step = definition.step(1).unwrap();
///
/// let errors = validate(step, &FormValues::new());
/// assert_eq!(errors.get("fullName"), Some("Full Name is required"));
///
/// let errors = validate(step, &FormValues::new().with("fullName", "Ada"));
/// assert!(errors.is_empty());
/// ```
pub fn validate(step: &StepDefinition, values: &FormValues) -> ErrorMap {
	let mut errors = ErrorMap::new();
	for (field, _) in violations(step, values) {
		errors.insert(field.error_key(), field.error_message());
	}
	errors
}
