//! Field registry: the ordered steps of each form variant
//!
//! Every variant runs on the same engine; the only thing that differs between them is
//! the [`WizardDefinition`] returned by [`steps_for`].

use crate::field::FieldSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Field name of the human-verification flag in every built-in variant.
pub const CAPTCHA_FIELD: &str = "captchaVerified";

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
	#[error("Wizard '{0}' has no steps")]
	NoSteps(String),
	#[error("Field '{field}' is declared in step {first} and again in step {second}")]
	DuplicateField {
		field: String,
		first: usize,
		second: usize,
	},
	#[error("Step at position {expected} is numbered {found}")]
	StepIndex { expected: usize, found: usize },
	#[error("Unknown form variant: {0}")]
	UnknownVariant(String),
}

/// The three presentations of the contact form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormVariant {
	/// Every field on one page
	SinglePage,
	/// Identity on the first step, contact details and confirmation on the second
	TwoStep,
	/// One concern per step
	FourStep,
}

impl FormVariant {
	pub const ALL: [FormVariant; 3] = [
		FormVariant::SinglePage,
		FormVariant::TwoStep,
		FormVariant::FourStep,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			FormVariant::SinglePage => "single_page",
			FormVariant::TwoStep => "two_step",
			FormVariant::FourStep => "four_step",
		}
	}

	/// Heading shown on the landing page link
	pub fn title(&self) -> &'static str {
		match self {
			FormVariant::SinglePage => "Normal Form",
			FormVariant::TwoStep => "Next Form",
			FormVariant::FourStep => "Multi Pages Next Form",
		}
	}
}

impl fmt::Display for FormVariant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FormVariant {
	type Err = RegistryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		FormVariant::ALL
			.into_iter()
			.find(|variant| variant.as_str() == s)
			.ok_or_else(|| RegistryError::UnknownVariant(s.to_string()))
	}
}

/// One page of a wizard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
	/// 1-based position in the wizard
	pub index: usize,
	pub title: String,
	pub fields: Vec<FieldSpec>,
}

impl StepDefinition {
	pub fn field(&self, name: &str) -> Option<&FieldSpec> {
		self.fields.iter().find(|field| field.name == name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.field(name).is_some()
	}

	pub fn mandatory_fields(&self) -> impl Iterator<Item = &FieldSpec> {
		self.fields.iter().filter(|field| field.required)
	}

	pub fn optional_fields(&self) -> impl Iterator<Item = &FieldSpec> {
		self.fields.iter().filter(|field| !field.required)
	}

	/// The human-verification control of this step, if it has one
	pub fn verification_field(&self) -> Option<&FieldSpec> {
		self.fields
			.iter()
			.find(|field| field.kind == crate::field::FieldKind::Verification)
	}
}

/// Immutable ordered sequence of steps
///
/// Deserialized definitions go through the same checks as
/// [`WizardDefinitionBuilder::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWizardDefinition")]
pub struct WizardDefinition {
	name: String,
	steps: Vec<StepDefinition>,
}

#[derive(Deserialize)]
struct RawWizardDefinition {
	name: String,
	steps: Vec<StepDefinition>,
}

impl TryFrom<RawWizardDefinition> for WizardDefinition {
	type Error = RegistryError;

	fn try_from(raw: RawWizardDefinition) -> Result<Self, Self::Error> {
		let RawWizardDefinition { name, steps } = raw;
		for (position, step) in steps.iter().enumerate() {
			if step.index != position + 1 {
				return Err(RegistryError::StepIndex {
					expected: position + 1,
					found: step.index,
				});
			}
		}
		steps
			.into_iter()
			.fold(WizardDefinition::builder(name), |builder, step| {
				builder.step(step.title, step.fields)
			})
			.build()
	}
}

impl WizardDefinition {
	/// Start a definition named `name`
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FieldSpec, WizardDefinition};
	///
	/// let definition = WizardDefinition::builder("signup")
	///     .step("Account", [FieldSpec::text("username").required()])
	///     .step("Contact", [FieldSpec::email("email").required()])
	///     .build()
	///     .unwrap();
	/// assert_eq!(definition.step_count(), 2);
	/// assert_eq!(definition.step(2).unwrap().title, "Contact");
	/// ```
	pub fn builder(name: impl Into<String>) -> WizardDefinitionBuilder {
		WizardDefinitionBuilder {
			name: name.into(),
			steps: Vec::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn steps(&self) -> &[StepDefinition] {
		&self.steps
	}

	pub fn step_count(&self) -> usize {
		self.steps.len()
	}

	/// Step at 1-based `index`
	pub fn step(&self, index: usize) -> Option<&StepDefinition> {
		index.checked_sub(1).and_then(|i| self.steps.get(i))
	}

	pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
		self.steps.iter().flat_map(|step| step.fields.iter())
	}

	/// Index of the step a field lives on
	pub fn home_step(&self, field: &str) -> Option<usize> {
		self.steps
			.iter()
			.find(|step| step.contains(field))
			.map(|step| step.index)
	}

	pub fn verification_field(&self) -> Option<&FieldSpec> {
		self.steps.iter().find_map(StepDefinition::verification_field)
	}
}

/// Builder for [`WizardDefinition`]
pub struct WizardDefinitionBuilder {
	name: String,
	steps: Vec<StepDefinition>,
}

impl WizardDefinitionBuilder {
	/// Append a step; its index is its position in the sequence
	pub fn step(mut self, title: impl Into<String>, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
		let index = self.steps.len() + 1;
		self.steps.push(StepDefinition {
			index,
			title: title.into(),
			fields: fields.into_iter().collect(),
		});
		self
	}

	/// Finish the definition, checking that every field has exactly one home step
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FieldSpec, RegistryError, WizardDefinition};
	///
	/// let result = WizardDefinition::builder("broken")
	///     .step("One", [FieldSpec::text("name")])
	///     .step("Two", [FieldSpec::text("name")])
	///     .build();
	/// assert!(matches!(result, Err(RegistryError::DuplicateField { .. })));
	/// ```
	pub fn build(self) -> Result<WizardDefinition, RegistryError> {
		if self.steps.is_empty() {
			return Err(RegistryError::NoSteps(self.name));
		}

		let mut home: HashMap<&str, usize> = HashMap::new();
		for step in &self.steps {
			for field in &step.fields {
				if let Some(first) = home.insert(field.name.as_str(), step.index) {
					return Err(RegistryError::DuplicateField {
						field: field.name.clone(),
						first,
						second: step.index,
					});
				}
			}
		}

		Ok(WizardDefinition {
			name: self.name,
			steps: self.steps,
		})
	}
}

fn full_name() -> FieldSpec {
	FieldSpec::text("fullName")
		.required()
		.with_label("Full Name")
		.with_placeholder("Enter full name here")
}

fn address() -> FieldSpec {
	FieldSpec::text("address")
		.required()
		.with_label("Address")
		.with_placeholder("Enter address here")
}

fn email() -> FieldSpec {
	FieldSpec::email("email")
		.required()
		.with_label("Email Address")
		.with_placeholder("example@domain.com")
}

fn phone() -> FieldSpec {
	FieldSpec::phone("phone").required().with_label("Phone Number")
}

fn comment() -> FieldSpec {
	FieldSpec::textarea("comment")
		.required()
		.with_label("Question / Comment")
		.with_placeholder("Enter your question or comment here")
}

fn terms() -> FieldSpec {
	FieldSpec::acceptance("terms")
		.with_label("By submitting this form you agree to the terms of the Privacy Policy.")
}

fn captcha() -> FieldSpec {
	FieldSpec::verification(CAPTCHA_FIELD).with_error_key(crate::validation::CAPTCHA_ERROR_KEY)
}

fn single_page() -> Vec<(&'static str, Vec<FieldSpec>)> {
	vec![(
		"Contact",
		vec![
			full_name(),
			phone(),
			address(),
			email(),
			comment(),
			terms(),
			captcha(),
		],
	)]
}

fn two_step() -> Vec<(&'static str, Vec<FieldSpec>)> {
	let mut about = vec![
		full_name(),
		FieldSpec::select(
			"gender",
			[
				("", "Select Gender"),
				("male", "Male"),
				("female", "Female"),
				("other", "Other"),
			],
		)
		.with_label("Gender"),
		address(),
	];
	for i in 1..=5 {
		let (name, placeholder) = if i == 1 {
			("sampleField".to_string(), "Enter sample data".to_string())
		} else {
			(format!("sampleField{}", i), format!("Enter sample data {}", i))
		};
		about.push(
			FieldSpec::text(name)
				.with_label(format!("Sample Field {}", i))
				.with_placeholder(placeholder),
		);
	}

	vec![
		("About You", about),
		(
			"Contact",
			vec![email(), phone(), comment(), terms(), captcha()],
		),
	]
}

fn four_step() -> Vec<(&'static str, Vec<FieldSpec>)> {
	vec![
		(
			"Name",
			vec![full_name().with_message("Full Name is required")],
		),
		(
			"Address",
			vec![address().with_message("Address is required")],
		),
		(
			"Contact",
			vec![
				email().with_message("Email is required"),
				phone().with_message("Phone is required"),
			],
		),
		(
			"Confirm",
			vec![
				comment().with_message("Comment is required"),
				terms(),
				captcha(),
			],
		),
	]
}

/// Ordered steps of a built-in variant
///
/// # Examples
///
/// ```
/// use formstep_forms::{FormVariant, steps_for};
///
/// assert_eq!(steps_for(FormVariant::SinglePage).step_count(), 1);
/// assert_eq!(steps_for(FormVariant::TwoStep).step_count(), 2);
/// assert_eq!(steps_for(FormVariant::FourStep).step_count(), 4);
/// ```
pub fn steps_for(variant: FormVariant) -> WizardDefinition {
	let steps = match variant {
		FormVariant::SinglePage => single_page(),
		FormVariant::TwoStep => two_step(),
		FormVariant::FourStep => four_step(),
	};

	WizardDefinition {
		name: variant.as_str().to_string(),
		steps: steps
			.into_iter()
			.enumerate()
			.map(|(i, (title, fields))| StepDefinition {
				index: i + 1,
				title: title.to_string(),
				fields,
			})
			.collect(),
	}
}
