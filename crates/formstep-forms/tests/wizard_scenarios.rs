//! Wizard scenario tests
//!
//! End-to-end walks through each variant using only the public transitions.

use formstep_forms::{
	FormValues, FormVariant, FormWizard, Transition, WizardError, steps_for, validate,
};
use rstest::rstest;

#[rstest]
fn test_four_step_first_step_gate() {
	let mut wizard = FormWizard::for_variant(FormVariant::FourStep);
	wizard.on_field_change("fullName", "");

	let transition = wizard.advance().unwrap();
	assert!(matches!(transition, Transition::Blocked(_)));
	assert_eq!(wizard.current_step(), 1);
	assert!(wizard.errors().contains("fullName"));

	wizard.on_field_change("fullName", "Ada");
	wizard.advance().unwrap();
	assert_eq!(wizard.current_step(), 2);
}

#[rstest]
fn test_four_step_full_walk() {
	let mut wizard = FormWizard::for_variant(FormVariant::FourStep);

	wizard.on_field_change("fullName", "Ada");
	wizard.advance().unwrap();
	wizard.on_field_change("address", "London");
	wizard.advance().unwrap();

	// Step 3 needs both email and phone
	wizard.on_field_change("email", "ada@example.com");
	let transition = wizard.advance().unwrap();
	assert!(matches!(transition, Transition::Blocked(ref e) if e.get("phone") == Some("Phone is required")));
	wizard.on_field_change("phone", "+44 20 7946 0000");
	wizard.advance().unwrap();
	assert_eq!(wizard.current_step(), 4);
	assert!(wizard.is_last_step());

	wizard.on_field_change("comment", "Hello");
	wizard.on_field_change("terms", true);
	wizard.on_verification(true);
	let transition = wizard.submit().unwrap();
	let Transition::Submitting(values) = transition else {
		panic!("expected submission, got {:?}", transition);
	};
	assert_eq!(values.text("fullName"), Some("Ada"));
	assert_eq!(values.text("phone"), Some("+44 20 7946 0000"));
	assert!(values.flag("terms"));
}

#[rstest]
fn test_two_step_captcha_gate() {
	let mut wizard = FormWizard::for_variant(FormVariant::TwoStep);
	wizard.on_field_change("fullName", "Ada");
	wizard.on_field_change("address", "London");
	wizard.advance().unwrap();

	wizard.on_field_change("email", "ada@example.com");
	wizard.on_field_change("phone", "+1 202 555 0143");
	wizard.on_field_change("comment", "Question");
	wizard.on_field_change("terms", true);
	wizard.on_verification(false);

	let transition = wizard.submit().unwrap();
	assert!(matches!(transition, Transition::Blocked(_)));
	assert_eq!(wizard.current_step(), 2);
	assert!(wizard.errors().contains("captcha"));

	wizard.on_verification(true);
	assert!(matches!(wizard.submit(), Ok(Transition::Submitting(_))));
	assert!(wizard.is_submitting());

	wizard.complete_submission().unwrap();
	assert_eq!(wizard.current_step(), 1);
	assert!(wizard.values().is_pristine());
	assert!(wizard.errors().is_empty());
	assert!(!wizard.is_submitting());
	assert!(!wizard.is_verified_by_captcha());
}

#[rstest]
fn test_single_page_submits_from_first_step() {
	let mut wizard = FormWizard::for_variant(FormVariant::SinglePage);
	assert!(wizard.is_first_step() && wizard.is_last_step());

	let transition = wizard.submit().unwrap();
	let Transition::Blocked(errors) = transition else {
		panic!("empty single page form must not submit");
	};
	assert_eq!(errors.len(), 7);

	for (name, value) in [
		("fullName", "Ada"),
		("phone", "+1 202 555 0143"),
		("address", "London"),
		("email", "ada@example.com"),
		("comment", "Hi"),
	] {
		wizard.on_field_change(name, value);
	}
	wizard.on_field_change("terms", true);
	wizard.on_verification(true);
	assert!(matches!(wizard.submit(), Ok(Transition::Submitting(_))));
}

#[rstest]
fn test_optional_cross_step_values_survive_navigation() {
	let mut wizard = FormWizard::for_variant(FormVariant::TwoStep);
	wizard.on_field_change("fullName", "Ada");
	wizard.on_field_change("address", "London");
	wizard.on_field_change("gender", "female");
	wizard.on_field_change("sampleField2", "extra");
	wizard.advance().unwrap();
	wizard.retreat().unwrap();

	assert_eq!(wizard.values().text("gender"), Some("female"));
	assert_eq!(wizard.values().text("sampleField2"), Some("extra"));
}

#[rstest]
fn test_retreat_never_validates() {
	let mut wizard = FormWizard::for_variant(FormVariant::FourStep);
	wizard.on_field_change("fullName", "Ada");
	wizard.advance().unwrap();
	// Step 2 is invalid but leaving it backwards is allowed
	assert!(!validate(wizard.current_step_definition().unwrap(), wizard.values()).is_empty());
	assert_eq!(wizard.retreat(), Ok(Transition::Moved { from: 2, to: 1 }));
	assert_eq!(wizard.retreat(), Err(WizardError::AlreadyAtFirstStep));
}

#[rstest]
fn test_custom_definition_runs_on_same_engine() {
	use formstep_forms::{FieldSpec, WizardDefinition};

	let definition = WizardDefinition::builder("survey")
		.step("Rating", [FieldSpec::select("rating", [("1", "Bad"), ("5", "Great")]).required()])
		.step("Consent", [FieldSpec::acceptance("consent")])
		.build()
		.unwrap();
	let mut wizard = FormWizard::new(definition);

	assert!(matches!(wizard.advance(), Ok(Transition::Blocked(_))));
	wizard.on_field_change("rating", "5");
	wizard.advance().unwrap();
	let Transition::Blocked(errors) = wizard.submit().unwrap() else {
		panic!("consent is mandatory");
	};
	assert_eq!(errors.get("consent"), Some("You must agree to the terms"));
	wizard.on_field_change("consent", true);
	assert!(matches!(wizard.submit(), Ok(Transition::Submitting(_))));
}

#[rstest]
#[case(FormVariant::SinglePage)]
#[case(FormVariant::TwoStep)]
#[case(FormVariant::FourStep)]
fn test_fresh_session_values_match_registry(#[case] variant: FormVariant) {
	let wizard = FormWizard::for_variant(variant);
	let expected = FormValues::defaults_for(steps_for(variant).fields());
	assert_eq!(wizard.values(), &expected);
}
