//! Field declarations and form values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default message for an empty mandatory text field.
pub const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required";
/// Default message for an unchecked acceptance box.
pub const DEFAULT_ACCEPTANCE_MESSAGE: &str = "You must agree to the terms";
/// Default message for an unconfirmed human-verification check.
pub const DEFAULT_VERIFICATION_MESSAGE: &str = "Please verify you are not a robot";

/// Input control a field is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	Text,
	Email,
	/// Phone widget emitting the fully formatted number, calling code included
	Phone,
	TextArea,
	Select,
	/// Checkbox that must be ticked (terms of service)
	Acceptance,
	/// Boolean produced by the human-verification widget
	Verification,
}

impl FieldKind {
	/// Whether values of this kind are booleans rather than strings
	pub fn is_flag(&self) -> bool {
		matches!(self, FieldKind::Acceptance | FieldKind::Verification)
	}
}

/// A single field value
///
/// # Examples
///
/// ```
/// use formstep_forms::FieldValue;
///
/// assert!(FieldValue::from("").is_blank());
/// assert!(!FieldValue::from("Ada").is_blank());
/// assert!(FieldValue::from(false).is_blank());
/// assert!(!FieldValue::from(true).is_blank());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
	Text(String),
	Flag(bool),
}

impl FieldValue {
	/// Empty string or `false`
	pub fn is_blank(&self) -> bool {
		match self {
			FieldValue::Text(s) => s.is_empty(),
			FieldValue::Flag(b) => !b,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			FieldValue::Text(s) => Some(s.as_str()),
			FieldValue::Flag(_) => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			FieldValue::Flag(b) => Some(*b),
			FieldValue::Text(_) => None,
		}
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		FieldValue::Text(value.to_string())
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		FieldValue::Text(value)
	}
}

impl From<bool> for FieldValue {
	fn from(value: bool) -> Self {
		FieldValue::Flag(value)
	}
}

/// Declaration of one form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
	pub name: String,
	pub label: Option<String>,
	pub kind: FieldKind,
	pub required: bool,
	pub placeholder: Option<String>,
	pub choices: Vec<(String, String)>,
	message: Option<String>,
	error_key: Option<String>,
}

impl FieldSpec {
	fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
		Self {
			name: name.into(),
			label: None,
			kind,
			required: false,
			placeholder: None,
			choices: Vec::new(),
			message: None,
			error_key: None,
		}
	}

	/// Create an optional single-line text field
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FieldKind, FieldSpec};
	///
	/// let field = FieldSpec::text("fullName");
	/// assert_eq!(field.name, "fullName");
	/// assert_eq!(field.kind, FieldKind::Text);
	/// assert!(!field.required);
	/// ```
	pub fn text(name: impl Into<String>) -> Self {
		Self::with_kind(name, FieldKind::Text)
	}

	pub fn email(name: impl Into<String>) -> Self {
		Self::with_kind(name, FieldKind::Email)
	}

	pub fn phone(name: impl Into<String>) -> Self {
		Self::with_kind(name, FieldKind::Phone)
	}

	pub fn textarea(name: impl Into<String>) -> Self {
		Self::with_kind(name, FieldKind::TextArea)
	}

	/// Create a select field from `(value, label)` pairs
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::FieldSpec;
	///
	/// let field = FieldSpec::select("gender", [("male", "Male"), ("female", "Female")]);
	/// assert_eq!(field.choices.len(), 2);
	/// assert_eq!(field.choices[0], ("male".to_string(), "Male".to_string()));
	/// ```
	pub fn select<I, V, L>(name: impl Into<String>, choices: I) -> Self
	where
		I: IntoIterator<Item = (V, L)>,
		V: Into<String>,
		L: Into<String>,
	{
		let mut field = Self::with_kind(name, FieldKind::Select);
		field.choices = choices
			.into_iter()
			.map(|(value, label)| (value.into(), label.into()))
			.collect();
		field
	}

	/// Create a mandatory acceptance checkbox
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::FieldSpec;
	///
	/// let terms = FieldSpec::acceptance("terms");
	/// assert!(terms.required);
	/// assert_eq!(terms.error_message(), "You must agree to the terms");
	/// ```
	pub fn acceptance(name: impl Into<String>) -> Self {
		Self::with_kind(name, FieldKind::Acceptance).required()
	}

	/// Create a mandatory human-verification flag
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::FieldSpec;
	///
	/// let captcha = FieldSpec::verification("captchaVerified").with_error_key("captcha");
	/// assert_eq!(captcha.error_key(), "captcha");
	/// assert_eq!(captcha.error_message(), "Please verify you are not a robot");
	/// ```
	pub fn verification(name: impl Into<String>) -> Self {
		Self::with_kind(name, FieldKind::Verification).required()
	}

	/// Set the field as required
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::FieldSpec;
	///
	/// let field = FieldSpec::text("address").required();
	/// assert!(field.required);
	/// ```
	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = Some(placeholder.into());
		self
	}

	/// Override the message reported when the field is in violation
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::FieldSpec;
	///
	/// let field = FieldSpec::text("fullName").required().with_message("Full Name is required");
	/// assert_eq!(field.error_message(), "Full Name is required");
	/// ```
	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}

	/// Report violations under `key` instead of the field name
	pub fn with_error_key(mut self, key: impl Into<String>) -> Self {
		self.error_key = Some(key.into());
		self
	}

	/// Key under which a violation of this field appears in the error map
	pub fn error_key(&self) -> &str {
		self.error_key.as_deref().unwrap_or(&self.name)
	}

	pub fn error_message(&self) -> &str {
		if let Some(message) = &self.message {
			return message;
		}
		match self.kind {
			FieldKind::Acceptance => DEFAULT_ACCEPTANCE_MESSAGE,
			FieldKind::Verification => DEFAULT_VERIFICATION_MESSAGE,
			_ => DEFAULT_REQUIRED_MESSAGE,
		}
	}

	/// Convert `value` to the shape this field's kind holds
	///
	/// Flag fields only become `true` from `Flag(true)` or the text `"true"`. String
	/// fields receiving a flag hold `"true"` or the empty string.
	///
	/// # Examples
	///
	/// ```
	/// use formstep_forms::{FieldSpec, FieldValue};
	///
	/// let captcha = FieldSpec::verification("captchaVerified");
	/// assert_eq!(captcha.coerce("false".into()), FieldValue::Flag(false));
	/// assert_eq!(captcha.coerce("yes".into()), FieldValue::Flag(false));
	/// assert_eq!(captcha.coerce(true.into()), FieldValue::Flag(true));
	///
	/// let name = FieldSpec::text("fullName");
	/// assert_eq!(name.coerce(false.into()), FieldValue::Text(String::new()));
	/// ```
	pub fn coerce(&self, value: FieldValue) -> FieldValue {
		match (self.kind.is_flag(), value) {
			(true, FieldValue::Text(text)) => FieldValue::Flag(text.trim() == "true"),
			(false, FieldValue::Flag(flag)) => {
				FieldValue::Text(if flag { "true".to_string() } else { String::new() })
			}
			(_, value) => value,
		}
	}

	/// Whether `values` leave this field unfilled
	///
	/// Flag fields count as filled only when they hold `Flag(true)`.
	pub fn is_unfilled(&self, values: &FormValues) -> bool {
		if self.kind.is_flag() {
			!values.flag(&self.name)
		} else {
			values.is_blank(&self.name)
		}
	}

	/// Value the field holds in a fresh session
	pub fn default_value(&self) -> FieldValue {
		if self.kind.is_flag() {
			FieldValue::Flag(false)
		} else {
			FieldValue::Text(String::new())
		}
	}
}

/// Snapshot of every field value of a form
///
/// Updates never mutate a snapshot in place; [`FormValues::with`] returns the next one.
///
/// # Examples
///
/// ```
/// use formstep_forms::FormValues;
///
/// let before = FormValues::new();
/// let after = before.with("fullName", "Ada");
/// assert_eq!(before.text("fullName"), None);
/// assert_eq!(after.text("fullName"), Some("Ada"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty defaults for the given fields
	pub fn defaults_for<'a>(fields: impl IntoIterator<Item = &'a FieldSpec>) -> Self {
		Self(
			fields
				.into_iter()
				.map(|field| (field.name.clone(), field.default_value()))
				.collect(),
		)
	}

	/// Next snapshot with `name` replaced by `value`
	pub fn with(&self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
		let mut next = self.0.clone();
		next.insert(name.into(), value.into());
		Self(next)
	}

	pub fn get(&self, name: &str) -> Option<&FieldValue> {
		self.0.get(name)
	}

	pub fn text(&self, name: &str) -> Option<&str> {
		self.get(name).and_then(FieldValue::as_str)
	}

	/// Boolean value of `name`, `false` when absent or not a flag
	pub fn flag(&self, name: &str) -> bool {
		self.get(name).and_then(FieldValue::as_bool).unwrap_or(false)
	}

	/// Absent fields count as blank
	pub fn is_blank(&self, name: &str) -> bool {
		self.get(name).is_none_or(FieldValue::is_blank)
	}

	/// Every held value is blank
	pub fn is_pristine(&self) -> bool {
		self.0.values().all(FieldValue::is_blank)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(FieldSpec::text("a"), FieldValue::Text(String::new()))]
	#[case(FieldSpec::phone("a"), FieldValue::Text(String::new()))]
	#[case(FieldSpec::acceptance("a"), FieldValue::Flag(false))]
	#[case(FieldSpec::verification("a"), FieldValue::Flag(false))]
	fn test_default_value(#[case] field: FieldSpec, #[case] expected: FieldValue) {
		assert_eq!(field.default_value(), expected);
	}

	#[rstest]
	#[case(FieldSpec::verification("a"), FieldValue::from("true"), FieldValue::Flag(true))]
	#[case(FieldSpec::verification("a"), FieldValue::from("false"), FieldValue::Flag(false))]
	#[case(FieldSpec::acceptance("a"), FieldValue::from("on"), FieldValue::Flag(false))]
	#[case(FieldSpec::acceptance("a"), FieldValue::Flag(true), FieldValue::Flag(true))]
	#[case(FieldSpec::text("a"), FieldValue::Flag(true), FieldValue::from("true"))]
	#[case(FieldSpec::email("a"), FieldValue::Flag(false), FieldValue::from(""))]
	#[case(FieldSpec::text("a"), FieldValue::from("Ada"), FieldValue::from("Ada"))]
	fn test_coerce_to_field_kind(
		#[case] field: FieldSpec,
		#[case] value: FieldValue,
		#[case] expected: FieldValue,
	) {
		assert_eq!(field.coerce(value), expected);
	}

	#[rstest]
	fn test_flag_field_needs_true_flag() {
		let captcha = FieldSpec::verification("captchaVerified");
		let values = FormValues::new().with("captchaVerified", "false");
		assert!(!values.is_blank("captchaVerified"));
		assert!(captcha.is_unfilled(&values));
		assert!(!captcha.is_unfilled(&values.with("captchaVerified", true)));
	}

	#[rstest]
	fn test_whitespace_counts_as_filled() {
		let values = FormValues::new().with("comment", " ");
		assert!(!values.is_blank("comment"));
	}

	#[rstest]
	fn test_absent_field_is_blank() {
		let values = FormValues::new();
		assert!(values.is_blank("email"));
		assert!(!values.flag("terms"));
	}

	#[rstest]
	fn test_defaults_are_pristine() {
		let fields = [
			FieldSpec::text("fullName"),
			FieldSpec::acceptance("terms"),
		];
		let values = FormValues::defaults_for(&fields);
		assert_eq!(values.len(), 2);
		assert!(values.is_pristine());
		assert!(!values.with("terms", true).is_pristine());
	}

	#[rstest]
	fn test_serializes_as_flat_object() {
		let values = FormValues::new().with("email", "a@b.c").with("terms", true);
		let json = serde_json::to_value(&values).unwrap();
		assert_eq!(json, serde_json::json!({"email": "a@b.c", "terms": true}));
	}
}
