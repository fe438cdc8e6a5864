//! Adapter for the human-verification widget

use formstep_conf::VerificationSettings;

/// The widget is configured with an opaque site key and reports a token
/// through its change callback. Any non-empty token counts as verified; an
/// empty or absent token (expiry, reset) does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationWidget {
	site_key: String,
}

impl VerificationWidget {
	pub fn new(site_key: impl Into<String>) -> Self {
		Self {
			site_key: site_key.into(),
		}
	}

	pub fn from_settings(settings: &VerificationSettings) -> Self {
		Self::new(settings.site_key.clone())
	}

	pub fn site_key(&self) -> &str {
		&self.site_key
	}

	pub fn is_configured(&self) -> bool {
		!self.site_key.trim().is_empty()
	}

	/// # Examples
	///
	/// ```
	/// use formstep_pages::VerificationWidget;
	///
	/// let widget = VerificationWidget::new("6Lf5IEsqAAAAA");
	/// assert!(widget.token_verified(Some("03AFcWeA5")));
	/// assert!(!widget.token_verified(Some("")));
	/// assert!(!widget.token_verified(None));
	/// ```
	pub fn token_verified(&self, token: Option<&str>) -> bool {
		token.is_some_and(|token| !token.is_empty())
	}
}
