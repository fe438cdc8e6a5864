//! Light/dark presentation theme

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
	#[default]
	Light,
	Dark,
}

impl Theme {
	pub fn toggled(self) -> Self {
		match self {
			Self::Light => Self::Dark,
			Self::Dark => Self::Light,
		}
	}

	pub fn is_dark(self) -> bool {
		matches!(self, Self::Dark)
	}

	/// Label of the toggle button, naming the theme it switches to
	///
	/// # Examples
	///
	/// ```
	/// use formstep_pages::Theme;
	///
	/// assert_eq!(Theme::Light.toggle_label(), "Dark Mode");
	/// assert_eq!(Theme::Light.toggled().toggle_label(), "Light Mode");
	/// ```
	pub fn toggle_label(self) -> &'static str {
		match self {
			Self::Light => "Dark Mode",
			Self::Dark => "Light Mode",
		}
	}

	/// CSS classes for the form container
	pub fn container_class(self) -> &'static str {
		match self {
			Self::Light => "bg-light text-dark",
			Self::Dark => "bg-dark text-light",
		}
	}
}

impl fmt::Display for Theme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Light => write!(f, "light"),
			Self::Dark => write!(f, "dark"),
		}
	}
}
