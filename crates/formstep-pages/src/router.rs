//! Path routing to form variants

use formstep_forms::FormVariant;

/// Error type for router operations.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	#[error("Route not found: {0}")]
	NotFound(String),
	#[error("Invalid route name: {0}")]
	InvalidRouteName(String),
}

/// A single route definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
	name: String,
	path: String,
	variant: FormVariant,
}

impl Route {
	pub fn new(name: impl Into<String>, path: &str, variant: FormVariant) -> Self {
		Self {
			name: name.into(),
			path: normalize(path),
			variant,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn variant(&self) -> FormVariant {
		self.variant
	}

	/// Link text shown on the landing page
	pub fn link_text(&self) -> &'static str {
		self.variant.title()
	}
}

/// Maps request paths to the form variant that serves them
///
/// # Examples
///
/// ```
/// use formstep_forms::FormVariant;
/// use formstep_pages::FormRouter;
///
/// let router = FormRouter::default();
/// assert_eq!(router.resolve("/next").unwrap(), FormVariant::TwoStep);
/// assert_eq!(router.resolve("/multi/?ref=home").unwrap(), FormVariant::FourStep);
/// assert_eq!(router.reverse("contact").unwrap(), "/contact");
/// assert!(router.resolve("/missing").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct FormRouter {
	routes: Vec<Route>,
}

impl FormRouter {
	/// A router without routes
	pub fn new() -> Self {
		Self { routes: Vec::new() }
	}

	pub fn route(mut self, name: &str, path: &str, variant: FormVariant) -> Self {
		self.routes.push(Route::new(name, path, variant));
		self
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	pub fn route_count(&self) -> usize {
		self.routes.len()
	}

	/// First route whose path equals `path`, ignoring query and trailing slash
	pub fn match_path(&self, path: &str) -> Option<&Route> {
		let path = normalize(path);
		self.routes.iter().find(|route| route.path == path)
	}

	pub fn resolve(&self, path: &str) -> Result<FormVariant, RouterError> {
		self.match_path(path)
			.map(Route::variant)
			.ok_or_else(|| RouterError::NotFound(path.to_string()))
	}

	/// Path of the route registered under `name`
	pub fn reverse(&self, name: &str) -> Result<&str, RouterError> {
		self.routes
			.iter()
			.find(|route| route.name == name)
			.map(Route::path)
			.ok_or_else(|| RouterError::InvalidRouteName(name.to_string()))
	}
}

impl FormRouter {
	/// `/contact`, `/next` and `/multi`
	pub fn standard() -> Self {
		Self::new()
			.route("contact", "/contact", FormVariant::SinglePage)
			.route("next", "/next", FormVariant::TwoStep)
			.route("multi", "/multi", FormVariant::FourStep)
	}
}

impl Default for FormRouter {
	fn default() -> Self {
		Self::standard()
	}
}

fn normalize(path: &str) -> String {
	let path = path.split(['?', '#']).next().unwrap_or_default();
	let trimmed = path.trim_end_matches('/');
	if trimmed.is_empty() {
		"/".to_string()
	} else if trimmed.starts_with('/') {
		trimmed.to_string()
	} else {
		format!("/{}", trimmed)
	}
}
