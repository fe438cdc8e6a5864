//! Submission backends

use async_trait::async_trait;
use formstep_conf::SubmissionSettings;
use formstep_forms::FormValues;
use std::time::Duration;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
	#[error("Submission failed: {0}")]
	SubmissionFailed(String),
}

impl SubmissionError {
	pub fn reason(&self) -> &str {
		match self {
			Self::SubmissionFailed(reason) => reason,
		}
	}
}

/// Receives the values of a validated form
///
/// Implementations run inside a cancellable task: a form torn down while a
/// submission is in flight aborts the future at its next await point.
#[async_trait]
pub trait SubmissionBackend: Send + Sync {
	async fn submit(&self, values: FormValues) -> Result<(), SubmissionError>;
}

/// Waits a fixed delay and accepts everything
///
/// # Examples
///
/// ```
/// use formstep_forms::FormValues;
/// use formstep_pages::{SimulatedBackend, SubmissionBackend};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let backend = SimulatedBackend::new(Duration::from_millis(10));
/// assert!(backend.submit(FormValues::new()).await.is_ok());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
	delay: Duration,
}

impl SimulatedBackend {
	pub fn new(delay: Duration) -> Self {
		Self { delay }
	}

	pub fn from_settings(settings: &SubmissionSettings) -> Self {
		Self::new(settings.delay())
	}

	pub fn delay(&self) -> Duration {
		self.delay
	}
}

impl Default for SimulatedBackend {
	fn default() -> Self {
		Self::from_settings(&SubmissionSettings::default())
	}
}

#[async_trait]
impl SubmissionBackend for SimulatedBackend {
	async fn submit(&self, values: FormValues) -> Result<(), SubmissionError> {
		tracing::debug!(fields = values.len(), delay_ms = self.delay.as_millis() as u64, "simulating submission");
		tokio::time::sleep(self.delay).await;
		Ok(())
	}
}
