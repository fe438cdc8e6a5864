//! Top-level feedback shown above a form

use formstep_conf::FeedbackSettings;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
	Success,
	Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
	pub kind: NoticeKind,
	pub message: String,
}

/// Holds at most one notice and the submission cycle that raised it
///
/// Dismissal is keyed by cycle so a timer from an earlier submission can
/// never hide the notice of a later one.
#[derive(Debug, Clone)]
pub struct FeedbackPresenter {
	success_message: String,
	success_window: Duration,
	notice: Option<(u64, Notice)>,
}

impl FeedbackPresenter {
	pub fn new(success_message: impl Into<String>, success_window: Duration) -> Self {
		Self {
			success_message: success_message.into(),
			success_window,
			notice: None,
		}
	}

	pub fn from_settings(settings: &FeedbackSettings) -> Self {
		Self::new(settings.success_message.clone(), settings.success_window())
	}

	pub fn success_window(&self) -> Duration {
		self.success_window
	}

	pub fn notice(&self) -> Option<&Notice> {
		self.notice.as_ref().map(|(_, notice)| notice)
	}

	pub fn show_success(&mut self, cycle: u64) {
		self.notice = Some((
			cycle,
			Notice {
				kind: NoticeKind::Success,
				message: self.success_message.clone(),
			},
		));
	}

	pub fn show_failure(&mut self, cycle: u64, reason: &str) {
		self.notice = Some((
			cycle,
			Notice {
				kind: NoticeKind::Failure,
				message: format!("Submission failed: {}", reason),
			},
		));
	}

	pub fn clear(&mut self) {
		self.notice = None;
	}

	/// Clear the notice if `cycle` raised it; returns whether anything was cleared
	///
	/// # Examples
	///
	/// ```
	/// use formstep_pages::FeedbackPresenter;
	/// use std::time::Duration;
	///
	/// let mut feedback = FeedbackPresenter::new("Sent!", Duration::from_secs(5));
	/// feedback.show_success(1);
	/// feedback.show_success(2);
	/// assert!(!feedback.dismiss(1));
	/// assert!(feedback.dismiss(2));
	/// assert!(feedback.notice().is_none());
	/// ```
	pub fn dismiss(&mut self, cycle: u64) -> bool {
		match &self.notice {
			Some((raised, _)) if *raised == cycle => {
				self.notice = None;
				true
			}
			_ => false,
		}
	}
}

impl Default for FeedbackPresenter {
	fn default() -> Self {
		Self::from_settings(&FeedbackSettings::default())
	}
}

/// "This form has been visited N times."
pub fn visit_tooltip(count: u64) -> String {
	format!("This form has been visited {} times.", count)
}
