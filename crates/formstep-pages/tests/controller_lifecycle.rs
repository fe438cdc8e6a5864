//! Mounted form behaviour over (paused) time

use async_trait::async_trait;
use formstep_conf::{Settings, SettingsError};
use formstep_forms::{FormValues, FormVariant, Transition, WizardError};
use formstep_pages::{
	ControllerError, FormController, FormHandle, NoticeKind, SubmissionBackend, SubmissionError,
	Theme,
};
use formstep_utils::{InMemoryStore, KeyValueStore};
use rstest::rstest;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Sleeps like the simulated backend, then records that it delivered
struct RecordingBackend {
	delay: Duration,
	delivered: Arc<AtomicBool>,
}

#[async_trait]
impl SubmissionBackend for RecordingBackend {
	async fn submit(&self, _values: FormValues) -> Result<(), SubmissionError> {
		tokio::time::sleep(self.delay).await;
		self.delivered.store(true, Ordering::SeqCst);
		Ok(())
	}
}

struct FailingBackend;

#[async_trait]
impl SubmissionBackend for FailingBackend {
	async fn submit(&self, _values: FormValues) -> Result<(), SubmissionError> {
		tokio::time::sleep(Duration::from_millis(100)).await;
		Err(SubmissionError::SubmissionFailed(
			"upstream unavailable".to_string(),
		))
	}
}

async fn fill_two_step(form: &FormHandle) {
	form.change_field("fullName", "Ada Lovelace").await.unwrap();
	form.change_field("address", "12 St James's Square").await.unwrap();
	assert_eq!(
		form.advance().await.unwrap(),
		Transition::Moved { from: 1, to: 2 }
	);
	form.change_field("email", "ada@example.com").await.unwrap();
	form.change_field("phone", "+44 20 7946 0000").await.unwrap();
	form.change_field("comment", "Notes on the engine").await.unwrap();
	form.change_field("terms", true).await.unwrap();
}

async fn fill_single_page(form: &FormHandle) {
	for (name, value) in [
		("fullName", "Ada"),
		("phone", "+44 20 7946 0000"),
		("address", "London"),
		("email", "ada@example.com"),
		("comment", "Hello"),
	] {
		form.change_field(name, value).await.unwrap();
	}
	form.change_field("terms", true).await.unwrap();
	form.verify(Some("token")).await.unwrap();
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_two_step_submission_resets_after_delay() {
	let form = FormController::new(FormVariant::TwoStep).mount().await.unwrap();
	fill_two_step(&form).await;

	let blocked = form.submit().await.unwrap();
	match blocked {
		Transition::Blocked(errors) => {
			assert_eq!(errors.get("captcha"), Some("Please verify you are not a robot"))
		}
		other => panic!("expected blocked submit, got {:?}", other),
	}

	assert!(form.verify(Some("token")).await.unwrap());
	let start = Instant::now();
	assert!(matches!(
		form.submit().await.unwrap(),
		Transition::Submitting(_)
	));

	tokio::time::sleep(Duration::from_millis(1999)).await;
	let pending = form.snapshot().await.unwrap();
	assert!(pending.is_submitting);
	assert_eq!(pending.current_step, 2);
	assert!(pending.notice.is_none());

	let mut updates = form.subscribe();
	let done = updates
		.wait_for(|snapshot| !snapshot.is_submitting)
		.await
		.unwrap()
		.clone();
	assert!(start.elapsed() >= Duration::from_secs(2));
	assert_eq!(done.current_step, 1);
	assert!(done.values.is_pristine());
	assert!(done.errors.is_empty());
	assert!(!done.is_verified_by_captcha);
	let notice = done.notice.unwrap();
	assert_eq!(notice.kind, NoticeKind::Success);
	assert_eq!(notice.message, "Your form has been submitted successfully!");
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_success_notice_clears_after_window() {
	let form = FormController::new(FormVariant::TwoStep).mount().await.unwrap();
	fill_two_step(&form).await;
	form.verify(Some("token")).await.unwrap();
	form.submit().await.unwrap();

	let mut updates = form.subscribe();
	updates
		.wait_for(|snapshot| snapshot.notice.is_some())
		.await
		.unwrap();
	let shown_at = Instant::now();

	tokio::time::sleep(Duration::from_millis(4990)).await;
	assert!(form.snapshot().await.unwrap().notice.is_some());

	updates
		.wait_for(|snapshot| snapshot.notice.is_none())
		.await
		.unwrap();
	assert!(shown_at.elapsed() >= Duration::from_secs(5));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_new_submission_supersedes_success_notice() {
	let form = FormController::new(FormVariant::SinglePage).mount().await.unwrap();
	fill_single_page(&form).await;
	form.submit().await.unwrap();
	let mut updates = form.subscribe();
	updates
		.wait_for(|snapshot| snapshot.notice.is_some())
		.await
		.unwrap();

	tokio::time::sleep(Duration::from_secs(1)).await;
	fill_single_page(&form).await;
	form.submit().await.unwrap();
	let snapshot = form.snapshot().await.unwrap();
	assert!(snapshot.is_submitting);
	assert!(snapshot.notice.is_none());

	// The first cycle's dismiss timer was cancelled, so the second notice
	// lives its full window.
	updates
		.wait_for(|snapshot| snapshot.notice.is_some())
		.await
		.unwrap();
	let second_shown = Instant::now();
	updates
		.wait_for(|snapshot| snapshot.notice.is_none())
		.await
		.unwrap();
	assert!(second_shown.elapsed() >= Duration::from_secs(5));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_navigation_rejected_while_submitting() {
	let form = FormController::new(FormVariant::TwoStep).mount().await.unwrap();
	fill_two_step(&form).await;
	form.verify(Some("token")).await.unwrap();
	form.submit().await.unwrap();

	for result in [form.advance().await, form.retreat().await, form.submit().await] {
		assert!(matches!(
			result,
			Err(ControllerError::Wizard(WizardError::SubmissionInProgress))
		));
	}
	// Edits are still accepted
	assert!(form.change_field("comment", "late edit").await.is_ok());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_teardown_aborts_pending_submission() {
	let delivered = Arc::new(AtomicBool::new(false));
	let form = FormController::new(FormVariant::TwoStep)
		.with_backend(RecordingBackend {
			delay: Duration::from_secs(2),
			delivered: Arc::clone(&delivered),
		})
		.mount()
		.await
		.unwrap();
	fill_two_step(&form).await;
	form.verify(Some("token")).await.unwrap();
	form.submit().await.unwrap();

	tokio::time::sleep(Duration::from_millis(500)).await;
	assert_eq!(form.teardown().await.unwrap(), 1);

	tokio::time::sleep(Duration::from_secs(5)).await;
	assert!(!delivered.load(Ordering::SeqCst));
	assert!(matches!(form.snapshot().await, Err(ControllerError::Closed)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_dropping_every_handle_aborts_pending_submission() {
	let delivered = Arc::new(AtomicBool::new(false));
	let form = FormController::new(FormVariant::TwoStep)
		.with_backend(RecordingBackend {
			delay: Duration::from_secs(2),
			delivered: Arc::clone(&delivered),
		})
		.mount()
		.await
		.unwrap();
	fill_two_step(&form).await;
	form.verify(Some("token")).await.unwrap();
	form.submit().await.unwrap();
	drop(form);

	tokio::time::sleep(Duration::from_secs(5)).await;
	assert!(!delivered.load(Ordering::SeqCst));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn test_failed_submission_keeps_terminal_step() {
	let form = FormController::new(FormVariant::TwoStep)
		.with_backend(FailingBackend)
		.mount()
		.await
		.unwrap();
	fill_two_step(&form).await;
	form.verify(Some("token")).await.unwrap();
	form.submit().await.unwrap();

	let mut updates = form.subscribe();
	let failed = updates
		.wait_for(|snapshot| !snapshot.is_submitting && snapshot.notice.is_some())
		.await
		.unwrap()
		.clone();
	assert_eq!(failed.current_step, 2);
	assert_eq!(failed.values.text("email"), Some("ada@example.com"));
	let notice = failed.notice.unwrap();
	assert_eq!(notice.kind, NoticeKind::Failure);
	assert_eq!(notice.message, "Submission failed: upstream unavailable");

	// The form can be submitted again
	assert!(matches!(
		form.submit().await.unwrap(),
		Transition::Submitting(_)
	));
	assert!(form.snapshot().await.unwrap().notice.is_none());
}

#[rstest]
#[tokio::test]
async fn test_visit_counter_increments_once_per_mount() {
	let store = Arc::new(InMemoryStore::new());
	store.set("visitCount", "3".to_string()).await.unwrap();

	let form = FormController::new(FormVariant::FourStep)
		.with_store(store.clone())
		.mount()
		.await
		.unwrap();
	form.change_field("fullName", "Ada").await.unwrap();
	form.advance().await.unwrap();
	form.toggle_theme().await.unwrap();

	let snapshot = form.snapshot().await.unwrap();
	assert_eq!(snapshot.visit_count, 4);
	assert_eq!(snapshot.visit_tooltip, "This form has been visited 4 times.");
	assert_eq!(store.get("visitCount").await.unwrap().as_deref(), Some("4"));

	let second = FormController::new(FormVariant::SinglePage)
		.with_store(store.clone())
		.mount()
		.await
		.unwrap();
	assert_eq!(second.latest().visit_count, 5);
}

#[rstest]
#[tokio::test]
async fn test_visit_counter_file_from_settings() {
	let dir = tempfile::tempdir().unwrap();
	let mut settings = Settings::default();
	settings.storage.path = Some(dir.path().join("formstep.json"));

	for expected in 1..=2 {
		let form = FormController::new(FormVariant::SinglePage)
			.with_settings(settings.clone())
			.mount()
			.await
			.unwrap();
		assert_eq!(form.latest().visit_count, expected);
		form.teardown().await.unwrap();
	}
}

#[rstest]
#[case::zero_delay("submission.delay_ms")]
#[case::blank_counter_key("storage.visit_counter_key")]
#[tokio::test]
async fn test_mount_rejects_invalid_settings(#[case] expected_key: &str) {
	let mut settings = Settings::default();
	match expected_key {
		"submission.delay_ms" => settings.submission.delay_ms = 0,
		_ => settings.storage.visit_counter_key = String::new(),
	}
	let store = Arc::new(InMemoryStore::new());

	let result = FormController::new(FormVariant::SinglePage)
		.with_settings(settings)
		.with_store(store.clone())
		.mount()
		.await;
	match result {
		Err(ControllerError::Settings(SettingsError::Invalid { key, .. })) => {
			assert_eq!(key, expected_key)
		}
		Err(other) => panic!("expected invalid settings, got {:?}", other),
		Ok(_) => panic!("mount accepted invalid settings"),
	}
	// Nothing was recorded for the rejected mount
	assert_eq!(store.get("visitCount").await.unwrap(), None);
}

#[rstest]
#[tokio::test]
async fn test_snapshot_presentation_fields() {
	let mut settings = Settings::default();
	settings.verification.site_key = "6Lf5IEsq".to_string();
	let form = FormController::new(FormVariant::FourStep)
		.with_settings(settings)
		.mount()
		.await
		.unwrap();

	let initial = form.latest();
	assert_eq!(initial.title, "Multi Pages Next Form");
	assert_eq!(initial.step_titles, ["Name", "Address", "Contact", "Confirm"]);
	assert_eq!(initial.reached_steps, [true, false, false, false]);
	assert_eq!(initial.progress, 25.0);
	assert_eq!(initial.theme, Theme::Light);
	assert_eq!(initial.theme_toggle_label, "Dark Mode");
	assert_eq!(initial.site_key, "6Lf5IEsq");

	assert_eq!(form.toggle_theme().await.unwrap(), Theme::Dark);
	form.change_field("fullName", "Ada").await.unwrap();
	form.advance().await.unwrap();

	let snapshot = form.snapshot().await.unwrap();
	assert_eq!(snapshot.theme_toggle_label, "Light Mode");
	assert_eq!(snapshot.reached_steps, [true, true, false, false]);
	assert_eq!(snapshot.step_label, "Step 2 of 4");

	let json = serde_json::to_value(&snapshot).unwrap();
	assert_eq!(json["theme"], "dark");
	assert_eq!(json["variant"], serde_json::to_value(FormVariant::FourStep).unwrap());
}

#[rstest]
#[tokio::test]
async fn test_empty_token_unverifies() {
	let form = FormController::new(FormVariant::FourStep).mount().await.unwrap();
	assert!(form.verify(Some("token")).await.unwrap());
	assert!(form.snapshot().await.unwrap().is_verified_by_captcha);

	assert!(!form.verify(None).await.unwrap());
	let snapshot = form.snapshot().await.unwrap();
	assert!(!snapshot.is_verified_by_captcha);
	// The control lives on step 4, so step 1 shows no captcha error
	assert!(!snapshot.errors.contains("captcha"));
}
