//! Mounted form controllers
//!
//! Each mounted form is a single tokio task owning its [`FormWizard`]. The
//! task drains a command queue one message at a time, so user events,
//! submission results and timer expiries never interleave. Callers talk to it
//! through a cloneable [`FormHandle`] and observe it through [`FormSnapshot`]s
//! published after every message.
//!
//! Background work (the submission round trip and the success dismiss timer)
//! lives in the controller's [`TaskGroup`] and only holds a weak sender back to
//! the queue. Tearing the form down, or dropping every handle, aborts both.

use crate::feedback::{FeedbackPresenter, Notice, visit_tooltip};
use crate::router::{FormRouter, RouterError};
use crate::submission::{SimulatedBackend, SubmissionBackend, SubmissionError};
use crate::theme::Theme;
use crate::verification::VerificationWidget;
use formstep_conf::{Settings, SettingsError};
use formstep_forms::{
	ErrorMap, FieldValue, FormValues, FormVariant, FormWizard, Transition, WizardDefinition,
	WizardError, steps_for,
};
use formstep_tasks::{TaskGroup, TaskSlot};
use formstep_utils::{FileStore, InMemoryStore, KeyValueStore, StorageError, VisitCounter};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::Instrument;
use uuid::Uuid;

const SUBMISSION: TaskSlot = "submission";
const SUCCESS_DISMISS: TaskSlot = "success-dismiss";
const COMMAND_BUFFER: usize = 32;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
	#[error(transparent)]
	Wizard(#[from] WizardError),

	#[error("Visit counter unavailable: {0}")]
	Storage(#[from] StorageError),

	#[error(transparent)]
	Settings(#[from] SettingsError),

	#[error("Form has been torn down")]
	Closed,
}

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Everything a presenter needs to render a form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSnapshot {
	pub instance: Uuid,
	pub variant: FormVariant,
	pub title: &'static str,
	pub current_step: usize,
	pub total_steps: usize,
	pub step_label: String,
	pub step_titles: Vec<String>,
	/// Tracker markers, one per step
	pub reached_steps: Vec<bool>,
	pub progress: f32,
	pub values: FormValues,
	pub errors: ErrorMap,
	pub is_submitting: bool,
	pub is_verified_by_captcha: bool,
	pub notice: Option<Notice>,
	pub theme: Theme,
	pub theme_toggle_label: &'static str,
	pub visit_count: u64,
	pub visit_tooltip: String,
	pub site_key: String,
}

enum Command {
	ChangeField {
		name: String,
		value: FieldValue,
		reply: oneshot::Sender<ErrorMap>,
	},
	Verify {
		token: Option<String>,
		reply: oneshot::Sender<bool>,
	},
	Advance {
		reply: oneshot::Sender<Result<Transition, WizardError>>,
	},
	Retreat {
		reply: oneshot::Sender<Result<Transition, WizardError>>,
	},
	Submit {
		reply: oneshot::Sender<Result<Transition, WizardError>>,
	},
	ToggleTheme {
		reply: oneshot::Sender<Theme>,
	},
	Snapshot {
		reply: oneshot::Sender<FormSnapshot>,
	},
	Teardown {
		reply: oneshot::Sender<usize>,
	},
	SubmissionResolved {
		cycle: u64,
		result: Result<(), SubmissionError>,
	},
	SuccessExpired {
		cycle: u64,
	},
}

/// Builder for a mounted form
///
/// # Examples
///
/// ```
/// use formstep_forms::{FormVariant, Transition};
/// use formstep_pages::FormController;
///
/// # #[tokio::main]
/// # async fn main() {
/// let form = FormController::new(FormVariant::FourStep).mount().await.unwrap();
///
/// let errors = form.change_field("fullName", "Ada").await.unwrap();
/// assert!(errors.is_empty());
/// assert_eq!(form.advance().await.unwrap(), Transition::Moved { from: 1, to: 2 });
///
/// let snapshot = form.snapshot().await.unwrap();
/// assert_eq!(snapshot.step_label, "Step 2 of 4");
/// assert_eq!(snapshot.visit_count, 1);
/// # }
/// ```
pub struct FormController {
	variant: FormVariant,
	definition: WizardDefinition,
	settings: Settings,
	backend: Option<Arc<dyn SubmissionBackend>>,
	store: Option<Arc<dyn KeyValueStore>>,
}

impl FormController {
	pub fn new(variant: FormVariant) -> Self {
		Self {
			variant,
			definition: steps_for(variant),
			settings: Settings::default(),
			backend: None,
			store: None,
		}
	}

	/// Controller for the variant served at `path`
	pub fn for_path(router: &FormRouter, path: &str) -> Result<Self, RouterError> {
		router.resolve(path).map(Self::new)
	}

	/// Replace the built-in step layout of the variant
	pub fn with_definition(mut self, definition: WizardDefinition) -> Self {
		self.definition = definition;
		self
	}

	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = settings;
		self
	}

	/// Defaults to a [`SimulatedBackend`] using the configured delay
	pub fn with_backend(mut self, backend: impl SubmissionBackend + 'static) -> Self {
		self.backend = Some(Arc::new(backend));
		self
	}

	/// Defaults to a file store when `storage.path` is set, in-memory otherwise
	pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
		self.store = Some(store);
		self
	}

	/// Record the visit and start the controller task
	///
	/// Settings are validated first. Must be called from within a tokio runtime.
	pub async fn mount(self) -> ControllerResult<FormHandle> {
		self.settings.validate()?;

		let instance = Uuid::new_v4();
		let span = tracing::info_span!("form", variant = %self.variant, %instance);

		let store: Arc<dyn KeyValueStore> = match (self.store, &self.settings.storage.path) {
			(Some(store), _) => store,
			(None, Some(path)) => Arc::new(FileStore::new(path)),
			(None, None) => Arc::new(InMemoryStore::new()),
		};
		let counter = VisitCounter::new(store, self.settings.storage.visit_counter_key.clone());
		let visit_count = counter.record_visit().instrument(span.clone()).await?;

		let backend: Arc<dyn SubmissionBackend> = match self.backend {
			Some(backend) => backend,
			None => Arc::new(SimulatedBackend::from_settings(&self.settings.submission)),
		};

		let (commands, queue) = mpsc::channel(COMMAND_BUFFER);
		let actor = FormActor {
			instance,
			variant: self.variant,
			wizard: FormWizard::new(self.definition),
			feedback: FeedbackPresenter::from_settings(&self.settings.feedback),
			verification: VerificationWidget::from_settings(&self.settings.verification),
			theme: Theme::default(),
			tasks: TaskGroup::new(format!("{}-{}", self.variant, instance)),
			backend,
			sender: commands.downgrade(),
			cycle: 0,
			visit_count,
		};
		let (publisher, snapshots) = watch::channel(actor.snapshot());

		span.in_scope(|| tracing::info!(visit_count, "form mounted"));
		tokio::spawn(actor.run(queue, publisher).instrument(span));

		Ok(FormHandle {
			commands,
			snapshots,
		})
	}
}

/// Cloneable handle to a mounted form
///
/// The form stays mounted until [`FormHandle::teardown`] is called or every
/// handle is dropped.
#[derive(Clone)]
pub struct FormHandle {
	commands: mpsc::Sender<Command>,
	snapshots: watch::Receiver<FormSnapshot>,
}

impl FormHandle {
	async fn request<T>(
		&self,
		command: impl FnOnce(oneshot::Sender<T>) -> Command,
	) -> ControllerResult<T> {
		let (reply, response) = oneshot::channel();
		self.commands
			.send(command(reply))
			.await
			.map_err(|_| ControllerError::Closed)?;
		response.await.map_err(|_| ControllerError::Closed)
	}

	/// Store a field value; returns the revalidated errors of the current step
	pub async fn change_field(
		&self,
		name: impl Into<String>,
		value: impl Into<FieldValue>,
	) -> ControllerResult<ErrorMap> {
		let name = name.into();
		let value = value.into();
		self.request(|reply| Command::ChangeField { name, value, reply })
			.await
	}

	/// Forward the verification widget's change callback
	pub async fn verify(&self, token: Option<&str>) -> ControllerResult<bool> {
		let token = token.map(str::to_string);
		self.request(|reply| Command::Verify { token, reply }).await
	}

	pub async fn advance(&self) -> ControllerResult<Transition> {
		let result = self.request(|reply| Command::Advance { reply }).await?;
		Ok(result?)
	}

	pub async fn retreat(&self) -> ControllerResult<Transition> {
		let result = self.request(|reply| Command::Retreat { reply }).await?;
		Ok(result?)
	}

	/// Validate the terminal step and start a submission
	///
	/// Returns as soon as the submission has started; watch
	/// [`FormSnapshot::is_submitting`] for its completion.
	pub async fn submit(&self) -> ControllerResult<Transition> {
		let result = self.request(|reply| Command::Submit { reply }).await?;
		Ok(result?)
	}

	pub async fn toggle_theme(&self) -> ControllerResult<Theme> {
		self.request(|reply| Command::ToggleTheme { reply }).await
	}

	/// Snapshot taken after every command queued before this call
	pub async fn snapshot(&self) -> ControllerResult<FormSnapshot> {
		self.request(|reply| Command::Snapshot { reply }).await
	}

	/// Most recently published snapshot, without a round trip
	pub fn latest(&self) -> FormSnapshot {
		self.snapshots.borrow().clone()
	}

	pub fn subscribe(&self) -> watch::Receiver<FormSnapshot> {
		self.snapshots.clone()
	}

	/// Cancel pending work and stop the controller; returns how many tasks were cancelled
	pub async fn teardown(&self) -> ControllerResult<usize> {
		self.request(|reply| Command::Teardown { reply }).await
	}

	pub fn is_closed(&self) -> bool {
		self.commands.is_closed()
	}
}

struct FormActor {
	instance: Uuid,
	variant: FormVariant,
	wizard: FormWizard,
	feedback: FeedbackPresenter,
	verification: VerificationWidget,
	theme: Theme,
	tasks: TaskGroup,
	backend: Arc<dyn SubmissionBackend>,
	sender: mpsc::WeakSender<Command>,
	/// Incremented per submission; stale results and timers carry an older value
	cycle: u64,
	visit_count: u64,
}

impl FormActor {
	async fn run(
		mut self,
		mut queue: mpsc::Receiver<Command>,
		publisher: watch::Sender<FormSnapshot>,
	) {
		while let Some(command) = queue.recv().await {
			let flow = self.handle(command);
			publisher.send_replace(self.snapshot());
			if flow.is_break() {
				break;
			}
		}
		let cancelled = self.tasks.cancel_all();
		tracing::info!(cancelled, "form torn down");
	}

	fn handle(&mut self, command: Command) -> ControlFlow<()> {
		match command {
			Command::ChangeField { name, value, reply } => {
				let errors = self.wizard.on_field_change(name, value).clone();
				let _ = reply.send(errors);
			}
			Command::Verify { token, reply } => {
				let verified = self.verification.token_verified(token.as_deref());
				self.wizard.on_verification(verified);
				let _ = reply.send(verified);
			}
			Command::Advance { reply } => {
				let result = self.wizard.advance();
				log_rejection("advance", &result);
				let _ = reply.send(result);
			}
			Command::Retreat { reply } => {
				let result = self.wizard.retreat();
				log_rejection("retreat", &result);
				let _ = reply.send(result);
			}
			Command::Submit { reply } => {
				let result = self.start_submission();
				log_rejection("submit", &result);
				let _ = reply.send(result);
			}
			Command::ToggleTheme { reply } => {
				self.theme = self.theme.toggled();
				tracing::debug!(theme = %self.theme, "theme toggled");
				let _ = reply.send(self.theme);
			}
			Command::Snapshot { reply } => {
				let _ = reply.send(self.snapshot());
			}
			Command::Teardown { reply } => {
				let _ = reply.send(self.tasks.cancel_all());
				return ControlFlow::Break(());
			}
			Command::SubmissionResolved { cycle, result } => {
				self.finish_submission(cycle, result);
			}
			Command::SuccessExpired { cycle } => {
				if self.feedback.dismiss(cycle) {
					tracing::debug!(cycle, "success notice dismissed");
				}
			}
		}
		ControlFlow::Continue(())
	}

	fn start_submission(&mut self) -> Result<Transition, WizardError> {
		let transition = self.wizard.submit()?;
		if let Transition::Submitting(values) = &transition {
			self.cycle += 1;
			let cycle = self.cycle;
			self.feedback.clear();
			self.tasks.cancel(SUCCESS_DISMISS);

			let backend = Arc::clone(&self.backend);
			let values = values.clone();
			let sender = self.sender.clone();
			self.tasks.spawn(SUBMISSION, async move {
				let result = backend.submit(values).await;
				notify(sender, Command::SubmissionResolved { cycle, result }).await;
			});
			tracing::info!(cycle, "submission started");
		}
		Ok(transition)
	}

	fn finish_submission(&mut self, cycle: u64, result: Result<(), SubmissionError>) {
		if cycle != self.cycle {
			tracing::trace!(cycle, current = self.cycle, "ignoring stale submission result");
			return;
		}
		match result {
			Ok(()) => {
				if self.wizard.complete_submission().is_err() {
					return;
				}
				self.feedback.show_success(cycle);
				let sender = self.sender.clone();
				self.tasks.schedule(
					SUCCESS_DISMISS,
					self.feedback.success_window(),
					notify(sender, Command::SuccessExpired { cycle }),
				);
				tracing::info!(cycle, "submission completed");
			}
			Err(error) => {
				if self.wizard.fail_submission().is_err() {
					return;
				}
				tracing::warn!(cycle, %error, "submission failed");
				self.feedback.show_failure(cycle, error.reason());
			}
		}
	}

	fn snapshot(&self) -> FormSnapshot {
		let wizard = &self.wizard;
		let total_steps = wizard.total_steps();
		FormSnapshot {
			instance: self.instance,
			variant: self.variant,
			title: self.variant.title(),
			current_step: wizard.current_step(),
			total_steps,
			step_label: wizard.step_label(),
			step_titles: wizard
				.definition()
				.steps()
				.iter()
				.map(|step| step.title.clone())
				.collect(),
			reached_steps: (1..=total_steps)
				.map(|index| wizard.is_step_reached(index))
				.collect(),
			progress: wizard.progress_percentage(),
			values: wizard.values().clone(),
			errors: wizard.errors().clone(),
			is_submitting: wizard.is_submitting(),
			is_verified_by_captcha: wizard.is_verified_by_captcha(),
			notice: self.feedback.notice().cloned(),
			theme: self.theme,
			theme_toggle_label: self.theme.toggle_label(),
			visit_count: self.visit_count,
			visit_tooltip: visit_tooltip(self.visit_count),
			site_key: self.verification.site_key().to_string(),
		}
	}
}

async fn notify(sender: mpsc::WeakSender<Command>, command: Command) {
	if let Some(sender) = sender.upgrade() {
		let _ = sender.send(command).await;
	}
}

fn log_rejection(action: &'static str, result: &Result<Transition, WizardError>) {
	if let Err(error) = result {
		tracing::warn!(action, %error, "command rejected");
	}
}
