//! Task group with named, replaceable slots

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::task::AbortHandle;

/// Name of a slot in a [`TaskGroup`]
pub type TaskSlot = &'static str;

/// Owner of a component's background tasks
///
/// # Examples
///
/// ```
/// use formstep_tasks::TaskGroup;
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut tasks = TaskGroup::new("contact-form");
/// tasks.schedule("dismiss", Duration::from_secs(5), async {
///     // hide the banner
/// });
/// assert!(tasks.is_pending("dismiss"));
///
/// assert!(tasks.cancel("dismiss"));
/// assert!(!tasks.is_pending("dismiss"));
/// # }
/// ```
pub struct TaskGroup {
	name: String,
	slots: HashMap<TaskSlot, AbortHandle>,
}

impl TaskGroup {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			slots: HashMap::new(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Run `future` in `slot`, aborting whatever occupied the slot before
	///
	/// Must be called from within a tokio runtime.
	pub fn spawn<F>(&mut self, slot: TaskSlot, future: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		if let Some(existing) = self.slots.remove(slot) {
			existing.abort();
			tracing::trace!(group = %self.name, slot, "replaced pending task");
		}
		let handle = tokio::spawn(future).abort_handle();
		self.slots.insert(slot, handle);
	}

	/// Run `future` in `slot` once `delay` has elapsed
	pub fn schedule<F>(&mut self, slot: TaskSlot, delay: Duration, future: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		self.spawn(slot, async move {
			tokio::time::sleep(delay).await;
			future.await;
		});
	}

	/// Abort the task in `slot`; returns whether it was still pending
	pub fn cancel(&mut self, slot: TaskSlot) -> bool {
		match self.slots.remove(slot) {
			Some(handle) => {
				let pending = !handle.is_finished();
				handle.abort();
				if pending {
					tracing::trace!(group = %self.name, slot, "cancelled task");
				}
				pending
			}
			None => false,
		}
	}

	/// Abort every task; returns how many were still pending
	pub fn cancel_all(&mut self) -> usize {
		let mut cancelled = 0;
		for (_, handle) in self.slots.drain() {
			if !handle.is_finished() {
				cancelled += 1;
			}
			handle.abort();
		}
		if cancelled > 0 {
			tracing::debug!(group = %self.name, cancelled, "cancelled pending tasks");
		}
		cancelled
	}

	pub fn is_pending(&self, slot: TaskSlot) -> bool {
		self.slots
			.get(slot)
			.is_some_and(|handle| !handle.is_finished())
	}

	/// Number of tasks that have not finished yet
	pub fn pending(&self) -> usize {
		self.slots
			.values()
			.filter(|handle| !handle.is_finished())
			.count()
	}
}

impl Drop for TaskGroup {
	fn drop(&mut self) {
		self.cancel_all();
	}
}
