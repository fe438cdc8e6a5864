//! Cancellable delayed tasks.

pub use formstep_tasks::*;
