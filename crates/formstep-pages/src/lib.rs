//! Page-level runtime for formstep forms
//!
//! [`FormController`] mounts a form variant as an actor task and hands back a
//! [`FormHandle`]. The rest of this crate holds the pieces the controller
//! composes:
//!
//! - [`submission`]: the backend a validated form is handed to
//! - [`feedback`]: success and failure notices, visit tooltip
//! - [`theme`]: light/dark toggle
//! - [`router`]: `/contact`, `/next` and `/multi`
//! - [`verification`]: human-verification widget adapter

pub mod controller;
pub mod feedback;
pub mod router;
pub mod submission;
pub mod theme;
pub mod verification;

pub use controller::{ControllerError, ControllerResult, FormController, FormHandle, FormSnapshot};
pub use feedback::{FeedbackPresenter, Notice, NoticeKind, visit_tooltip};
pub use router::{FormRouter, Route, RouterError};
pub use submission::{SimulatedBackend, SubmissionBackend, SubmissionError};
pub use theme::Theme;
pub use verification::VerificationWidget;
