//! Wizard engine: field registry, validation and the step state machine.
//!
//! # Examples
//!
//! ```rust
//! use formstep::forms::{FormVariant, FormWizard};
//!
//! let wizard = FormWizard::for_variant(FormVariant::SinglePage);
//! assert_eq!(wizard.step_label(), "Step 1 of 1");
//! ```

pub use formstep_forms::*;
