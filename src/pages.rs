//! Mounted forms and their presenters.

pub use formstep_pages::*;
