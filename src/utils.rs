//! Storage and logging utilities.

pub use formstep_utils::*;
