//! Settings module.
//!
//! # Examples
//!
//! ```rust
//! use formstep::conf::SettingsBuilder;
//!
//! let settings = SettingsBuilder::new().build().unwrap();
//! assert_eq!(settings.storage.visit_counter_key, "visitCount");
//! ```

pub use formstep_conf::*;
