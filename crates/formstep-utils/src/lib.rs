//! Utilities shared by formstep components
//!
//! - [`storage`]: string key-value stores and the [`VisitCounter`] built on them
//! - [`logging`]: one-shot `tracing` subscriber setup from [`LoggingSettings`]
//!
//! [`LoggingSettings`]: formstep_conf::LoggingSettings

pub mod logging;
pub mod storage;

pub use logging::{LoggingError, init_logging};
pub use storage::{FileStore, InMemoryStore, KeyValueStore, StorageError, StorageResult, VisitCounter};
