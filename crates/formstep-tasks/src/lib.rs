//! Cancellable background tasks for formstep
//!
//! Components schedule their timers through a [`TaskGroup`]. Each task occupies a
//! named slot; scheduling into an occupied slot aborts the previous task, and
//! dropping the group aborts everything still pending, so a torn-down component
//! can never be touched by one of its own timers.

pub mod group;

pub use group::{TaskGroup, TaskSlot};
