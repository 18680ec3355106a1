//! Cleanup event catalog for Shoreline.
//!
//! Owns the session's mutable event list and the active filter, and
//! derives the rendered view from both after every mutation.

pub mod catalog;
pub mod source;
pub mod types;

pub use catalog::{EventCatalog, ALL_FILTER};
pub use source::{EventSource, SampleEventSource};
pub use types::Event;
