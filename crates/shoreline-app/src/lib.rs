//! Application controller for Shoreline.
//!
//! Wires the forecast provider and event source into the catalog and
//! normalizer, and exposes read-only view models plus the `init`,
//! `set_filter`, `join` and `load_more` commands to the presentation layer.

pub mod controller;
pub mod phase;
pub mod service;

pub use controller::{AppController, FetchSender, Fetched, Notice, NoticeKind, Snapshot};
pub use phase::Phase;
pub use service::{spawn, Command, ControllerHandle};
