//! Per-subsystem load phase (Loading -> Ready | Error).
//!
//! Weather and events each own one of these and never block each other.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Loading,
    Ready,
    Error,
}

impl Phase {
    /// True if user commands may run against this subsystem.
    pub fn can_accept_commands(self) -> bool {
        matches!(self, Phase::Ready)
    }

    /// State after a successful fetch.
    pub fn on_loaded(self) -> Self {
        Phase::Ready
    }

    /// State after a failed weather fetch. There is no earlier forecast
    /// worth keeping, so this is always `Error`.
    pub fn on_weather_failed(self) -> Self {
        Phase::Error
    }

    /// State after a failed events fetch. A `Ready` list survives.
    pub fn on_events_failed(self) -> Self {
        match self {
            Phase::Ready => Phase::Ready,
            Phase::Loading | Phase::Error => Phase::Error,
        }
    }
}
