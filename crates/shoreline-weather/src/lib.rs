//! Forecast normalization for Shoreline
//!
//! Turns the loosely-structured 24-hour forecast payload into a stable
//! `Forecast` view model, classifying every condition text through one
//! shared rule table.

pub mod classify;
pub mod normalize;
pub mod provider;
pub mod retry;
pub mod types;

pub use classify::{classify, Classification};
pub use normalize::{has_forecast_entries, normalize, NormalizeOptions};
pub use provider::{ForecastProvider, HttpForecastProvider};
pub use types::*;
