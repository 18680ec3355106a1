//! Orchestrates the weather and events subsystems.
//!
//! Fetches run on their own tasks and report back as `Fetched` messages,
//! so a slow forecast never holds up the event list or user commands. All
//! mutation still goes through `&mut self`, one message at a time.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use shoreline_core::{CatalogError, WeatherError};
use shoreline_events::{Event, EventCatalog, EventSource};
use shoreline_weather::{has_forecast_entries, normalize, Forecast, ForecastProvider, NormalizeOptions};
use tokio::sync::mpsc;

use crate::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    WeatherUnavailable,
    EventsUnavailable,
    LoadMoreFailed,
}

/// A transient, dismissible notification for the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Result of a background fetch on its way back to the controller.
///
/// `request` ties a result to the fetch that produced it; results from a
/// superseded request are dropped.
#[derive(Debug)]
pub enum Fetched {
    Forecast {
        request: u64,
        result: Result<Value, WeatherError>,
    },
    InitialEvents {
        request: u64,
        result: Result<Vec<Event>>,
    },
    MoreEvents(Result<Vec<Event>>),
}

pub type FetchSender = mpsc::UnboundedSender<Fetched>;

/// Everything the presentation layer renders, captured at one instant
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    /// Bumped on every publish by the command queue
    pub revision: u64,
    pub weather_phase: Phase,
    pub forecast: Option<Forecast>,
    pub events_phase: Phase,
    pub loading_more: bool,
    pub active_filter: String,
    pub events: Vec<Event>,
    pub featured: Option<Event>,
    pub categories: Vec<String>,
    pub notices: Vec<Notice>,
}

impl Snapshot {
    /// True while either subsystem is still on its first load
    pub fn is_loading(&self) -> bool {
        self.weather_phase == Phase::Loading || self.events_phase == Phase::Loading
    }
}

pub struct AppController<W, E> {
    provider: Arc<W>,
    source: Arc<E>,
    options: NormalizeOptions,
    catalog: EventCatalog,
    weather_phase: Phase,
    forecast: Option<Forecast>,
    weather_request: u64,
    events_phase: Phase,
    events_request: u64,
    loading_more: bool,
    notices: Vec<Notice>,
    next_notice_id: u64,
}

impl<W, E> AppController<W, E>
where
    W: ForecastProvider + 'static,
    E: EventSource + 'static,
{
    pub fn new(provider: W, source: E, options: NormalizeOptions) -> Self {
        Self {
            provider: Arc::new(provider),
            source: Arc::new(source),
            options,
            catalog: EventCatalog::new(),
            weather_phase: Phase::Loading,
            forecast: None,
            weather_request: 0,
            events_phase: Phase::Loading,
            events_request: 0,
            loading_more: false,
            notices: Vec::new(),
            next_notice_id: 1,
        }
    }

    /// Start the forecast and initial-events fetches side by side. Each
    /// result arrives on `fetched` independently.
    pub fn init(&mut self, fetched: &FetchSender) {
        self.refresh_weather(fetched);

        // A second init must not throw away a list that is already showing
        if self.events_phase != Phase::Ready {
            self.events_phase = Phase::Loading;
        }
        self.events_request += 1;
        let request = self.events_request;
        let source = Arc::clone(&self.source);
        let tx = fetched.clone();
        tokio::spawn(async move {
            let result = source.fetch_initial().await;
            if tx.send(Fetched::InitialEvents { request, result }).is_err() {
                tracing::debug!("Controller gone, dropping initial events");
            }
        });
    }

    /// Start a forecast fetch on its own. Any forecast on screen is cleared.
    pub fn refresh_weather(&mut self, fetched: &FetchSender) {
        self.weather_phase = Phase::Loading;
        self.forecast = None;
        self.weather_request += 1;

        let request = self.weather_request;
        let provider = Arc::clone(&self.provider);
        let tx = fetched.clone();
        tokio::spawn(async move {
            let result = provider.fetch_forecast().await;
            if tx.send(Fetched::Forecast { request, result }).is_err() {
                tracing::debug!("Controller gone, dropping forecast");
            }
        });
    }

    /// Start fetching the next page. False if the command is not accepted.
    pub fn load_more(&mut self, fetched: &FetchSender) -> bool {
        if !self.events_phase.can_accept_commands() || self.loading_more {
            tracing::debug!("Ignoring load more (phase {:?})", self.events_phase);
            return false;
        }
        self.loading_more = true;

        let source = Arc::clone(&self.source);
        let tx = fetched.clone();
        tokio::spawn(async move {
            let result = source.fetch_more().await;
            if tx.send(Fetched::MoreEvents(result)).is_err() {
                tracing::debug!("Controller gone, dropping next page");
            }
        });
        true
    }

    /// Apply a finished fetch.
    pub fn apply(&mut self, fetched: Fetched) {
        match fetched {
            Fetched::Forecast { request, result } if request == self.weather_request => {
                self.apply_forecast(result)
            }
            Fetched::InitialEvents { request, result } if request == self.events_request => {
                self.apply_initial_events(result)
            }
            Fetched::MoreEvents(result) => self.finish_load_more(result),
            Fetched::Forecast { request, .. } | Fetched::InitialEvents { request, .. } => {
                tracing::debug!("Dropping result of superseded request {}", request);
            }
        }
    }

    /// Set the event filter. `None` while events are not ready.
    pub fn set_filter(&mut self, tag: &str) -> Option<Vec<Event>> {
        if !self.events_phase.can_accept_commands() {
            tracing::debug!("Ignoring filter '{}' while events are {:?}", tag, self.events_phase);
            return None;
        }
        Some(self.catalog.set_filter(tag))
    }

    /// Join an event. Unknown ids are logged and ignored.
    pub fn join(&mut self, id: u64) -> Option<Event> {
        if !self.events_phase.can_accept_commands() {
            tracing::debug!("Ignoring join {} while events are {:?}", id, self.events_phase);
            return None;
        }
        match self.catalog.join(id) {
            Ok(event) => {
                tracing::info!("Joined event {} ({} volunteers)", id, event.participant_count);
                Some(event)
            }
            Err(e @ CatalogError::NotFound(_)) => {
                tracing::warn!("Join ignored: {}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Join failed: {}", e);
                None
            }
        }
    }

    fn apply_forecast(&mut self, result: Result<Value, WeatherError>) {
        let checked = result.and_then(|raw| {
            if has_forecast_entries(&raw) {
                Ok(raw)
            } else {
                Err(WeatherError::EmptyPayload)
            }
        });

        match checked {
            Ok(raw) => {
                let forecast = normalize(&raw, &self.options);
                tracing::info!(
                    "Forecast ready: {} ({})",
                    forecast.condition_text,
                    forecast.temperature_label()
                );
                self.forecast = Some(forecast);
                self.weather_phase = self.weather_phase.on_loaded();
            }
            Err(e) => {
                tracing::warn!("Weather unavailable: {}", e);
                self.forecast = None;
                self.weather_phase = self.weather_phase.on_weather_failed();
                self.push_notice(NoticeKind::WeatherUnavailable, e.user_message());
            }
        }
    }

    fn apply_initial_events(&mut self, result: Result<Vec<Event>>) {
        match result {
            Ok(events) => {
                match self.catalog.load(events) {
                    Ok(()) => {}
                    Err(CatalogError::EmptyCatalog) => {
                        tracing::info!("No events on first load, showing empty state");
                    }
                    Err(e) => tracing::warn!("Catalog load failed: {}", e),
                }
                self.events_phase = self.events_phase.on_loaded();
            }
            Err(e) => {
                tracing::warn!("Event fetch failed: {:#}", e);
                self.events_phase = self.events_phase.on_events_failed();
                self.push_notice(
                    NoticeKind::EventsUnavailable,
                    "Couldn't load cleanups. Please try again.",
                );
            }
        }
    }

    fn finish_load_more(&mut self, result: Result<Vec<Event>>) {
        self.loading_more = false;
        match result {
            Ok(more) if more.is_empty() => tracing::debug!("No more events to load"),
            Ok(more) => self.catalog.append(more),
            Err(e) => {
                tracing::warn!("Load more failed: {:#}", e);
                self.push_notice(
                    NoticeKind::LoadMoreFailed,
                    "Couldn't load more cleanups. Please try again.",
                );
            }
        }
    }

    /// Add a notice, replacing any earlier one of the same kind
    fn push_notice(&mut self, kind: NoticeKind, message: &str) {
        self.notices.retain(|n| n.kind != kind);
        let id = self.next_notice_id;
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id,
            kind,
            message: message.to_string(),
        });
    }

    /// Remove a notice; unknown ids are ignored
    pub fn dismiss_notice(&mut self, id: u64) {
        self.notices.retain(|n| n.id != id);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn weather_phase(&self) -> Phase {
        self.weather_phase
    }

    pub fn events_phase(&self) -> Phase {
        self.events_phase
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn current_view(&self) -> Vec<Event> {
        self.catalog.current_view()
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: 0,
            weather_phase: self.weather_phase,
            forecast: self.forecast.clone(),
            events_phase: self.events_phase,
            loading_more: self.loading_more,
            active_filter: self.catalog.active_filter().to_string(),
            events: self.catalog.current_view(),
            featured: self.catalog.featured().cloned(),
            categories: self.catalog.categories(),
            notices: self.notices.clone(),
        }
    }
}
