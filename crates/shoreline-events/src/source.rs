//! Event sources.
//!
//! `SampleEventSource` serves the bundled dataset page by page with a
//! simulated network delay, standing in for a real events backend.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use shoreline_core::EventsConfig;

use crate::types::Event;

const BUNDLED_EVENTS: &str = include_str!("../data/events.json");

/// Supplier of event records. Order is only stable within one response.
pub trait EventSource: Send + Sync {
    fn fetch_initial(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;

    /// Next page after everything fetched so far; empty once exhausted.
    fn fetch_more(&self) -> impl Future<Output = Result<Vec<Event>>> + Send;
}

#[derive(Debug)]
pub struct SampleEventSource {
    events: Vec<Event>,
    page_size: usize,
    latency: Duration,
    cursor: AtomicUsize,
}

impl SampleEventSource {
    /// Source over the bundled cleanup dataset
    pub fn bundled(config: &EventsConfig) -> Result<Self> {
        let events: Vec<Event> =
            serde_json::from_str(BUNDLED_EVENTS).context("Failed to parse bundled events")?;
        Ok(Self::from_events(
            events,
            config.page_size,
            Duration::from_millis(config.fetch_latency_ms),
        ))
    }

    pub fn from_events(events: Vec<Event>, page_size: usize, latency: Duration) -> Self {
        Self {
            events,
            page_size: page_size.max(1),
            latency,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Events not yet served
    pub fn remaining(&self) -> usize {
        self.events
            .len()
            .saturating_sub(self.cursor.load(Ordering::SeqCst))
    }

    fn page_from(&self, start: usize) -> Vec<Event> {
        let start = start.min(self.events.len());
        let end = start.saturating_add(self.page_size).min(self.events.len());
        self.cursor.store(end, Ordering::SeqCst);
        self.events[start..end].to_vec()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl EventSource for SampleEventSource {
    async fn fetch_initial(&self) -> Result<Vec<Event>> {
        self.simulate_latency().await;
        let page = self.page_from(0);
        tracing::debug!("Serving {} initial events", page.len());
        Ok(page)
    }

    async fn fetch_more(&self) -> Result<Vec<Event>> {
        self.simulate_latency().await;
        let page = self.page_from(self.cursor.load(Ordering::SeqCst));
        tracing::debug!("Serving {} more events, {} remaining", page.len(), self.remaining());
        Ok(page)
    }
}
