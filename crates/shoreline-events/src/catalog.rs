//! The session's authoritative event list.
//!
//! There is no cached filtered list: every view is recomputed from
//! `(events, active_filter)`, so it cannot drift from stored state.

use std::collections::HashSet;

use shoreline_core::CatalogError;

use crate::types::Event;

/// Reserved filter tag meaning "no restriction". Never a stored category.
pub const ALL_FILTER: &str = "all";

#[derive(Debug, Clone)]
pub struct EventCatalog {
    events: Vec<Event>,
    active_filter: String,
    loaded: bool,
}

impl Default for EventCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl EventCatalog {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            active_filter: ALL_FILTER.to_string(),
            loaded: false,
        }
    }

    /// Replace the event list and reset the filter to "all".
    ///
    /// # Errors
    /// `EmptyCatalog` when no events arrive before the catalog has ever
    /// been loaded. Later empty loads simply clear the list.
    pub fn load(&mut self, initial: Vec<Event>) -> Result<(), CatalogError> {
        if initial.is_empty() && !self.loaded {
            return Err(CatalogError::EmptyCatalog);
        }

        let mut seen = HashSet::with_capacity(initial.len());
        self.events = initial
            .into_iter()
            .filter(|e| {
                let fresh = seen.insert(e.id);
                if !fresh {
                    tracing::warn!("Dropping duplicate event id {} from load", e.id);
                }
                fresh
            })
            .collect();
        self.active_filter = ALL_FILTER.to_string();
        self.loaded = true;

        tracing::debug!("Catalog loaded with {} events", self.events.len());
        Ok(())
    }

    /// Append events after the existing ones. The filter is untouched.
    pub fn append(&mut self, more: Vec<Event>) {
        let mut seen: HashSet<u64> = self.events.iter().map(|e| e.id).collect();
        let before = self.events.len();

        for event in more {
            if seen.insert(event.id) {
                self.events.push(event);
            } else {
                tracing::warn!("Skipping appended event with existing id {}", event.id);
            }
        }

        tracing::debug!("Appended {} events", self.events.len() - before);
    }

    /// Set the active filter and return the resulting view.
    pub fn set_filter(&mut self, tag: &str) -> Vec<Event> {
        self.active_filter = tag.to_string();
        self.current_view()
    }

    /// Add one participant to the event with `id`.
    ///
    /// # Errors
    /// `NotFound` when no stored event has that id.
    pub fn join(&mut self, id: u64) -> Result<Event, CatalogError> {
        let event = self
            .events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(CatalogError::NotFound(id))?;

        event.participant_count = event.participant_count.saturating_add(1);
        Ok(event.clone())
    }

    /// Stored events matching the active filter, in stored order.
    pub fn current_view(&self) -> Vec<Event> {
        self.events
            .iter()
            .filter(|e| self.matches_filter(e))
            .cloned()
            .collect()
    }

    fn matches_filter(&self, event: &Event) -> bool {
        self.active_filter == ALL_FILTER || event.category == self.active_filter
    }

    pub fn active_filter(&self) -> &str {
        &self.active_filter
    }

    /// Every stored event, unfiltered
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn get(&self, id: u64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// First featured event in stored order.
    ///
    /// Several events may carry the flag; the earliest one wins.
    pub fn featured(&self) -> Option<&Event> {
        self.events.iter().find(|e| e.featured)
    }

    /// Distinct categories in order of first appearance, for filter chips.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();
        for event in &self.events {
            if seen.insert(event.category.as_str()) {
                categories.push(event.category.clone());
            }
        }
        categories
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
