use serde::{Deserialize, Serialize};

/// A beach cleanup event.
///
/// Only `participant_count` changes during a session (via join). The
/// weather badge is a display snapshot supplied by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date_label: String,
    #[serde(default)]
    pub location_label: String,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub weather_badge: String,
    /// Open tag such as "today", "weekend", "nearby"
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub featured: bool,
}

impl Event {
    /// Minimal event, handy for tests and fixtures
    pub fn new(id: u64, title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            date_label: String::new(),
            location_label: String::new(),
            participant_count: 0,
            weather_badge: String::new(),
            category: category.into(),
            featured: false,
        }
    }

    /// "1 volunteer" / "12 volunteers"
    pub fn participants_label(&self) -> String {
        match self.participant_count {
            1 => "1 volunteer".to_string(),
            n => format!("{} volunteers", n),
        }
    }
}
