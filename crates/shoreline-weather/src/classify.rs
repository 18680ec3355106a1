//! Condition text classification.
//!
//! One ordered rule table serves both the current conditions and every
//! forecast period, so the same text always gets the same icon. Rules are
//! checked top to bottom and the first match wins.

use serde::Serialize;

use crate::types::Icon;

/// Result of classifying a condition text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub icon: Icon,
    pub short_label: &'static str,
    pub rain_summary: &'static str,
    /// 0 = fair weather, 4 = thunderstorms
    pub severity: u8,
}

enum Keywords {
    /// Matches when any keyword occurs
    Any(&'static [&'static str]),
    /// Matches only when every keyword occurs, in any order
    All(&'static [&'static str]),
}

impl Keywords {
    fn matches(&self, text: &str) -> bool {
        match self {
            Keywords::Any(words) => words.iter().any(|w| text.contains(w)),
            Keywords::All(words) => words.iter().all(|w| text.contains(w)),
        }
    }
}

struct Rule {
    keywords: Keywords,
    class: Classification,
}

const RULES: &[Rule] = &[
    Rule {
        keywords: Keywords::Any(&["thunder", "storm"]),
        class: Classification {
            icon: Icon::Stormy,
            short_label: "Thundery",
            rain_summary: "Thunderstorms expected",
            severity: 4,
        },
    },
    // Must precede the generic rain rule
    Rule {
        keywords: Keywords::Any(&["heavy rain", "heavy showers"]),
        class: Classification {
            icon: Icon::HeavyRain,
            short_label: "Heavy Rain",
            rain_summary: "Heavy rain likely",
            severity: 3,
        },
    },
    Rule {
        keywords: Keywords::Any(&["rain", "showers"]),
        class: Classification {
            icon: Icon::LightRain,
            short_label: "Showers",
            rain_summary: "Showers possible",
            severity: 2,
        },
    },
    Rule {
        keywords: Keywords::All(&["cloudy", "partly"]),
        class: Classification {
            icon: Icon::PartlyCloudy,
            short_label: "Partly Cloudy",
            rain_summary: "May see some clouds",
            severity: 1,
        },
    },
    Rule {
        keywords: Keywords::Any(&["cloudy", "overcast"]),
        class: Classification {
            icon: Icon::Cloudy,
            short_label: "Cloudy",
            rain_summary: "May see some clouds",
            severity: 1,
        },
    },
    Rule {
        keywords: Keywords::Any(&["fair", "sunny"]),
        class: Classification {
            icon: Icon::Sunny,
            short_label: "Fair",
            rain_summary: "Good beach weather!",
            severity: 0,
        },
    },
    Rule {
        keywords: Keywords::Any(&["hazy", "haze"]),
        class: Classification {
            icon: Icon::Haze,
            short_label: "Hazy",
            rain_summary: "Hazy skies, check air quality",
            severity: 1,
        },
    },
];

const FALLBACK: Classification = Classification {
    icon: Icon::PartlySunny,
    short_label: "Fair",
    rain_summary: "Good beach weather!",
    severity: 0,
};

/// Classify a free-text condition, case-insensitively.
pub fn classify(text: &str) -> Classification {
    let text = text.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.matches(&text))
        .map(|rule| rule.class)
        .unwrap_or(FALLBACK)
}
