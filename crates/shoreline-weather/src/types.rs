use serde::{Deserialize, Serialize};

/// Condition icons understood by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Stormy,
    HeavyRain,
    LightRain,
    PartlyCloudy,
    Cloudy,
    Sunny,
    Haze,
    #[default]
    PartlySunny,
}

impl Icon {
    /// Get icon name (glyph lookup happens in the renderer)
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Stormy => "cloud_lightning",
            Self::HeavyRain => "cloud_rain_heavy",
            Self::LightRain => "cloud_rain",
            Self::PartlyCloudy => "cloud_sun",
            Self::Cloudy => "cloud",
            Self::Sunny => "sun",
            Self::Haze => "cloud_fog",
            Self::PartlySunny => "sun_cloud",
        }
    }
}

/// Inclusive low/high pair; `low <= high` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub low: i32,
    pub high: i32,
}

impl Range {
    /// Build a range, swapping the bounds if they arrive inverted
    pub fn new(a: i32, b: i32) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Midpoint rounded half away from zero
    pub fn midpoint(&self) -> i32 {
        // Halves round up, so (-3, -2) gives -2
        ((f64::from(self.low) + f64::from(self.high)) / 2.0 + 0.5).floor() as i32
    }
}

/// Time-of-day band of a forecast period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodLabel {
    Morning,
    Afternoon,
    Evening,
    Night,
    Soon,
}

impl PeriodLabel {
    /// Hour bands: [6,12) morning, [12,18) afternoon, [18,21) evening, else night
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=20 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
            Self::Soon => "Soon",
        }
    }
}

/// One sub-interval of the forecast day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub label: PeriodLabel,
    pub region_text: String,
    pub icon: Icon,
    pub short_label: String,
    pub severity: u8,
}

/// Reported wind, when the payload carries it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wind {
    pub speed_kmh: Range,
    pub direction: Option<String>,
}

/// Display-ready forecast for the current day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub temperature_c: i32,
    pub temperature_range_c: Range,
    pub condition_text: String,
    pub condition_icon: Icon,
    pub condition_label: String,
    pub rain_summary: String,
    pub severity: u8,
    pub humidity_range_pct: Range,
    pub wind: Option<Wind>,
    pub valid_period: Option<String>,
    pub periods: Vec<ForecastPeriod>,
}

impl Forecast {
    /// "25–31°C"
    pub fn temperature_label(&self) -> String {
        format!(
            "{}–{}°C",
            self.temperature_range_c.low, self.temperature_range_c.high
        )
    }

    /// "70–90%"
    pub fn humidity_label(&self) -> String {
        format!(
            "{}–{}%",
            self.humidity_range_pct.low, self.humidity_range_pct.high
        )
    }

    /// Planning cue: no rain or storms now or in any upcoming period
    pub fn is_beach_friendly(&self) -> bool {
        self.severity <= 1 && self.periods.iter().all(|p| p.severity <= 1)
    }
}
