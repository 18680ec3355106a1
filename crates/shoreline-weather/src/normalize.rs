//! Raw forecast payload -> `Forecast`.
//!
//! The payload is read through `serde_json::Value` rather than strict
//! structs: any field may be missing or mistyped, and each one falls back
//! to its own default instead of failing the whole forecast.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use serde_json::Value;

use crate::classify::classify;
use crate::types::{Forecast, ForecastPeriod, PeriodLabel, Range, Wind};

pub const DEFAULT_FORECAST_TEXT: &str = "No forecast available";
pub const DEFAULT_TEMPERATURE_C: (i32, i32) = (24, 32);
pub const DEFAULT_HUMIDITY_PCT: (i32, i32) = (60, 95);
pub const DEFAULT_REGION_TEXT: &str = "Fair";
pub const MAX_PERIODS: usize = 4;

/// Knobs for normalization
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Region names consulted in priority order for each period
    pub regions: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            regions: vec!["east".to_string(), "central".to_string()],
        }
    }
}

/// True when the payload has at least one forecast entry.
///
/// Callers must check this before `normalize`; an empty payload is a
/// fetch failure, not a forecast.
pub fn has_forecast_entries(raw: &Value) -> bool {
    raw.get("items")
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}

/// Normalize a raw payload. Never fails.
pub fn normalize(raw: &Value, options: &NormalizeOptions) -> Forecast {
    let entry = raw
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .unwrap_or(&Value::Null);
    let general = entry.get("general").unwrap_or(&Value::Null);

    let condition_text = text_of(general.get("forecast"))
        .unwrap_or_else(|| DEFAULT_FORECAST_TEXT.to_string());
    let class = classify(&condition_text);

    let temperature_range_c = range_of(general.get("temperature"), DEFAULT_TEMPERATURE_C);
    let humidity_range_pct = range_of(general.get("relative_humidity"), DEFAULT_HUMIDITY_PCT);

    let periods = entry
        .get("periods")
        .and_then(Value::as_array)
        .map(|periods| {
            periods
                .iter()
                .take(MAX_PERIODS)
                .map(|p| period_of(p, &options.regions))
                .collect()
        })
        .unwrap_or_default();

    Forecast {
        temperature_c: temperature_range_c.midpoint(),
        temperature_range_c,
        condition_icon: class.icon,
        condition_label: class.short_label.to_string(),
        rain_summary: class.rain_summary.to_string(),
        severity: class.severity,
        condition_text,
        humidity_range_pct,
        wind: wind_of(general.get("wind")),
        valid_period: valid_period_of(entry.get("valid_period")),
        periods,
    }
}

fn period_of(period: &Value, regions: &[String]) -> ForecastPeriod {
    let label = period
        .get("time")
        .and_then(|t| t.get("start"))
        .and_then(Value::as_str)
        .and_then(start_hour)
        .map(PeriodLabel::from_hour)
        .unwrap_or(PeriodLabel::Soon);

    let region_map = period.get("regions");
    let region_text = regions
        .iter()
        .find_map(|name| text_of(region_map.and_then(|m| m.get(name))))
        .unwrap_or_else(|| DEFAULT_REGION_TEXT.to_string());

    let class = classify(&region_text);
    ForecastPeriod {
        label,
        icon: class.icon,
        short_label: class.short_label.to_string(),
        severity: class.severity,
        region_text,
    }
}

/// Wall-clock hour of a period start, in the timestamp's own offset
fn start_hour(start: &str) -> Option<u32> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(start) {
        return Some(dt.hour());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(start, fmt) {
            return Some(dt.hour());
        }
    }
    // Date part unreadable, but the time after 'T' may still be usable
    let (_, time) = start.rsplit_once('T')?;
    NaiveTime::parse_from_str(time.get(..5)?, "%H:%M")
        .ok()
        .map(|t| t.hour())
}

/// Text from either a plain string or an object with a `text` field
fn text_of(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("text")?.as_str()?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn int_of(value: Option<&Value>) -> Option<i32> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(|f| i32::try_from(f.round() as i64).ok()),
        _ => None,
    }
}

fn range_of(value: Option<&Value>, default: (i32, i32)) -> Range {
    let low = int_of(value.and_then(|v| v.get("low"))).unwrap_or(default.0);
    let high = int_of(value.and_then(|v| v.get("high"))).unwrap_or(default.1);
    Range::new(low, high)
}

fn wind_of(value: Option<&Value>) -> Option<Wind> {
    let wind = value?;
    let speed = wind.get("speed")?;
    let low = int_of(speed.get("low"))?;
    let high = int_of(speed.get("high"))?;
    Some(Wind {
        speed_kmh: Range::new(low, high),
        direction: text_of(wind.get("direction")),
    })
}

fn valid_period_of(value: Option<&Value>) -> Option<String> {
    let value = value?;
    if let Some(text) = text_of(Some(value)) {
        return Some(text);
    }
    let start = value.get("start")?.as_str()?;
    let end = value.get("end")?.as_str()?;
    Some(format!("{} to {}", start, end))
}
