//! End-to-end tests of the controller behind its command queue, using
//! in-memory providers.

use std::sync::Mutex;
use std::time::Duration;

use serde_json::{json, Value};
use shoreline_app::{spawn, AppController, NoticeKind, Phase, Snapshot};
use shoreline_core::WeatherError;
use shoreline_events::{Event, EventSource, SampleEventSource};
use shoreline_weather::{ForecastProvider, Icon, NormalizeOptions, PeriodLabel};

struct FixedForecast(Mutex<Vec<Result<Value, WeatherError>>>);

impl FixedForecast {
    fn new(mut responses: Vec<Result<Value, WeatherError>>) -> Self {
        responses.reverse();
        Self(Mutex::new(responses))
    }
}

impl ForecastProvider for FixedForecast {
    async fn fetch_forecast(&self) -> Result<Value, WeatherError> {
        self.0
            .lock()
            .unwrap()
            .pop()
            .unwrap_or(Err(WeatherError::ProviderUnavailable("no response queued".into())))
    }
}

/// Answers after a long delay, like a forecast endpoint that is timing out
struct SlowForecast(Duration);

impl ForecastProvider for SlowForecast {
    async fn fetch_forecast(&self) -> Result<Value, WeatherError> {
        tokio::time::sleep(self.0).await;
        Ok(thundery_payload())
    }
}

/// Always fails, for checking the events subsystem keeps its last good list
struct BrokenSource;

impl EventSource for BrokenSource {
    async fn fetch_initial(&self) -> anyhow::Result<Vec<Event>> {
        anyhow::bail!("events backend offline")
    }

    async fn fetch_more(&self) -> anyhow::Result<Vec<Event>> {
        anyhow::bail!("events backend offline")
    }
}

fn thundery_payload() -> Value {
    json!({
        "items": [{
            "general": {
                "forecast": "Thundery Showers",
                "temperature": {"low": 25, "high": 31},
                "relative_humidity": {"low": 70, "high": 90}
            },
            "periods": [{
                "time": {"start": "2024-05-01T07:00:00+08:00"},
                "regions": {"east": "Showers"}
            }]
        }]
    })
}

fn events(fixtures: &[(u64, &str)]) -> Vec<Event> {
    fixtures
        .iter()
        .map(|(id, category)| Event::new(*id, format!("Cleanup {}", id), *category))
        .collect()
}

fn ids(snapshot: &Snapshot) -> Vec<u64> {
    snapshot.events.iter().map(|e| e.id).collect()
}

#[tokio::test]
async fn test_init_publishes_ready_snapshot() {
    let controller = AppController::new(
        FixedForecast::new(vec![Ok(thundery_payload())]),
        SampleEventSource::from_events(events(&[(1, "today"), (2, "weekend")]), 10, Duration::ZERO),
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);

    assert!(handle.snapshot().is_loading());
    handle.init().unwrap();
    let snapshot = handle.wait_for(|s| !s.is_loading()).await.unwrap();

    let forecast = snapshot.forecast.as_ref().unwrap();
    assert_eq!(forecast.temperature_c, 28);
    assert_eq!(forecast.condition_icon, Icon::Stormy);
    assert_eq!(forecast.periods[0].label, PeriodLabel::Morning);
    assert_eq!(forecast.periods[0].icon, Icon::LightRain);
    assert_eq!(ids(&snapshot), vec![1, 2]);
    assert_eq!(snapshot.categories, vec!["today", "weekend"]);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_filter_join_scenario() {
    let controller = AppController::new(
        FixedForecast::new(vec![Ok(thundery_payload())]),
        SampleEventSource::from_events(events(&[(1, "today"), (2, "weekend")]), 10, Duration::ZERO),
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);

    handle.init().unwrap();
    handle.wait_for(|s| !s.is_loading()).await.unwrap();
    handle.set_filter("today").unwrap();
    handle.join(1).unwrap();
    let snapshot = handle
        .wait_for(|s| s.events.first().is_some_and(|e| e.participant_count == 1))
        .await
        .unwrap();

    assert_eq!(snapshot.active_filter, "today");
    assert_eq!(ids(&snapshot), vec![1]);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_rapid_double_join_applies_twice() {
    let controller = AppController::new(
        FixedForecast::new(vec![Ok(thundery_payload())]),
        SampleEventSource::from_events(events(&[(1, "today")]), 10, Duration::ZERO),
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::from_millis(300));

    handle.init().unwrap();
    handle.wait_for(|s| s.events_phase == Phase::Ready).await.unwrap();
    handle.join(1).unwrap();
    handle.join(1).unwrap();
    let snapshot = handle
        .wait_for(|s| s.events.first().is_some_and(|e| e.participant_count >= 2))
        .await
        .unwrap();
    assert_eq!(snapshot.events[0].participant_count, 2);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_weather_failure_does_not_block_events() {
    let controller = AppController::new(
        FixedForecast::new(vec![Ok(json!({"items": []})), Ok(thundery_payload())]),
        SampleEventSource::from_events(events(&[(1, "today")]), 10, Duration::ZERO),
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);

    handle.init().unwrap();
    let snapshot = handle.wait_for(|s| !s.is_loading()).await.unwrap();

    assert_eq!(snapshot.weather_phase, Phase::Error);
    assert!(snapshot.forecast.is_none());
    assert_eq!(snapshot.events_phase, Phase::Ready);
    assert_eq!(snapshot.notices.len(), 1);
    assert_eq!(snapshot.notices[0].kind, NoticeKind::WeatherUnavailable);

    // Retry succeeds
    handle.refresh_weather().unwrap();
    let snapshot = handle.wait_for(|s| s.forecast.is_some()).await.unwrap();
    assert_eq!(snapshot.weather_phase, Phase::Ready);

    handle.dismiss_notice(snapshot.notices[0].id).unwrap();
    let snapshot = handle.wait_for(|s| s.notices.is_empty()).await.unwrap();
    assert_eq!(snapshot.weather_phase, Phase::Ready);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_events_failure_on_first_load_is_error() {
    let controller = AppController::new(
        FixedForecast::new(vec![Ok(thundery_payload())]),
        BrokenSource,
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);

    handle.init().unwrap();
    let snapshot = handle.wait_for(|s| !s.is_loading()).await.unwrap();

    assert_eq!(snapshot.weather_phase, Phase::Ready);
    assert_eq!(snapshot.events_phase, Phase::Error);
    assert!(snapshot
        .notices
        .iter()
        .any(|n| n.kind == NoticeKind::EventsUnavailable));

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_load_more_appends_under_active_filter() {
    let source = SampleEventSource::from_events(
        events(&[(1, "today"), (2, "weekend"), (3, "weekend"), (4, "today")]),
        2,
        Duration::from_millis(400),
    );
    let controller = AppController::new(
        FixedForecast::new(vec![Ok(thundery_payload())]),
        source,
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);

    handle.init().unwrap();
    handle.wait_for(|s| !s.is_loading()).await.unwrap();
    handle.set_filter("weekend").unwrap();
    let snapshot = handle
        .wait_for(|s| !s.is_loading() && s.active_filter == "weekend")
        .await
        .unwrap();
    assert_eq!(ids(&snapshot), vec![2]);

    handle.load_more().unwrap();
    let loading = handle.wait_for(|s| s.loading_more).await.unwrap();
    assert_eq!(ids(&loading), vec![2], "list stays visible while loading more");

    let done = handle.wait_for(|s| !s.loading_more).await.unwrap();
    assert_eq!(ids(&done), vec![2, 3]);
    assert_eq!(done.active_filter, "weekend");

    handle.set_filter("all").unwrap();
    let all = handle.wait_for(|s| s.active_filter == "all").await.unwrap();
    assert_eq!(ids(&all), vec![1, 2, 3, 4]);

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_slow_forecast_does_not_delay_events() {
    let controller = AppController::new(
        SlowForecast(Duration::from_secs(60)),
        SampleEventSource::from_events(events(&[(1, "today")]), 10, Duration::ZERO),
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);
    let started = tokio::time::Instant::now();

    handle.init().unwrap();
    let snapshot = handle
        .wait_for(|s| s.events_phase == Phase::Ready)
        .await
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(snapshot.weather_phase, Phase::Loading);
    assert_eq!(ids(&snapshot), vec![1]);

    // Commands run while the forecast is still in flight
    handle.join(1).unwrap();
    let snapshot = handle
        .wait_for(|s| s.events.first().is_some_and(|e| e.participant_count == 1))
        .await
        .unwrap();
    assert_eq!(snapshot.weather_phase, Phase::Loading);

    let snapshot = handle
        .wait_for(|s| s.weather_phase == Phase::Ready)
        .await
        .unwrap();
    assert!(started.elapsed() >= Duration::from_secs(60));
    assert!(snapshot.forecast.is_some());

    handle.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_weather_refresh_keeps_commands_responsive() {
    let controller = AppController::new(
        SlowForecast(Duration::from_secs(60)),
        SampleEventSource::from_events(events(&[(1, "today"), (2, "weekend")]), 10, Duration::ZERO),
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);

    handle.init().unwrap();
    handle.wait_for(|s| !s.is_loading()).await.unwrap();

    let started = tokio::time::Instant::now();
    handle.refresh_weather().unwrap();
    handle.set_filter("weekend").unwrap();
    handle.join(2).unwrap();
    let snapshot = handle
        .wait_for(|s| s.events.first().is_some_and(|e| e.participant_count == 1))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(60));
    assert_eq!(snapshot.weather_phase, Phase::Loading);
    assert!(snapshot.forecast.is_none());
    assert_eq!(snapshot.active_filter, "weekend");
    assert_eq!(ids(&snapshot), vec![2]);

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_failed_retries_do_not_stack_notices() {
    let controller = AppController::new(
        FixedForecast::new(Vec::new()),
        SampleEventSource::from_events(events(&[(1, "today")]), 10, Duration::ZERO),
        NormalizeOptions::default(),
    );
    let handle = spawn(controller, Duration::ZERO);

    handle.init().unwrap();
    let snapshot = handle.wait_for(|s| !s.is_loading()).await.unwrap();
    assert_eq!(snapshot.weather_phase, Phase::Error);

    for _ in 0..2 {
        let revision = handle.snapshot().revision;
        handle.refresh_weather().unwrap();
        handle
            .wait_for(|s| s.revision > revision && s.weather_phase == Phase::Error)
            .await
            .unwrap();
    }

    let snapshot = handle.snapshot();
    assert_eq!(snapshot.notices.len(), 1);
    assert_eq!(snapshot.notices[0].kind, NoticeKind::WeatherUnavailable);

    handle.shutdown().await.unwrap();
}
