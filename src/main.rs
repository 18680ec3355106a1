use std::time::Duration;

use anyhow::{Context, Result};
use shoreline_app::{spawn, AppController, Phase, Snapshot};
use shoreline_events::SampleEventSource;
use shoreline_weather::{HttpForecastProvider, NormalizeOptions};

#[tokio::main]
async fn main() -> Result<()> {
    shoreline_core::init()?;

    let (config, _) = shoreline_core::Config::load_validated()?;
    tracing::info!("Config directory: {}", config.config_dir.display());

    let provider = HttpForecastProvider::new(&config.weather)
        .context("Failed to create forecast provider")?;
    let source = SampleEventSource::bundled(&config.events)?;
    let options = NormalizeOptions {
        regions: config.weather.region_priority(),
    };

    let controller = AppController::new(provider, source, options);
    let handle = spawn(
        controller,
        Duration::from_millis(config.events.join_latency_ms),
    );

    handle.init()?;
    let snapshot = handle.wait_for(|s| !s.is_loading()).await?;
    print_snapshot(&snapshot);

    let revision = snapshot.revision;
    handle.load_more()?;
    let snapshot = handle
        .wait_for(|s| s.revision > revision && !s.loading_more)
        .await?;
    println!("\nAfter loading more: {} cleanups listed", snapshot.events.len());

    handle.shutdown().await?;
    Ok(())
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("Shoreline - Beach Cleanup Planner\n");

    match (&snapshot.weather_phase, &snapshot.forecast) {
        (Phase::Ready, Some(forecast)) => {
            println!(
                "Weather: {} ({}), humidity {}",
                forecast.condition_text,
                forecast.temperature_label(),
                forecast.humidity_label()
            );
            println!("  {}", forecast.rain_summary);
            for period in &forecast.periods {
                println!("  {:<10} {}", period.label.description(), period.short_label);
            }
            if forecast.is_beach_friendly() {
                println!("  Great day for a cleanup!");
            }
        }
        _ => println!("Weather unavailable"),
    }

    println!();
    if let Some(featured) = &snapshot.featured {
        println!("Featured: {} - {}", featured.title, featured.location_label);
    }
    for event in &snapshot.events {
        println!(
            "  [{}] {} | {} | {}",
            event.category,
            event.title,
            event.date_label,
            event.participants_label()
        );
    }

    for notice in &snapshot.notices {
        println!("! {}", notice.message);
    }
}
