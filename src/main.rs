use anyhow::Result;
use clap::Parser;
use std::time::Duration;

use wayfare_core::{AppError, Config};
use wayfare_weather::{
    ChartSeries, CurrentView, CurrentWeather, WeatherClient, WeatherOrchestrator, WeatherReport,
};

#[derive(Debug, Parser)]
#[command(name = "wayfare", about = "Weather for your next trip")]
struct Cli {
    /// City to look up (defaults to weather.default_city)
    city: Option<String>,

    /// Latitude for a coordinate lookup (requires --lon)
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude for a coordinate lookup (requires --lat)
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    wayfare_core::init()?;
    let cli = Cli::parse();

    let (config, _warnings) = Config::load_validated().map_err(|e| {
        tracing::error!("{}", e.user_message());
        AppError::from(e)
    })?;
    let weather = &config.weather;

    let client = WeatherClient::with_timeout(
        &weather.api_base_url,
        &weather.effective_api_key().unwrap_or_default(),
        Duration::from_secs(weather.request_timeout_secs),
    )
    .map_err(|e| AppError::Service(e.to_string()))?;

    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        match client.fetch_by_coordinates(lat, lon).await {
            Ok(current) => print_current(&current),
            Err(e) => {
                tracing::error!("Coordinate lookup failed: {}", e);
                println!("N/A  {}", e.user_message());
            }
        }
        return Ok(());
    }

    let orchestrator = WeatherOrchestrator::new(
        client,
        weather.default_city.clone(),
        Duration::from_secs(weather.cache_ttl_secs),
        Duration::from_secs(weather.fetch_timeout_secs),
    );

    let city = cli.city.unwrap_or_else(|| weather.default_city.clone());
    let Some(report) = orchestrator.search_city(&city).await else {
        anyhow::bail!("City name cannot be empty");
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    tracing::info!("Wayfare weather lookup finished for {}", report.city);
    Ok(())
}

fn print_current(current: &CurrentWeather) {
    println!("{}, {}", current.city, current.country);
    println!("  {}°C  {}", current.temperature, current.description);
    println!("  Feels like: {}°C", current.feels_like);
    println!("  Humidity:   {}%", current.humidity);
    println!("  Wind speed: {} m/s", current.wind_speed);
    println!("  Pressure:   {} hPa", current.pressure);
    println!(
        "  Sunrise {}  Sunset {} (UTC)",
        current.sunrise.format("%H:%M"),
        current.sunset.format("%H:%M")
    );
}

fn print_report(report: &WeatherReport) {
    match &report.current {
        CurrentView::Available(current) => print_current(current),
        CurrentView::Unavailable(notice) => {
            println!("{}", report.city);
            println!("  {}  {}", notice.temperature, notice.condition);
        }
    }

    let chart = ChartSeries::from_forecast(&report.forecast);
    if chart.is_empty() {
        return;
    }

    println!("\n{}-day forecast:", chart.labels.len());
    for (i, label) in chart.labels.iter().enumerate() {
        println!(
            "  {:<7} {:>3}°C (feels {:>3}°C)  {:>3}%  {}",
            label,
            chart.temperature[i],
            chart.feels_like[i],
            chart.humidity[i],
            chart.descriptions[i]
        );
    }
}
