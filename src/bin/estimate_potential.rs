use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use solar_potential_service::cache::InMemorySolarCache;
use solar_potential_service::calculator::calculate_solar_potential;
use solar_potential_service::fetcher::{PowerClient, DEFAULT_POWER_URL};
use solar_potential_service::services::SolarService;

#[derive(Parser)]
#[command(name = "estimate-potential")]
#[command(about = "Estimate rooftop solar potential for a location", long_about = None)]
struct Cli {
    /// Latitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Longitude in decimal degrees
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Usable roof area in square metres
    #[arg(long)]
    roof_area: f64,

    /// Panel efficiency in percent (15-22)
    #[arg(long, default_value_t = 18.0)]
    efficiency: f64,

    /// Electricity price per kWh
    #[arg(long)]
    rate: f64,

    /// Irradiance provider endpoint
    #[arg(long, env = "NASA_POWER_URL", default_value = DEFAULT_POWER_URL)]
    power_url: String,

    /// Provider request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let client = PowerClient::new(cli.power_url, Duration::from_secs(cli.timeout_secs), 0)?;
    let service = SolarService::new(client, Arc::new(InMemorySolarCache::default()));

    println!("Fetching irradiance for ({}, {})...\n", cli.lat, cli.lon);
    let data = service.fetch_solar_data(cli.lat, cli.lon).await?;

    if data.monthly_data.is_empty() {
        println!("No irradiance data available for this location in {}", data.year);
    } else {
        println!("Monthly irradiance for {} ({}):", data.year, data.unit);
        for month in &data.monthly_data {
            println!("  {:<10} {:>6.2}", month.month, month.irradiance);
        }
    }
    println!(
        "\nAverage daily irradiance: {:.2} {}",
        data.average_daily_irradiance, data.unit
    );

    let potential = calculate_solar_potential(
        cli.roof_area,
        cli.efficiency,
        cli.rate,
        data.average_daily_irradiance,
    )?;

    println!("\nEstimated annual energy: {} kWh", potential.annual_energy);
    println!("Estimated annual savings: {}", potential.annual_savings);
    println!("Estimated CO2 avoided: {} kg", potential.co2_saved);

    Ok(())
}
