use anyhow::Result;
use econ_dashboard_lib::config::Settings;
use econ_dashboard_lib::core::format::year_label;
use econ_dashboard_lib::fetcher::econdata::EconDataClient;
use econ_dashboard_lib::telemetry;

/// Batch-fetch the given codes (or the configured defaults) and print coverage.
#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let settings = Settings::from_env()?;

    let mut codes: Vec<String> = std::env::args().skip(1).collect();
    if codes.is_empty() {
        codes = settings.default_series.clone();
    }

    let client = EconDataClient::new(&settings);
    println!("🔍 Diagnostic - Querying: {}", client.url());

    let results = client.fetch_many(&codes).await?;

    println!("\n{:<12} | {:<10} | {:<8} | {:<6} | {:<6} | {:<10}", "Code", "Frequency", "Points", "From", "To", "Malformed");
    println!("{}", "-".repeat(66));

    for (code, result) in results {
        match result {
            Ok(bundle) => {
                let from = bundle.level.first().map(|p| year_label(&p.timestamp)).unwrap_or_else(|| "-".to_string());
                let to = bundle.level.last().map(|p| year_label(&p.timestamp)).unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<12} | {:<10} | {:<8} | {:<6} | {:<6} | {:<10}",
                    code,
                    bundle.frequency,
                    bundle.observation_count(),
                    from,
                    to,
                    bundle.malformed_timestamps.len()
                );
            }
            Err(e) => println!("{:<12} | {}", code, e),
        }
    }
    println!("\nDone.");
    Ok(())
}
