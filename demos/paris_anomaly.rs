// demos/paris_anomaly.rs
use climate_anomaly::{monthly_medians, AnomalyError, ClimateAnomaly, LatLon};

fn main() -> Result<(), AnomalyError> {
    // Set RUST_LOG=info (or debug) to see fetch and retry messages
    env_logger::init();

    let client = ClimateAnomaly::new()?;
    let paris = LatLon(48.8566, 2.3522);

    println!("Fetching daily temperatures for {}", paris);
    let report = client.for_location().location(paris).call()?;
    let anomaly = &report.anomaly;

    println!("Days in series: {}", report.series.len());
    println!(
        "Latest temperature ({}): {}°C",
        anomaly.latest_date, anomaly.latest_temperature
    );
    println!("Historical mean: {}°C", anomaly.mean_temperature);
    println!("Historical standard deviation: {}°C", anomaly.std_temperature);
    println!(
        "Historical range (min - max): {}°C - {}°C",
        anomaly.min_temperature, anomaly.max_temperature
    );
    println!(
        "Normal range (+/- 2 sigma): {}°C - {}°C",
        anomaly.lower_bound, anomaly.upper_bound
    );
    match anomaly.deviation_from_mean_percentage {
        Some(pct) => println!(
            "Deviation from mean: {}°C ({}% {} than {}°C)",
            anomaly.deviation_from_mean, pct, anomaly.deviation_direction, anomaly.mean_temperature
        ),
        None => println!(
            "Deviation from mean: {}°C ({} than {}°C)",
            anomaly.deviation_from_mean, anomaly.deviation_direction, anomaly.mean_temperature
        ),
    }
    println!(
        "Within normal range: {}",
        if anomaly.is_normal { "Yes" } else { "No" }
    );

    // Last year of monthly medians
    for median in monthly_medians(&report.series).iter().rev().take(12).rev() {
        println!("{}-{:02}: {:.1}°C", median.year, median.month, median.median);
    }

    Ok(())
}
