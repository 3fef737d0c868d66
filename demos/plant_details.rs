//! Fetch care details for a plant id.
//!
//! ```sh
//! PLANTBOOK_API_KEY=... cargo run --example plant_details -- "monstera deliciosa"
//! ```

use integrations_plantbook::{
    create_client, CancellationToken, DetailOptions, PlantbookConfig, TracingLogger,
};
use secrecy::SecretString;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("PLANTBOOK_API_KEY")?;
    let pid = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "monstera deliciosa".to_string());

    let config = PlantbookConfig::builder()
        .api_key(SecretString::new(api_key))
        .logger(Arc::new(TracingLogger::new()))
        .build()?;
    let client = create_client(config)?;
    let ctx = CancellationToken::new();

    let details = client
        .get_plant_details(&ctx, &pid, &DetailOptions::default())
        .await?;

    println!("{} ({})", details.display_pid, details.category);
    println!("  light:         {} - {} lux", details.min_light_lux, details.max_light_lux);
    println!("  temperature:   {} - {} C", details.min_temp, details.max_temp);
    println!("  humidity:      {} - {} %", details.min_env_humid, details.max_env_humid);
    println!("  soil moisture: {} - {} %", details.min_soil_moist, details.max_soil_moist);
    println!("  soil EC:       {} - {} uS/cm", details.min_soil_ec, details.max_soil_ec);
    println!("  image:         {}", details.image_url);

    Ok(())
}
