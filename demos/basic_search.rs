//! Search OpenPlantbook by common name.
//!
//! ```sh
//! PLANTBOOK_API_KEY=... cargo run --example basic_search -- monstera
//! ```

use integrations_plantbook::{
    create_client, CancellationToken, PlantbookConfig, SearchOptions, TracingLogger,
};
use secrecy::SecretString;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("PLANTBOOK_API_KEY")?;
    let query = std::env::args().nth(1).unwrap_or_else(|| "monstera".to_string());

    let config = PlantbookConfig::builder()
        .api_key(SecretString::new(api_key))
        .logger(Arc::new(TracingLogger::new()))
        .build()?;
    let client = create_client(config)?;
    let ctx = CancellationToken::new();

    let results = client
        .search_plants(
            &ctx,
            &query,
            &SearchOptions {
                limit: 10,
                user_plants: false,
            },
        )
        .await?;

    println!("{} result(s) for {query:?}:", results.len());
    for plant in results {
        println!("  {:<30} {:<30} [{}]", plant.pid, plant.alias, plant.category);
    }

    Ok(())
}
