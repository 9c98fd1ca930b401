use std::time::Duration;

use stratz_local_api::{models::record::AggregatedPlayerRecord, ConfigProvider, StratzClient};

/// Fetches one player directly and prints the record the overlay would show.
///
/// `cargo run --example player_stats -- <steam account id>`
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let player_id: u64 = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: player_stats <steam account id>"))?
        .parse()?;

    let config = stratz_local_api::FileConfigProvider::default_location()?.load().await?;
    let client = StratzClient::new(Duration::from_secs(30))?;

    let mut heroes = client.best_heroes(&config, player_id, 50_000, 169).await?;
    stratz_local_api::models::hero::sort_by_matches(&mut heroes);
    let profile = client.player_profile(&config, player_id).await?;

    let mut record = AggregatedPlayerRecord::from_profile(&profile);
    record.merge_best_heroes(&heroes);
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
