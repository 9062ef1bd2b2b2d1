// src/bin/test_upstream.rs
use creator_dashboard::services::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    let client = UpstreamClient::from_env()?;

    let creators = client.cached_data().await?;
    println!("Creators: {}", creators.len());
    for creator in creators.iter().take(5) {
        println!(
            "  @{}: {} videos, {} views",
            creator.username,
            creator.video_count(),
            creator.view_count()
        );
    }

    let snapshots = client.snapshots().await?;
    println!("Global snapshots: {}", snapshots.len());

    let performers = client.creator_snapshots().await?;
    println!("Creator snapshot rows: {}", performers.len());
    Ok(())
}
