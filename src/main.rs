use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use log::{error, info, warn};
use warp::Filter;

use creator_dashboard::handlers::AppContext;
use creator_dashboard::routes;
use creator_dashboard::services::store::DashboardStore;
use creator_dashboard::services::upstream::UpstreamClient;

fn campaign_keywords() -> Vec<String> {
    env::var("CAMPAIGN_KEYWORDS")
        .unwrap_or_default()
        .split(',')
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 3030");
        "3030".to_string()
    });
    let port: u16 = port_str.parse().expect("PORT must be a number");
    info!("Using PORT: {}", port);

    let upstream = match UpstreamClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            error!("Cannot build upstream client: {}", e);
            std::process::exit(1);
        }
    };

    let keywords = campaign_keywords();
    if !keywords.is_empty() {
        info!("Campaign keyword filter active: {:?}", keywords);
    }

    let ctx = Arc::new(AppContext {
        store: DashboardStore::new(),
        upstream,
        campaign_keywords: keywords,
    });

    // Best-effort warm-up from the upstream cache; the dashboard serves
    // empty views until data arrives.
    if let Err(e) = ctx.store.refresh(&ctx.upstream, false).await {
        warn!("Initial data load failed, starting with empty dataset: {}", e);
    }

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    let api = routes::routes(ctx).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
