// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::{charts, creators, dashboard, AppContext, DashboardQuery};
use crate::models::ApiEnvelope;

/// Every failure path answers the same `{success: false, error}` envelope the
/// upstream API uses; nothing here is fatal for the client.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = api_error.message.clone();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiEnvelope::<()>::err(message)),
        code,
    ))
}

pub fn routes(ctx: Arc<AppContext>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let ctx_filter = warp::any().map(move || ctx.clone());
    let query = warp::query::<DashboardQuery>();

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(query)
        .and(ctx_filter.clone())
        .and_then(dashboard::get_dashboard);

    let refresh_route = warp::path!("api" / "v1" / "refresh")
        .and(warp::post())
        .and(ctx_filter.clone())
        .and_then(dashboard::post_refresh);

    let creators_route = warp::path!("api" / "v1" / "creators")
        .and(warp::get())
        .and(query)
        .and(ctx_filter.clone())
        .and_then(creators::get_creators);

    let top_videos_route = warp::path!("api" / "v1" / "top-videos")
        .and(warp::get())
        .and(query)
        .and(ctx_filter.clone())
        .and_then(creators::get_top_videos);

    let top_performers_route = warp::path!("api" / "v1" / "top-performers")
        .and(warp::get())
        .and(query)
        .and(ctx_filter.clone())
        .and_then(creators::get_top_performers);

    let daily_videos_route = warp::path!("api" / "v1" / "charts" / "daily-videos")
        .and(warp::get())
        .and(query)
        .and(ctx_filter.clone())
        .and_then(charts::get_daily_videos);

    let daily_spend_route = warp::path!("api" / "v1" / "charts" / "daily-spend")
        .and(warp::get())
        .and(query)
        .and(ctx_filter.clone())
        .and_then(charts::get_daily_spend);

    let growth_route = warp::path!("api" / "v1" / "charts" / "growth")
        .and(warp::get())
        .and(query)
        .and(ctx_filter)
        .and_then(charts::get_growth);

    info!("All routes configured successfully.");

    dashboard_route
        .or(refresh_route)
        .or(creators_route)
        .or(top_videos_route)
        .or(top_performers_route)
        .or(daily_videos_route)
        .or(daily_spend_route)
        .or(growth_route)
        .recover(handle_rejection)
}
