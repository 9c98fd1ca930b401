use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, sse::{Event, KeepAlive, Sse}},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{collections::HashMap, convert::Infallible, sync::Arc, time::Duration};
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};
use stratz_local_api::{
    AggregationPipeline, ConfigProvider, DeliveryChannel, FileConfigProvider, PipelineSettings,
    RuntimeMessage, ServiceConfig, StratzClient, StratzError, TabChannel, logging,
};

#[derive(Clone)]
struct AppState {
    pipeline: Arc<AggregationPipeline>,
    client: Arc<StratzClient>,
    config: Arc<FileConfigProvider>,
    tab: TabChannel,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let service = ServiceConfig::from_env();
    logging::init(&service.log_level);

    let config = Arc::new(service.config_provider()?);
    if let Some(bundled) = &service.bundled_config {
        if let Err(e) = config.install_if_missing(bundled).await {
            error!(error = %e, "error loading bundled config");
        }
    }

    let client = Arc::new(StratzClient::new(Duration::from_secs(service.http_timeout_secs))?);
    // no receiver until a content script attaches
    let (tab, _) = TabChannel::new();

    let pipeline = Arc::new(AggregationPipeline::new(
        config.clone(),
        client.clone(),
        Arc::new(tab.clone()),
        PipelineSettings::from(&service),
    ));

    let state = AppState { pipeline, client, config, tab };

    let app = Router::new()
        .route("/status", get(status_handler))
        .route("/runtime/message", post(message_handler))
        .route("/tab/events", get(tab_events_handler))
        .route("/heroes", get(heroes_handler))
        .with_state(state)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&service.bind_addr).await?;
    info!("Server running on http://{}", service.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn error_response(e: StratzError) -> axum::response::Response {
    let status = match &e {
        StratzError::ConfigMissing { .. } | StratzError::InvalidConfig(_) => StatusCode::SERVICE_UNAVAILABLE,
        StratzError::InvalidPlayerId(_) | StratzError::UnknownAction(_) => StatusCode::BAD_REQUEST,
        StratzError::ApiError { .. } | StratzError::Http(_) | StratzError::GraphQl(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({ "error": e.to_string() }))).into_response()
}

/// Runs one cycle and applies the no-retry policy: every failure is logged
/// and the page simply keeps its current display.
async fn run_cycle(pipeline: Arc<AggregationPipeline>, player_id: u64) {
    match pipeline.run(player_id).await {
        Ok(_) => {}
        Err(StratzError::Superseded(request_id)) => {
            debug!(request_id, player_id, "dropping stale stats request");
        }
        Err(StratzError::DeliveryUnreachable) => {
            info!(player_id, "content script not ready, skipping message send");
        }
        Err(e @ (StratzError::ConfigMissing { .. } | StratzError::InvalidConfig(_))) => {
            error!(error = %e, "config not loaded properly");
        }
        Err(e) => {
            warn!(player_id, error = %e, "stats request failed");
        }
    }
}

async fn message_handler(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    match RuntimeMessage::from_json(&body) {
        Ok(RuntimeMessage::FetchDotaStats { player_id }) => {
            tokio::spawn(run_cycle(state.pipeline.clone(), player_id));
            (StatusCode::ACCEPTED, Json(json!({ "accepted": true, "playerId": player_id }))).into_response()
        }
        Ok(RuntimeMessage::Ping) => (StatusCode::OK, Json(json!({ "pong": true }))).into_response(),
        Err(e) => error_response(e),
    }
}

async fn status_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let configured = state.config.load().await.is_ok();
    Json(json!({
        "configured": configured,
        "configPath": state.config.path().display().to_string(),
        "latestRequest": state.pipeline.latest_request_id(),
        "contentScriptReady": state.tab.ping().await,
        "activeUrl": state.tab.active_url().await,
    }))
}

async fn heroes_handler(State(state): State<AppState>) -> impl IntoResponse {
    let config = match state.config.load().await {
        Ok(config) => config,
        Err(e) => return error_response(e),
    };
    match state.client.hero_constants(&config).await {
        Ok(heroes) => (StatusCode::OK, Json(json!(heroes))).into_response(),
        Err(e) => error_response(e),
    }
}

async fn tab_events_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.tab.attach(params.get("url").cloned()).await;
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let message = result.ok()?;
        let data = serde_json::to_string(&message).ok()?;
        Some(Ok::<_, Infallible>(Event::default().data(data)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
