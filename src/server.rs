use crate::config::Config;
use crate::error::Result;
use crate::metrics;
use crate::normalizer::normalize_records;
use crate::selector::Selector;
use crate::storage::{start_date, ReportStore};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, warn};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReportStore>,
    pub config: Arc<Config>,
    pub selector: Selector,
}

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    pub page: Option<String>,
    pub days: Option<String>,
}

/// The full read path: route the page to its table, fetch the record window,
/// select the representative readings, normalize them for the caller.
pub async fn page_insights(
    store: &dyn ReportStore,
    config: &Config,
    selector: &Selector,
    page: &str,
    lookback_days: Option<u32>,
    now: DateTime<Utc>,
) -> Result<Vec<Value>> {
    let table = config.tables.table_for_page(page);
    let start = start_date(lookback_days, now);
    debug!(page, table, start = %start, "fetching report records");

    let records = store.fetch_since(table, start).await?;
    metrics::store::records_fetched(records.len());

    let selected = selector.select(&records, lookback_days, now);
    metrics::select::records_selected(selected.len());

    let normalized = normalize_records(&selected);
    metrics::normalize::records_processed(normalized.len());
    Ok(normalized)
}

/// Lookback is a decimal string in the query; anything unparseable is
/// treated as absent so a bad value degrades to the current snapshot.
fn parse_days(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u32>() {
        Ok(days) => Some(days),
        Err(_) => {
            warn!(days = raw, "ignoring unparseable days parameter");
            None
        }
    }
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "insights-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Insights endpoint handler
async fn insights(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Response {
    let Some(page) = query.page.as_deref().filter(|p| !p.is_empty()) else {
        error!("Page parameter is required.");
        metrics::api::request_error();
        return error_response(StatusCode::BAD_REQUEST, "Page parameter is required.");
    };
    let days = parse_days(query.days.as_deref());

    match page_insights(
        state.store.as_ref(),
        &state.config,
        &state.selector,
        page,
        days,
        Utc::now(),
    )
    .await
    {
        Ok(body) => {
            metrics::api::request_success();
            Json(Value::Array(body)).into_response()
        }
        Err(e) => {
            error!("Error retrieving report data: {}", e);
            metrics::api::request_error();
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Create the HTTP server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/insights", get(insights))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", port);

    println!("🚀 HTTP server running on http://{}", addr);
    println!("💚 Health check: http://{}/health", addr);
    println!("📊 Insights:     http://{}/insights?page=home&days=7", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_parameter_parses_decimal_strings_only() {
        assert_eq!(parse_days(Some("7")), Some(7));
        assert_eq!(parse_days(Some(" 2 ")), Some(2));
        assert_eq!(parse_days(Some("0")), Some(0));
        assert_eq!(parse_days(Some("abc")), None);
        assert_eq!(parse_days(Some("-3")), None);
        assert_eq!(parse_days(Some("")), None);
        assert_eq!(parse_days(None), None);
    }
}
