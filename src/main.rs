use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use place_scout::{config, PlaceScraper, ScrapeError, ScrapeRequest};

fn app() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/scrape", post(scrape))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let port = config::service_port();
    let addr = format!("0.0.0.0:{}", port);
    info!("🚀 place-scout listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app()).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// One extraction per request. A missing `url` is rejected up front: no
/// session is started and no browser is launched. Otherwise the envelope's
/// `success` flag maps to 200/500.
async fn scrape(Json(req): Json<ScrapeRequest>) -> impl IntoResponse {
    let Some(url) = req.url.filter(|u| !u.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": ScrapeError::MissingUrl.to_string() })),
        )
            .into_response();
    };

    let envelope = PlaceScraper::new().scrape(&url).await;
    let status = if envelope.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post_scrape(body: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/scrape")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    // The rejection happens before a scraper (and thus a browser) is ever
    // constructed; a request with no url must come back instantly as a
    // structured 400 with no `data` field.
    #[tokio::test]
    async fn missing_url_is_rejected_before_any_session() {
        let (status, body) = post_scrape("{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], ScrapeError::MissingUrl.to_string());
        assert!(body.get("data").is_none());
        // Ad-hoc rejection body, not an envelope: no success/url/timestamp.
        assert!(body.get("success").is_none());
    }

    #[tokio::test]
    async fn blank_url_is_rejected_like_missing() {
        let (status, body) = post_scrape(r#"{"url": "   "}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn health_endpoint_responds() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
