//! HTTP surface, per spec §6. Grounded on `api_routes.py`'s route handlers,
//! re-expressed as `axum` handlers over a shared `AppState`.

use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use kwmetrics_core::{now_unix, KeywordMetric};
use kwmetrics_coordinator::run_worker;
use kwmetrics_queue::KeywordResult;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

const MIN_KEYWORDS: usize = 1;
const MAX_KEYWORDS: usize = 200;
const DEFAULT_CHUNK_SIZE: u32 = 20;
const MIN_CHUNK_SIZE: u32 = 1;
const MAX_CHUNK_SIZE: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub keywords: Vec<String>,
    pub chunk_size: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeywordMetricResponse {
    pub keyword: String,
    #[serde(rename = "googleAdsAvgMonthlySearches")]
    pub google_ads_avg_monthly_searches: Option<i64>,
    #[serde(rename = "googleTrendsScore")]
    pub google_trends_score: Option<f64>,
}

impl From<KeywordMetric> for KeywordMetricResponse {
    fn from(m: KeywordMetric) -> Self {
        Self {
            keyword: m.keyword,
            google_ads_avg_monthly_searches: m.ads_volume,
            google_trends_score: m.trends_score,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

fn validation_error(detail: impl Into<String>) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorBody { detail: detail.into() }),
    )
}

fn validate_batch_request(req: &BatchRequest) -> Result<u32, (StatusCode, Json<ErrorBody>)> {
    if req.keywords.len() < MIN_KEYWORDS || req.keywords.len() > MAX_KEYWORDS {
        return Err(validation_error(format!(
            "keywords must contain between {MIN_KEYWORDS} and {MAX_KEYWORDS} entries"
        )));
    }
    let chunk_size = req.chunk_size.unwrap_or(DEFAULT_CHUNK_SIZE);
    if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
        return Err(validation_error(format!(
            "chunk_size must be between {MIN_CHUNK_SIZE} and {MAX_CHUNK_SIZE}"
        )));
    }
    Ok(chunk_size)
}

pub async fn batch_search_volume(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> impl IntoResponse {
    let chunk_size = match validate_batch_request(&req) {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    let timeout = Duration::from_secs_f64((90.0_f64).max(2.0 * req.keywords.len() as f64));

    match state
        .coordinator
        .process_batch(req.keywords, chunk_size as usize, timeout)
        .await
    {
        Ok(metrics) => {
            let body: Vec<KeywordMetricResponse> = metrics.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) if e.is_breaker_open() || matches!(e, kwmetrics_core::ServiceError::Timeout) => {
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(ErrorBody {
                    detail: "request timed out".into(),
                }),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody { detail: e.to_string() }),
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JobSubmitResponse {
    pub job_id: String,
    pub keywords_count: usize,
    pub estimated_time_seconds: u64,
    pub message: String,
}

pub async fn async_batch_search_volume(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> impl IntoResponse {
    if let Err(e) = validate_batch_request(&req) {
        return e.into_response();
    }

    let keywords: Vec<_> = req
        .keywords
        .iter()
        .filter_map(|k| kwmetrics_core::Keyword::new(k.clone()).ok())
        .collect();
    let count = keywords.len();
    state.queue.add_keywords(keywords).await;

    let job_id = format!("job_{}", now_unix() * 1000);
    let estimated_time_seconds = (count as u64) * 3;

    tokio::spawn(run_worker(
        state.queue.clone(),
        state.cache.clone(),
        state.ads.clone(),
        state.trends.clone(),
    ));

    (
        StatusCode::ACCEPTED,
        Json(JobSubmitResponse {
            job_id,
            keywords_count: count,
            estimated_time_seconds,
            message: "job accepted; poll /async/status for progress".into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub keywords: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: &'static str,
    pub status: &'static str,
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<KeywordMetricResponse>>,
}

pub async fn async_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    let status = state.queue.status().await;

    let overall = if status.pending == 0 && status.processing == 0 {
        "completed"
    } else if status.processing > 0 {
        "processing"
    } else {
        "pending"
    };

    let results = if let Some(raw) = query.keywords {
        let keywords: Vec<_> = raw
            .split(',')
            .filter_map(|k| kwmetrics_core::Keyword::new(k.trim().to_string()).ok())
            .collect();
        let raw_results = state.queue.results(&keywords).await;
        Some(build_results(&keywords, &raw_results))
    } else {
        None
    };

    Json(JobStatusResponse {
        job_id: "current",
        status: overall,
        pending: status.pending,
        processing: status.processing,
        completed: status.completed,
        failed: status.failed,
        results,
    })
}

fn build_results(
    keywords: &[kwmetrics_core::Keyword],
    raw: &HashMap<kwmetrics_core::Keyword, KeywordResult>,
) -> Vec<KeywordMetricResponse> {
    keywords
        .iter()
        .map(|keyword| {
            let (ads, trends) = match raw.get(keyword) {
                Some(KeywordResult::Completed(entry)) => (entry.ads, entry.trends),
                _ => (None, None),
            };
            KeywordMetricResponse {
                keyword: keyword.as_str().to_string(),
                google_ads_avg_monthly_searches: ads,
                google_trends_score: trends,
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: u64,
}

pub async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        timestamp: now_unix(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post};
    use axum::Router;
    use kwmetrics_ads::{AdsAdapter, AdsCredentials, MetricSlot, RequestParams, UpstreamClient, UpstreamError as AdsUpstreamError};
    use kwmetrics_cache::{Cache, FifoBackend};
    use kwmetrics_coordinator::BatchCoordinator;
    use kwmetrics_queue::JobQueue;
    use kwmetrics_trends::{TrendsAdapter, TrendsUpstream, UpstreamError as TrendsUpstreamError};
    use tower::ServiceExt;

    struct StubAds;
    impl UpstreamClient for StubAds {
        fn generate_historical_metrics(
            &self,
            keywords: &[kwmetrics_core::Keyword],
            _customer_id: &str,
            _request_params: &RequestParams,
        ) -> Result<Vec<MetricSlot>, AdsUpstreamError> {
            Ok(keywords.iter().map(|_| MetricSlot::Volume(10)).collect())
        }
    }

    struct StubTrends;
    #[async_trait::async_trait]
    impl TrendsUpstream for StubTrends {
        async fn fetch_score(&self, _keyword: &kwmetrics_core::Keyword) -> Result<f64, TrendsUpstreamError> {
            Ok(7.0)
        }
    }

    fn build_state(dir: &std::path::Path) -> AppState {
        let cache = build_cache(dir);
        let ads = std::sync::Arc::new(AdsAdapter::new(
            AdsCredentials {
                developer_token: Some("t".into()),
                client_id: Some("c".into()),
                client_secret: Some("s".into()),
                refresh_token: Some("r".into()),
                customer_id: Some("123".into()),
            },
            Box::new(StubAds),
        ));
        let trends = std::sync::Arc::new(TrendsAdapter::new(
            std::sync::Arc::new(StubTrends),
            dir.join("snap.json"),
        ));
        let queue = std::sync::Arc::new(JobQueue::default());
        let coordinator = std::sync::Arc::new(BatchCoordinator::new(
            cache.clone(),
            ads.clone(),
            trends.clone(),
        ));

        AppState {
            cache,
            ads,
            trends,
            queue,
            coordinator,
        }
    }

    fn build_cache(dir: &std::path::Path) -> std::sync::Arc<Cache> {
        std::sync::Arc::new(Cache::with_backend(
            Box::new(FifoBackend::open(dir.join("c.bin"), 1000)),
            86400,
        ))
    }

    fn app(dir: &std::path::Path) -> Router {
        Router::new()
            .route("/batch_search_volume", post(batch_search_volume))
            .route("/async/batch_search_volume", post(async_batch_search_volume))
            .route("/async/status", get(async_status))
            .route("/healthz", get(healthz))
            .with_state(build_state(dir))
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn batch_search_volume_rejects_empty_keyword_list() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({ "keywords": [] });
        let response = app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/batch_search_volume")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn batch_search_volume_rejects_out_of_range_chunk_size() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({ "keywords": ["rust"], "chunk_size": 0 });
        let response = app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/batch_search_volume")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn batch_search_volume_happy_path_returns_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({ "keywords": ["rust", "async"] });
        let response = app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/batch_search_volume")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: Vec<KeywordMetricResponse> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].google_ads_avg_monthly_searches, Some(10));
        assert_eq!(parsed[0].google_trends_score, Some(7.0));
    }

    #[tokio::test]
    async fn async_status_starts_idle_with_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::builder().uri("/async/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["status"], "completed");
        assert_eq!(parsed["pending"], 0);
    }

    #[tokio::test]
    async fn async_batch_search_volume_accepts_and_enqueues() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({ "keywords": ["rust"] });
        let response = app(dir.path())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/async/batch_search_volume")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: JobSubmitResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.keywords_count, 1);
        assert!(parsed.job_id.starts_with("job_"));
    }
}
