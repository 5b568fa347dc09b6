use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::analyzer::{AnalysisRequest, ReviewAnalyzer};
use crate::db::{ProductStore, ReviewMatch, StoredAnalysis, StoredProduct};
use crate::error::StoreError;
use crate::fetch::PageFetcher;
use crate::model::{Review, ReviewOrigin, Sentiment, SentimentSummary};

const DEFAULT_QUERY_LIMIT: i64 = 100;

pub struct AppState {
    pub analyzer: Arc<ReviewAnalyzer>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub store: Option<ProductStore>,
    pub max_reviews: usize,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub max_reviews: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub product_name: String,
    pub summary: SentimentSummary,
    pub reviews: Vec<Review>,
    /// Absent when the analysis was read back from storage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<ReviewOrigin>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseStatus {
    pub connection_configured: bool,
    pub database_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_stored: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<StoredProduct>,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SentimentReviews {
    pub sentiment: Sentiment,
    pub reviews: Vec<ReviewMatch>,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResults {
    pub search_term: String,
    pub reviews: Vec<ReviewMatch>,
    pub count: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitParams {
    /// Maximum number of reviews returned (default 100)
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Text to look for, case-insensitive
    pub q: Option<String>,
    pub limit: Option<i64>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

fn store_error(context: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { .. } => api_error(StatusCode::NOT_FOUND, "Product not found"),
        StoreError::Database(e) => {
            error!("{}: {}", context, e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{}: {}", context, e))
        }
    }
}

fn require_store(state: &AppState) -> Result<&ProductStore, ApiError> {
    state.store.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database not connected. Set DATABASE_URL to use this endpoint.",
        )
    })
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, 1000)
}

pub async fn home() -> &'static str {
    "Product Sentiment Analyzer Backend Running"
}

#[utoipa::path(
    get,
    path = "/database-status",
    responses((status = 200, description = "Persistence status", body = DatabaseStatus)),
    tag = "status"
)]
pub async fn database_status(State(state): State<Arc<AppState>>) -> Json<DatabaseStatus> {
    let Some(store) = &state.store else {
        return Json(DatabaseStatus {
            connection_configured: false,
            database_connected: false,
            products_stored: None,
        });
    };

    let connected = store.ping().await;
    let products_stored = if connected {
        store.count_products().await.ok()
    } else {
        None
    };
    Json(DatabaseStatus {
        connection_configured: true,
        database_connected: connected,
        products_stored,
    })
}

#[utoipa::path(
    post,
    path = "/analyze-product",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis result", body = AnalyzeResponse),
        (status = 400, description = "Missing URL", body = ErrorResponse),
        (status = 500, description = "Storage failed", body = ErrorResponse)
    ),
    tag = "analysis"
)]
pub async fn analyze_product(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let url = req
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Product review URL is required"))?
        .to_string();

    if let Some(store) = &state.store {
        let existing = store
            .find_by_url(&url)
            .await
            .map_err(|e| store_error("Failed to look up product", e))?;
        if let Some(StoredAnalysis { product, reviews }) = existing {
            info!("Returning stored analysis for {}", url);
            return Ok(Json(AnalyzeResponse {
                message: "Product already analyzed".to_string(),
                product_id: Some(product.id),
                product_name: product.product_name,
                summary: product.sentiment_summary,
                reviews,
                origin: None,
            }));
        }
    }

    let request = AnalysisRequest::new(url.clone())
        .with_name_hint(req.product_name)
        .with_max_reviews(req.max_reviews.unwrap_or(state.max_reviews));

    // fetching drives a browser synchronously
    let worker = state.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        let page = worker.fetcher.fetch(&request.url);
        worker.analyzer.analyze(page, &request, &mut rand::thread_rng())
    })
    .await
    .map_err(|e| {
        error!("Analysis task failed: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Analysis task failed")
    })?;

    let (message, product_id) = match &state.store {
        Some(store) => {
            let id = store
                .insert_analysis(&url, &analysis)
                .await
                .map_err(|e| store_error("Failed to store data", e))?;
            ("Product analyzed and stored successfully", Some(id))
        }
        None => (
            "Product analyzed successfully (not stored - database not configured)",
            None,
        ),
    };

    Ok(Json(AnalyzeResponse {
        message: message.to_string(),
        product_id,
        product_name: analysis.product_name,
        summary: analysis.summary,
        reviews: analysis.reviews,
        origin: Some(analysis.origin),
    }))
}

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "Stored products", body = ProductList),
        (status = 503, description = "No database", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProductList>, ApiError> {
    let products = require_store(&state)?
        .list_products()
        .await
        .map_err(|e| store_error("Failed to retrieve products", e))?;
    let total = products.len();
    Ok(Json(ProductList { products, total }))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with reviews", body = StoredAnalysis),
        (status = 404, description = "Unknown id", body = ErrorResponse),
        (status = 503, description = "No database", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoredAnalysis>, ApiError> {
    let product = require_store(&state)?
        .get_product(&id)
        .await
        .map_err(|e| store_error("Failed to retrieve product", e))?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse),
        (status = 503, description = "No database", body = ErrorResponse)
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_store(&state)?
        .delete_product(&id)
        .await
        .map_err(|e| store_error("Failed to delete product", e))?;
    Ok(Json(MessageResponse {
        message: "Product deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/reviews/sentiment/{sentiment}",
    params(("sentiment" = String, Path, description = "Positive, Negative or Neutral"), LimitParams),
    responses(
        (status = 200, description = "Reviews with the label", body = SentimentReviews),
        (status = 400, description = "Unknown label", body = ErrorResponse),
        (status = 503, description = "No database", body = ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn reviews_by_sentiment(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    Query(params): Query<LimitParams>,
) -> Result<Json<SentimentReviews>, ApiError> {
    let store = require_store(&state)?;
    let sentiment: Sentiment = label.parse().map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Invalid sentiment. Must be Positive, Negative, or Neutral",
        )
    })?;

    let reviews = store
        .reviews_by_sentiment(sentiment, clamp_limit(params.limit))
        .await
        .map_err(|e| store_error("Failed to retrieve reviews", e))?;
    let count = reviews.len();
    Ok(Json(SentimentReviews { sentiment, reviews, count }))
}

#[utoipa::path(
    get,
    path = "/reviews/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching reviews", body = SearchResults),
        (status = 400, description = "Missing query", body = ErrorResponse),
        (status = 503, description = "No database", body = ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn search_reviews(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let store = require_store(&state)?;
    let term = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, "Search query parameter 'q' is required")
        })?
        .to_string();

    let reviews = store
        .search_reviews(&term, clamp_limit(params.limit))
        .await
        .map_err(|e| store_error("Failed to search reviews", e))?;
    let count = reviews.len();
    Ok(Json(SearchResults {
        search_term: term,
        reviews,
        count,
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/database-status", get(database_status))
        .route("/analyze-product", post(analyze_product))
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product).delete(delete_product))
        .route("/reviews/sentiment/:sentiment", get(reviews_by_sentiment))
        .route("/reviews/search", get(search_reviews))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
