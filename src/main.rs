use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use review_sentiment::api::{self, AppState};
use review_sentiment::config::ServiceConfig;
use review_sentiment::db::{self, ProductStore};
use review_sentiment::extractor::Extractor;
use review_sentiment::fetch::fetcher_from_config;
use review_sentiment::{ReviewAnalyzer, SentimentClassifier, SyntheticReviewGenerator};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::database_status,
        api::analyze_product,
        api::list_products,
        api::get_product,
        api::delete_product,
        api::reviews_by_sentiment,
        api::search_reviews
    ),
    components(
        schemas(
            api::AnalyzeRequest,
            api::AnalyzeResponse,
            api::ErrorResponse,
            api::MessageResponse,
            api::DatabaseStatus,
            api::ProductList,
            api::SentimentReviews,
            api::SearchResults,
            db::StoredProduct,
            db::StoredAnalysis,
            db::ReviewMatch,
            review_sentiment::model::Review,
            review_sentiment::model::Sentiment,
            review_sentiment::model::SentimentSummary,
            review_sentiment::model::ReviewOrigin
        )
    ),
    tags(
        (name = "analysis", description = "Product review analysis"),
        (name = "products", description = "Stored analyses"),
        (name = "reviews", description = "Stored review queries"),
        (name = "status", description = "Service status")
    )
)]
struct ApiDoc;

async fn connect_store(database_url: Option<&str>) -> Option<ProductStore> {
    let url = database_url?;
    let pool = match PgPoolOptions::new().max_connections(5).connect(url).await {
        Ok(pool) => pool,
        Err(e) => {
            warn!("Database unavailable, running without persistence: {}", e);
            return None;
        }
    };
    if let Err(e) = db::init_db(&pool).await {
        warn!("Schema setup failed, running without persistence: {}", e);
        return None;
    }
    Some(ProductStore::new(pool))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env();
    let store = connect_store(config.database_url.as_deref()).await;
    if store.is_none() {
        info!("DATABASE_URL not usable; analyses will not be stored");
    }

    let analyzer = ReviewAnalyzer::new(
        Extractor::default().max_reviews(config.max_reviews),
        SentimentClassifier::default(),
        SyntheticReviewGenerator::default(),
    );

    let state = Arc::new(AppState {
        analyzer: Arc::new(analyzer),
        fetcher: Arc::from(fetcher_from_config(&config)),
        store,
        max_reviews: config.max_reviews,
    });

    let app = api::router(state, &config.cors_origins)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {} ({:?} fetcher)", listener.local_addr()?, config.fetch_mode);
    axum::serve(listener, app).await?;

    Ok(())
}
