//! PostgreSQL persistence for finished analyses, keyed by product URL.

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{postgres::PgPool, types::Json, FromRow};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{ProductAnalysis, Review, Sentiment, SentimentSummary};

pub async fn init_db(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id VARCHAR PRIMARY KEY,
            product_name TEXT NOT NULL,
            product_url TEXT NOT NULL UNIQUE,
            sentiment_summary JSONB NOT NULL,
            total_reviews INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id BIGSERIAL PRIMARY KEY,
            product_id VARCHAR NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            position INTEGER NOT NULL,
            text TEXT NOT NULL,
            sentiment VARCHAR(16) NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // lookups by label back the /reviews/sentiment route
    sqlx::query("CREATE INDEX IF NOT EXISTS reviews_sentiment_idx ON reviews (sentiment);")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS reviews_product_idx ON reviews (product_id, position);")
        .execute(pool)
        .await?;

    info!("Database schema ready");
    Ok(())
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    product_name: String,
    product_url: String,
    sentiment_summary: Json<SentimentSummary>,
    total_reviews: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(Debug, FromRow)]
struct ReviewRow {
    text: String,
    sentiment: String,
}

#[derive(Debug, FromRow)]
struct ReviewMatchRow {
    product_id: String,
    product_name: String,
    product_url: String,
    text: String,
    sentiment: String,
}

/// A stored product without its reviews.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredProduct {
    pub id: String,
    pub product_name: String,
    pub product_url: String,
    pub sentiment_summary: SentimentSummary,
    pub total_reviews: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ProductRow> for StoredProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            product_name: row.product_name,
            product_url: row.product_url,
            sentiment_summary: row.sentiment_summary.0,
            total_reviews: row.total_reviews,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A stored product with its reviews in extraction order.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoredAnalysis {
    pub product: StoredProduct,
    pub reviews: Vec<Review>,
}

/// A review found by label or text search, with the product it belongs to.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReviewMatch {
    pub product_id: String,
    pub product_name: String,
    pub product_url: String,
    pub text: String,
    pub sentiment: Sentiment,
}

fn review_from_row(row: ReviewRow) -> Option<Review> {
    match row.sentiment.parse::<Sentiment>() {
        Ok(sentiment) => Some(Review::new(row.text, sentiment)),
        Err(e) => {
            warn!("Ignoring stored review: {}", e);
            None
        }
    }
}

fn match_from_row(row: ReviewMatchRow) -> Option<ReviewMatch> {
    let sentiment = row.sentiment.parse::<Sentiment>().ok()?;
    Some(ReviewMatch {
        product_id: row.product_id,
        product_name: row.product_name,
        product_url: row.product_url,
        text: row.text,
        sentiment,
    })
}

/// Escape LIKE wildcards so user input only matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

const PRODUCT_COLUMNS: &str =
    "id, product_name, product_url, sentiment_summary, total_reviews, created_at, updated_at";

const MATCH_QUERY: &str = r#"
    SELECT r.product_id, p.product_name, p.product_url, r.text, r.sentiment
    FROM reviews r JOIN products p ON p.id = r.product_id"#;

#[derive(Clone)]
pub struct ProductStore {
    pool: PgPool,
}

impl ProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn count_products(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<StoredAnalysis>, StoreError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE product_url = $1",
            PRODUCT_COLUMNS
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.with_reviews(row.into()).await?)),
            None => Ok(None),
        }
    }

    /// Store the product and its reviews in one transaction and return the product id.
    ///
    /// If the URL was stored concurrently, the existing id is returned and nothing is written.
    pub async fn insert_analysis(
        &self,
        url: &str,
        analysis: &ProductAnalysis,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"INSERT INTO products (id, product_name, product_url, sentiment_summary, total_reviews)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT (product_url) DO NOTHING"#,
        )
        .bind(&id)
        .bind(&analysis.product_name)
        .bind(url)
        .bind(Json(analysis.summary))
        .bind(analysis.reviews.len() as i32)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            tx.rollback().await?;
            let existing: String = sqlx::query_scalar("SELECT id FROM products WHERE product_url = $1")
                .bind(url)
                .fetch_one(&self.pool)
                .await?;
            debug!("{} already stored as {}", url, existing);
            return Ok(existing);
        }

        for (position, review) in analysis.reviews.iter().enumerate() {
            sqlx::query(
                "INSERT INTO reviews (product_id, position, text, sentiment) VALUES ($1, $2, $3, $4)",
            )
            .bind(&id)
            .bind(position as i32)
            .bind(review.text())
            .bind(review.sentiment().as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Stored {} reviews for {} as {}", analysis.reviews.len(), url, id);
        Ok(id)
    }

    pub async fn list_products(&self) -> Result<Vec<StoredProduct>, StoreError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoredProduct::from).collect())
    }

    pub async fn get_product(&self, id: &str) -> Result<StoredAnalysis, StoreError> {
        let row: ProductRow = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound { id: id.to_string() })?;

        self.with_reviews(row.into()).await
    }

    /// Reviews go with the product through the cascading foreign key.
    pub async fn delete_product(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id: id.to_string() });
        }
        info!("Deleted product {}", id);
        Ok(())
    }

    pub async fn reviews_by_sentiment(
        &self,
        sentiment: Sentiment,
        limit: i64,
    ) -> Result<Vec<ReviewMatch>, StoreError> {
        let rows: Vec<ReviewMatchRow> = sqlx::query_as(&format!(
            "{} WHERE r.sentiment = $1 ORDER BY p.created_at DESC, r.position LIMIT $2",
            MATCH_QUERY
        ))
        .bind(sentiment.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(match_from_row).collect())
    }

    /// Case-insensitive substring search over review text.
    pub async fn search_reviews(&self, term: &str, limit: i64) -> Result<Vec<ReviewMatch>, StoreError> {
        let rows: Vec<ReviewMatchRow> = sqlx::query_as(&format!(
            r"{} WHERE r.text ILIKE $1 ESCAPE '\' ORDER BY p.created_at DESC, r.position LIMIT $2",
            MATCH_QUERY
        ))
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(match_from_row).collect())
    }

    async fn with_reviews(&self, product: StoredProduct) -> Result<StoredAnalysis, StoreError> {
        let rows: Vec<ReviewRow> = sqlx::query_as(
            "SELECT text, sentiment FROM reviews WHERE product_id = $1 ORDER BY position",
        )
        .bind(&product.id)
        .fetch_all(&self.pool)
        .await?;

        let reviews = rows.into_iter().filter_map(review_from_row).collect();
        Ok(StoredAnalysis { product, reviews })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("battery"), "%battery%");
        assert_eq!(like_pattern("100%_off"), r"%100\%\_off%");
        assert_eq!(like_pattern(r"a\b"), r"%a\\b%");
    }

    #[test]
    fn test_unknown_stored_label_is_dropped() {
        let good = ReviewRow {
            text: "Works as described".into(),
            sentiment: "Positive".into(),
        };
        let bad = ReviewRow {
            text: "Legacy row".into(),
            sentiment: "positive".into(),
        };
        let review = review_from_row(good).unwrap();
        assert_eq!(review.text(), "Works as described");
        assert_eq!(review.sentiment(), Sentiment::Positive);
        assert!(review_from_row(bad).is_none());
    }
}
