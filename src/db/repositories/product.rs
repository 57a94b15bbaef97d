//! Saved product repository
//!
//! Every query is scoped by `user_id`; a product owned by someone else
//! behaves exactly like a missing one. List-valued fields are stored as JSON
//! text and a column that fails to decode reads back as an empty list.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql, sqlite};
use crate::db::DynDatabasePool;
use crate::models::SavedProduct;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

const PRODUCT_COLUMNS: &str = "id, user_id, title, product_type, niche, target_audience, tone, \
     requirements, ai_model, content, table_of_contents, monetization_suggestions, \
     marketing_channels, price_range, export_formats, created_at, updated_at";

/// Exact-match filters applied in SQL
#[derive(Debug, Clone, Default)]
pub struct ProductQuery<'a> {
    pub product_type: Option<&'a str>,
    pub niche: Option<&'a str>,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: &SavedProduct) -> Result<()>;

    async fn get(&self, user_id: i64, id: &str) -> Result<Option<SavedProduct>>;

    /// Newest first
    async fn list(&self, user_id: i64, query: ProductQuery<'_>) -> Result<Vec<SavedProduct>>;

    /// Overwrite a stored product; `false` when it does not exist for this owner
    async fn update(&self, product: &SavedProduct) -> Result<bool>;

    /// `false` when it does not exist for this owner
    async fn delete(&self, user_id: i64, id: &str) -> Result<bool>;
}

pub struct SqlxProductRepository {
    pool: DynDatabasePool,
}

impl SqlxProductRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ProductRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn create(&self, product: &SavedProduct) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_product_sqlite(sqlite(&self.pool)?, product).await,
            DatabaseDriver::Mysql => create_product_mysql(mysql(&self.pool)?, product).await,
        }
    }

    async fn get(&self, user_id: i64, id: &str) -> Result<Option<SavedProduct>> {
        let sql = format!(
            "SELECT {} FROM generated_products WHERE id = ? AND user_id = ?",
            PRODUCT_COLUMNS
        );
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(sqlite(&self.pool)?)
                    .await
                    .context("Failed to get product")?;
                Ok(row.map(|r| row_to_product_sqlite(&r)))
            }
            DatabaseDriver::Mysql => {
                let row = sqlx::query(&sql)
                    .bind(id)
                    .bind(user_id)
                    .fetch_optional(mysql(&self.pool)?)
                    .await
                    .context("Failed to get product")?;
                Ok(row.map(|r| row_to_product_mysql(&r)))
            }
        }
    }

    async fn list(&self, user_id: i64, query: ProductQuery<'_>) -> Result<Vec<SavedProduct>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_products_sqlite(sqlite(&self.pool)?, user_id, &query).await,
            DatabaseDriver::Mysql => list_products_mysql(mysql(&self.pool)?, user_id, &query).await,
        }
    }

    async fn update(&self, product: &SavedProduct) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_product_sqlite(sqlite(&self.pool)?, product).await,
            DatabaseDriver::Mysql => update_product_mysql(mysql(&self.pool)?, product).await,
        }
    }

    async fn delete(&self, user_id: i64, id: &str) -> Result<bool> {
        let sql = "DELETE FROM generated_products WHERE id = ? AND user_id = ?";
        let affected = match self.pool.driver() {
            DatabaseDriver::Sqlite => sqlx::query(sql)
                .bind(id)
                .bind(user_id)
                .execute(sqlite(&self.pool)?)
                .await
                .context("Failed to delete product")?
                .rows_affected(),
            DatabaseDriver::Mysql => sqlx::query(sql)
                .bind(id)
                .bind(user_id)
                .execute(mysql(&self.pool)?)
                .await
                .context("Failed to delete product")?
                .rows_affected(),
        };
        Ok(affected > 0)
    }
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn decode_list(raw: &str) -> Vec<String> {
    match serde_json::from_str(raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Discarding undecodable list column: {}", e);
            Vec::new()
        }
    }
}

/// WHERE clause and ordering shared by both drivers
fn list_sql(query: &ProductQuery<'_>) -> String {
    let mut sql = format!(
        "SELECT {} FROM generated_products WHERE user_id = ?",
        PRODUCT_COLUMNS
    );
    if query.product_type.is_some() {
        sql.push_str(" AND product_type = ?");
    }
    if query.niche.is_some() {
        sql.push_str(" AND niche = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");
    if query.limit.is_some() {
        sql.push_str(" LIMIT ?");
    }
    sql
}

const UPDATE_SQL: &str = r#"
    UPDATE generated_products
    SET title = ?, product_type = ?, niche = ?, target_audience = ?, tone = ?,
        requirements = ?, ai_model = ?, content = ?, table_of_contents = ?,
        monetization_suggestions = ?, marketing_channels = ?, price_range = ?,
        export_formats = ?, updated_at = ?
    WHERE id = ? AND user_id = ?
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO generated_products (
        id, user_id, title, product_type, niche, target_audience, tone,
        requirements, ai_model, content, table_of_contents,
        monetization_suggestions, marketing_channels, price_range,
        export_formats, created_at, updated_at
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_product_sqlite(pool: &SqlitePool, p: &SavedProduct) -> Result<()> {
    sqlx::query(INSERT_SQL)
        .bind(&p.id)
        .bind(p.user_id)
        .bind(&p.title)
        .bind(&p.product_type)
        .bind(&p.niche)
        .bind(&p.target_audience)
        .bind(&p.tone)
        .bind(&p.requirements)
        .bind(&p.ai_model)
        .bind(&p.content)
        .bind(encode_list(&p.table_of_contents))
        .bind(encode_list(&p.monetization_suggestions))
        .bind(encode_list(&p.marketing_channels))
        .bind(&p.price_range)
        .bind(encode_list(&p.export_formats))
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(pool)
        .await
        .context("Failed to save product")?;
    Ok(())
}

async fn list_products_sqlite(
    pool: &SqlitePool,
    user_id: i64,
    query: &ProductQuery<'_>,
) -> Result<Vec<SavedProduct>> {
    let sql = list_sql(query);
    let mut q = sqlx::query(&sql).bind(user_id);
    if let Some(product_type) = query.product_type {
        q = q.bind(product_type);
    }
    if let Some(niche) = query.niche {
        q = q.bind(niche);
    }
    if let Some(limit) = query.limit {
        q = q.bind(limit);
    }
    let rows = q.fetch_all(pool).await.context("Failed to list products")?;
    Ok(rows.iter().map(row_to_product_sqlite).collect())
}

async fn update_product_sqlite(pool: &SqlitePool, p: &SavedProduct) -> Result<bool> {
    let result = sqlx::query(UPDATE_SQL)
        .bind(&p.title)
        .bind(&p.product_type)
        .bind(&p.niche)
        .bind(&p.target_audience)
        .bind(&p.tone)
        .bind(&p.requirements)
        .bind(&p.ai_model)
        .bind(&p.content)
        .bind(encode_list(&p.table_of_contents))
        .bind(encode_list(&p.monetization_suggestions))
        .bind(encode_list(&p.marketing_channels))
        .bind(&p.price_range)
        .bind(encode_list(&p.export_formats))
        .bind(p.updated_at)
        .bind(&p.id)
        .bind(p.user_id)
        .execute(pool)
        .await
        .context("Failed to update product")?;
    Ok(result.rows_affected() > 0)
}

fn row_to_product_sqlite(row: &sqlx::sqlite::SqliteRow) -> SavedProduct {
    SavedProduct {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        product_type: row.get("product_type"),
        niche: row.get("niche"),
        target_audience: row.get("target_audience"),
        tone: row.get("tone"),
        requirements: row.get("requirements"),
        ai_model: row.get("ai_model"),
        content: row.get("content"),
        table_of_contents: decode_list(row.get("table_of_contents")),
        monetization_suggestions: decode_list(row.get("monetization_suggestions")),
        marketing_channels: decode_list(row.get("marketing_channels")),
        price_range: row.get("price_range"),
        export_formats: decode_list(row.get("export_formats")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_product_mysql(pool: &MySqlPool, p: &SavedProduct) -> Result<()> {
    sqlx::query(INSERT_SQL)
        .bind(&p.id)
        .bind(p.user_id)
        .bind(&p.title)
        .bind(&p.product_type)
        .bind(&p.niche)
        .bind(&p.target_audience)
        .bind(&p.tone)
        .bind(&p.requirements)
        .bind(&p.ai_model)
        .bind(&p.content)
        .bind(encode_list(&p.table_of_contents))
        .bind(encode_list(&p.monetization_suggestions))
        .bind(encode_list(&p.marketing_channels))
        .bind(&p.price_range)
        .bind(encode_list(&p.export_formats))
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(pool)
        .await
        .context("Failed to save product")?;
    Ok(())
}

async fn list_products_mysql(
    pool: &MySqlPool,
    user_id: i64,
    query: &ProductQuery<'_>,
) -> Result<Vec<SavedProduct>> {
    let sql = list_sql(query);
    let mut q = sqlx::query(&sql).bind(user_id);
    if let Some(product_type) = query.product_type {
        q = q.bind(product_type);
    }
    if let Some(niche) = query.niche {
        q = q.bind(niche);
    }
    if let Some(limit) = query.limit {
        q = q.bind(limit);
    }
    let rows = q.fetch_all(pool).await.context("Failed to list products")?;
    Ok(rows.iter().map(row_to_product_mysql).collect())
}

async fn update_product_mysql(pool: &MySqlPool, p: &SavedProduct) -> Result<bool> {
    let result = sqlx::query(UPDATE_SQL)
        .bind(&p.title)
        .bind(&p.product_type)
        .bind(&p.niche)
        .bind(&p.target_audience)
        .bind(&p.tone)
        .bind(&p.requirements)
        .bind(&p.ai_model)
        .bind(&p.content)
        .bind(encode_list(&p.table_of_contents))
        .bind(encode_list(&p.monetization_suggestions))
        .bind(encode_list(&p.marketing_channels))
        .bind(&p.price_range)
        .bind(encode_list(&p.export_formats))
        .bind(p.updated_at)
        .bind(&p.id)
        .bind(p.user_id)
        .execute(pool)
        .await
        .context("Failed to update product")?;
    // MySQL reports changed rows, so an identical rewrite counts as zero
    if result.rows_affected() > 0 {
        return Ok(true);
    }
    let exists = sqlx::query("SELECT 1 FROM generated_products WHERE id = ? AND user_id = ?")
        .bind(&p.id)
        .bind(p.user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to check product")?;
    Ok(exists.is_some())
}

fn row_to_product_mysql(row: &sqlx::mysql::MySqlRow) -> SavedProduct {
    SavedProduct {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        product_type: row.get("product_type"),
        niche: row.get("niche"),
        target_audience: row.get("target_audience"),
        tone: row.get("tone"),
        requirements: row.get("requirements"),
        ai_model: row.get("ai_model"),
        content: row.get("content"),
        table_of_contents: decode_list(row.get("table_of_contents")),
        monetization_suggestions: decode_list(row.get("monetization_suggestions")),
        marketing_channels: decode_list(row.get("marketing_channels")),
        price_range: row.get("price_range"),
        export_formats: decode_list(row.get("export_formats")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
