//! Content repository
//!
//! Read access to documents and content types for the listing, plus inserts
//! used for seeding.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ContentItem, ContentType, CreateContentItemInput, SortDirection, SortField};

/// Escape character used in LIKE patterns
const LIKE_ESCAPE: char = '!';

/// A filtered, sorted, paginated query over content items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentQuery {
    /// Content-type keys to include. Must not be empty.
    pub content_types: Vec<String>,
    /// Literal text the body must contain
    pub body_contains: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub offset: i64,
    pub limit: i64,
}

/// One page of content items plus the total across all pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentPage {
    pub items: Vec<ContentItem>,
    pub total: i64,
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Run a listing query
    async fn query(&self, query: &ContentQuery) -> Result<ContentPage>;

    async fn get_by_id(&self, id: i64) -> Result<Option<ContentItem>>;

    /// All registered content types in registry order
    async fn list_types(&self) -> Result<Vec<ContentType>>;

    async fn create(&self, input: &CreateContentItemInput) -> Result<ContentItem>;

    /// Register a content type, updating the label if it already exists
    async fn create_type(&self, content_type: &ContentType) -> Result<()>;
}

pub struct SqlxContentRepository {
    pool: DynDatabasePool,
}

impl SqlxContentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ContentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ContentRepository for SqlxContentRepository {
    async fn query(&self, query: &ContentQuery) -> Result<ContentPage> {
        if query.content_types.is_empty() {
            return Ok(ContentPage::default());
        }
        match self.pool.driver() {
            DatabaseDriver::Sqlite => query_sqlite(self.pool.sqlite()?, query).await,
            DatabaseDriver::Mysql => query_mysql(self.pool.mysql()?, query).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<ContentItem>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list_types(&self) -> Result<Vec<ContentType>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_types_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => list_types_mysql(self.pool.mysql()?).await,
        }
    }

    async fn create(&self, input: &CreateContentItemInput) -> Result<ContentItem> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, input).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, input).await,
        }
    }

    async fn create_type(&self, content_type: &ContentType) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_type_sqlite(self.pool.sqlite()?, content_type).await,
            DatabaseDriver::Mysql => create_type_mysql(self.pool.mysql()?, content_type).await,
        }
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch == '%' || ch == '_' || ch == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(ch);
    }
    escaped
}

/// WHERE clause shared by the page and count queries
fn where_clause(query: &ContentQuery) -> String {
    let placeholders = vec!["?"; query.content_types.len()].join(", ");
    let mut clause = format!("WHERE content_type IN ({})", placeholders);
    if query.body_contains.is_some() {
        clause.push_str(&format!(" AND body LIKE ? ESCAPE '{}'", LIKE_ESCAPE));
    }
    clause
}

fn select_sql(query: &ContentQuery) -> String {
    format!(
        "SELECT id, title, content_type, body, created_at FROM content_items {} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
        where_clause(query),
        query.sort_field.column(),
        query.sort_direction.as_sql()
    )
}

fn count_sql(query: &ContentQuery) -> String {
    format!(
        "SELECT COUNT(*) as count FROM content_items {}",
        where_clause(query)
    )
}

fn like_pattern(query: &ContentQuery) -> Option<String> {
    query
        .body_contains
        .as_deref()
        .map(|needle| format!("%{}%", escape_like(needle)))
}

// SQLite implementations
async fn query_sqlite(pool: &SqlitePool, query: &ContentQuery) -> Result<ContentPage> {
    let pattern = like_pattern(query);

    let select = select_sql(query);
    let mut rows = sqlx::query(&select);
    for key in &query.content_types {
        rows = rows.bind(key);
    }
    if let Some(pattern) = &pattern {
        rows = rows.bind(pattern);
    }
    let rows = rows
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(pool)
        .await
        .context("Failed to query content items")?;

    let count = count_sql(query);
    let mut total = sqlx::query(&count);
    for key in &query.content_types {
        total = total.bind(key);
    }
    if let Some(pattern) = &pattern {
        total = total.bind(pattern);
    }
    let total = total
        .fetch_one(pool)
        .await
        .context("Failed to count content items")?;

    Ok(ContentPage {
        items: rows.iter().map(row_to_item_sqlite).collect(),
        total: total.get("count"),
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<ContentItem>> {
    let row = sqlx::query(
        "SELECT id, title, content_type, body, created_at FROM content_items WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get content item")?;
    Ok(row.as_ref().map(row_to_item_sqlite))
}

async fn list_types_sqlite(pool: &SqlitePool) -> Result<Vec<ContentType>> {
    let rows = sqlx::query("SELECT name, label FROM content_types ORDER BY sort_order, name")
        .fetch_all(pool)
        .await
        .context("Failed to list content types")?;
    Ok(rows
        .iter()
        .map(|r| ContentType::new(r.get::<String, _>("name"), r.get::<String, _>("label")))
        .collect())
}

async fn create_sqlite(pool: &SqlitePool, input: &CreateContentItemInput) -> Result<ContentItem> {
    let created_at = input.created_at.unwrap_or_else(Utc::now);
    let result = sqlx::query(
        "INSERT INTO content_items (title, content_type, body, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.content_type)
    .bind(&input.body)
    .bind(created_at)
    .execute(pool)
    .await
    .context("Failed to create content item")?;

    Ok(ContentItem {
        id: result.last_insert_rowid(),
        title: input.title.clone(),
        content_type: input.content_type.clone(),
        body: input.body.clone(),
        created_at,
    })
}

async fn create_type_sqlite(pool: &SqlitePool, content_type: &ContentType) -> Result<()> {
    sqlx::query(
        "INSERT INTO content_types (name, label, sort_order)
         VALUES (?, ?, (SELECT COALESCE(MAX(sort_order), -1) + 1 FROM content_types))
         ON CONFLICT(name) DO UPDATE SET label = excluded.label",
    )
    .bind(&content_type.name)
    .bind(&content_type.label)
    .execute(pool)
    .await
    .context("Failed to create content type")?;
    Ok(())
}

fn row_to_item_sqlite(row: &sqlx::sqlite::SqliteRow) -> ContentItem {
    ContentItem {
        id: row.get("id"),
        title: row.get("title"),
        content_type: row.get("content_type"),
        body: row.get("body"),
        created_at: row.get("created_at"),
    }
}

// MySQL implementations
async fn query_mysql(pool: &MySqlPool, query: &ContentQuery) -> Result<ContentPage> {
    let pattern = like_pattern(query);

    let select = select_sql(query);
    let mut rows = sqlx::query(&select);
    for key in &query.content_types {
        rows = rows.bind(key);
    }
    if let Some(pattern) = &pattern {
        rows = rows.bind(pattern);
    }
    let rows = rows
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(pool)
        .await
        .context("Failed to query content items")?;

    let count = count_sql(query);
    let mut total = sqlx::query(&count);
    for key in &query.content_types {
        total = total.bind(key);
    }
    if let Some(pattern) = &pattern {
        total = total.bind(pattern);
    }
    let total = total
        .fetch_one(pool)
        .await
        .context("Failed to count content items")?;

    Ok(ContentPage {
        items: rows.iter().map(row_to_item_mysql).collect(),
        total: total.get("count"),
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<ContentItem>> {
    let row = sqlx::query(
        "SELECT id, title, content_type, body, created_at FROM content_items WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get content item")?;
    Ok(row.as_ref().map(row_to_item_mysql))
}

async fn list_types_mysql(pool: &MySqlPool) -> Result<Vec<ContentType>> {
    let rows = sqlx::query("SELECT name, label FROM content_types ORDER BY sort_order, name")
        .fetch_all(pool)
        .await
        .context("Failed to list content types")?;
    Ok(rows
        .iter()
        .map(|r| ContentType::new(r.get::<String, _>("name"), r.get::<String, _>("label")))
        .collect())
}

async fn create_mysql(pool: &MySqlPool, input: &CreateContentItemInput) -> Result<ContentItem> {
    let created_at = input.created_at.unwrap_or_else(Utc::now);
    let result = sqlx::query(
        "INSERT INTO content_items (title, content_type, body, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&input.title)
    .bind(&input.content_type)
    .bind(&input.body)
    .bind(created_at)
    .execute(pool)
    .await
    .context("Failed to create content item")?;

    Ok(ContentItem {
        id: result.last_insert_id() as i64,
        title: input.title.clone(),
        content_type: input.content_type.clone(),
        body: input.body.clone(),
        created_at,
    })
}

async fn create_type_mysql(pool: &MySqlPool, content_type: &ContentType) -> Result<()> {
    let next_order: i64 =
        sqlx::query("SELECT COALESCE(MAX(sort_order), -1) + 1 as next_order FROM content_types")
            .fetch_one(pool)
            .await
            .context("Failed to read content type order")?
            .get("next_order");

    sqlx::query(
        "INSERT INTO content_types (name, label, sort_order) VALUES (?, ?, ?)
         ON DUPLICATE KEY UPDATE label = VALUES(label)",
    )
    .bind(&content_type.name)
    .bind(&content_type.label)
    .bind(next_order)
    .execute(pool)
    .await
    .context("Failed to create content type")?;
    Ok(())
}

fn row_to_item_mysql(row: &sqlx::mysql::MySqlRow) -> ContentItem {
    ContentItem {
        id: row.get("id"),
        title: row.get("title"),
        content_type: row.get("content_type"),
        body: row.get("body"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use chrono::{Duration, TimeZone};

    async fn setup_test_repo() -> SqlxContentRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxContentRepository::new(pool)
    }

    fn base_query(types: &[&str]) -> ContentQuery {
        ContentQuery {
            content_types: types.iter().map(|t| t.to_string()).collect(),
            limit: 25,
            ..Default::default()
        }
    }

    async fn seed(repo: &SqlxContentRepository, title: &str, content_type: &str, body: &str, day: i64) {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day);
        repo.create(&CreateContentItemInput::new(title, content_type, body).at(at))
            .await
            .expect("Failed to create item");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("[gallery]"), "[gallery]");
        assert_eq!(escape_like("[wp_caption]"), "[wp!_caption]");
        assert_eq!(escape_like("100%!"), "100!%!!");
    }

    #[tokio::test]
    async fn test_create_and_get_by_id() {
        let repo = setup_test_repo().await;
        let item = repo
            .create(&CreateContentItemInput::new("Hello", "post", "[gallery]"))
            .await
            .unwrap();
        assert!(item.id > 0);

        let found = repo.get_by_id(item.id).await.unwrap().expect("item exists");
        assert_eq!(found.title, "Hello");
        assert_eq!(found.body, "[gallery]");
        assert!(repo.get_by_id(item.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_filters_by_type() {
        let repo = setup_test_repo().await;
        seed(&repo, "A", "post", "a", 0).await;
        seed(&repo, "B", "page", "b", 1).await;
        seed(&repo, "C", "attachment", "c", 2).await;

        let page = repo.query(&base_query(&["post", "page"])).await.unwrap();
        assert_eq!(page.total, 2);
        let titles: Vec<_> = page.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_query_empty_types_returns_nothing() {
        let repo = setup_test_repo().await;
        seed(&repo, "A", "post", "a", 0).await;

        let page = repo.query(&base_query(&[])).await.unwrap();
        assert_eq!(page, ContentPage::default());
    }

    #[tokio::test]
    async fn test_query_body_contains_is_literal() {
        let repo = setup_test_repo().await;
        seed(&repo, "Caption", "post", "x [wp_caption] y", 0).await;
        seed(&repo, "Lookalike", "post", "x [wpXcaption] y", 1).await;

        let mut query = base_query(&["post"]);
        query.body_contains = Some("[wp_caption]".to_string());
        let page = repo.query(&query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Caption");
    }

    #[tokio::test]
    async fn test_query_sort_and_pagination() {
        let repo = setup_test_repo().await;
        seed(&repo, "b", "post", "", 2).await;
        seed(&repo, "a", "post", "", 1).await;
        seed(&repo, "c", "post", "", 0).await;

        let mut query = base_query(&["post"]);
        query.sort_field = SortField::Title;
        query.sort_direction = SortDirection::Desc;
        query.limit = 2;
        let page = repo.query(&query).await.unwrap();
        assert_eq!(page.total, 3);
        let titles: Vec<_> = page.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b"]);

        query.offset = 2;
        let page = repo.query(&query).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "a");

        let mut by_date = base_query(&["post"]);
        by_date.sort_field = SortField::Date;
        let page = repo.query(&by_date).await.unwrap();
        let titles: Vec<_> = page.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_sort_ties_break_on_id() {
        let repo = setup_test_repo().await;
        seed(&repo, "same", "post", "1", 0).await;
        seed(&repo, "same", "post", "2", 0).await;

        let mut query = base_query(&["post"]);
        query.sort_field = SortField::Title;
        query.sort_direction = SortDirection::Desc;
        let page = repo.query(&query).await.unwrap();
        assert!(page.items[0].id < page.items[1].id);
    }

    #[tokio::test]
    async fn test_list_and_create_types() {
        let repo = setup_test_repo().await;
        repo.create_type(&ContentType::new("product", "Products"))
            .await
            .unwrap();
        repo.create_type(&ContentType::new("product", "Shop Products"))
            .await
            .unwrap();

        let types = repo.list_types().await.unwrap();
        assert_eq!(types.len(), 6);
        assert_eq!(types[0], ContentType::new("post", "Posts"));
        assert_eq!(types[5], ContentType::new("product", "Shop Products"));
    }
}
