use async_trait::async_trait;
use jiff::Timestamp;
use snip_core::repository::{ReadRepository, Repository, Result, UrlMapping};
use snip_core::{LongUrl, ShortCode, StorageError};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::info;

/// Schema for the `url_mappings` table. Safe to run repeatedly.
pub const SCHEMA: &str = include_str!("../ddl/mysql/url_mappings.sql");

/// MySQL implementation of the repository contract.
///
/// Short-code uniqueness is enforced by a UNIQUE index, so concurrent
/// inserts racing on the same code surface as [`StorageError::Conflict`].
/// Deletes are hard deletes.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `url_mappings` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        info!("url_mappings schema is ready");
        Ok(())
    }
}

fn parse_created_at(millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", millis))
    })
}

fn row_to_mapping(row: &MySqlRow) -> Result<UrlMapping> {
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let long_url: String = row.try_get("long_url").map_err(map_sqlx_error)?;
    let title: Option<String> = row.try_get("title").map_err(map_sqlx_error)?;
    let favicon: Option<String> = row.try_get("favicon").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    let long_url = LongUrl::parse(&long_url).map_err(|e| {
        StorageError::InvalidData(format!("stored url for '{}' is invalid: {e}", short_code))
    })?;

    Ok(UrlMapping {
        short_code: ShortCode::new_unchecked(short_code),
        long_url,
        title,
        favicon,
        created_at: parse_created_at(created_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        let row = sqlx::query(
            r#"
            SELECT short_code, long_url, title, favicon, created_at
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_mapping).transpose()
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM url_mappings
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        let rows = sqlx::query(
            r#"
            SELECT short_code, long_url, title, favicon, created_at
            FROM url_mappings
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(row_to_mapping).collect()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, mapping: UrlMapping) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (short_code, long_url, title, favicon, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(mapping.short_code.as_str())
        .bind(mapping.long_url.as_str())
        .bind(mapping.title.as_deref())
        .bind(mapping.favicon.as_deref())
        .bind(mapping.created_at.as_millisecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(mapping.short_code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update_long_url(
        &self,
        code: &ShortCode,
        long_url: &LongUrl,
    ) -> Result<Option<UrlMapping>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        // Lock the row so the returned mapping is the one we just wrote.
        let row = sqlx::query(
            r#"
            SELECT short_code, long_url, title, favicon, created_at
            FROM url_mappings
            WHERE short_code = ?
            FOR UPDATE
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(None);
        };
        let mut mapping = row_to_mapping(&row)?;

        sqlx::query(
            r#"
            UPDATE url_mappings
            SET long_url = ?
            WHERE short_code = ?
            "#,
        )
        .bind(long_url.as_str())
        .bind(code.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        mapping.long_url = long_url.clone();
        Ok(Some(mapping))
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM url_mappings
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
