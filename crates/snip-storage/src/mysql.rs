use async_trait::async_trait;
use jiff::Timestamp;
use sha2::{Digest, Sha256};
use snip_core::error::{Result, StorageError};
use snip_core::{
    InsertOutcome, LinkId, NewShortLink, ReadRepository, Repository, ShortCode, ShortLink,
};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tracing::{debug, trace};

const SCHEMA: &str = include_str!("../ddl/mysql/short_links.sql");

/// MySQL implementation of the repository contract.
///
/// Both uniqueness rules live in the schema: `short_code` has a unique key
/// with a binary collation (codes are case-sensitive), and the original URL
/// is unique through a SHA-256 digest column since `TEXT` cannot carry a
/// full-length unique index. Lookups by URL go through the digest and then
/// compare the stored text exactly.
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

    /// Creates the `short_links` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn url_digest(url: &str) -> Vec<u8> {
    Sha256::digest(url.as_bytes()).to_vec()
}

fn parse_timestamp(column: &str, seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{seconds}': {e}"))
    })
}

fn row_to_link(row: &MySqlRow) -> Result<ShortLink> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let short_code: String = row.try_get("short_code").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let updated_at: i64 = row.try_get("updated_at").map_err(map_sqlx_error)?;

    let short_code = ShortCode::new(&short_code)
        .map_err(|e| StorageError::InvalidData(format!("stored short code: {e}")))?;

    Ok(ShortLink {
        id: LinkId::new(id),
        original_url,
        short_code,
        created_at: parse_timestamp("created_at", created_at)?,
        updated_at: parse_timestamp("updated_at", updated_at)?,
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
    async fn find_by_original_url(&self, url: &str) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT id, original_url, short_code, created_at, updated_at
            FROM short_links
            WHERE original_url_digest = ?
            LIMIT 1
            "#,
        )
        .bind(url_digest(url))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let link = row_to_link(&row)?;
        // the column collation may fold case, the digest does not
        Ok((link.original_url == url).then_some(link))
    }

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT id, original_url, short_code, created_at, updated_at
            FROM short_links
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(row_to_link).transpose()
    }

    async fn exists_by_short_code(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM short_links
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
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, link: NewShortLink) -> Result<InsertOutcome> {
        let now = Timestamp::now();
        // stored at whole-second precision, so report what a re-read would return
        let now = parse_timestamp("created_at", now.as_second())?;

        let result = sqlx::query(
            r#"
            INSERT INTO short_links
                (original_url, original_url_digest, short_code, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(link.original_url.as_str())
        .bind(url_digest(&link.original_url))
        .bind(link.short_code.as_str())
        .bind(now.as_second())
        .bind(now.as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                trace!(code = %link.short_code, id = done.last_insert_id(), "inserted short link");
                Ok(InsertOutcome::Inserted(ShortLink {
                    id: LinkId::new(done.last_insert_id()),
                    original_url: link.original_url,
                    short_code: link.short_code,
                    created_at: now,
                    updated_at: now,
                }))
            }
            Err(err) if is_unique_violation(&err) => {
                // MySQL does not reliably say which key was hit; the url row decides
                match self.find_by_original_url(&link.original_url).await? {
                    Some(winner) => {
                        debug!(code = %winner.short_code, "original url inserted concurrently");
                        Ok(InsertOutcome::UrlTaken(winner))
                    }
                    None => {
                        debug!(code = %link.short_code, "short code already taken");
                        Ok(InsertOutcome::CodeCollision)
                    }
                }
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
