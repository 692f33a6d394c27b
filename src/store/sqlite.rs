use super::LinkStore;
use crate::{error::StoreError, models::Link};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

/// Link store over a SQLite pool. The `short_code` primary key is the
/// conditional-insert guard.
#[derive(Clone, Debug)]
pub struct SqliteLinkStore {
    pool: SqlitePool,
}

/// Raw `links` row. Timestamps are decoded by hand so a malformed value
/// surfaces as [`StoreError::Corrupt`] instead of a generic driver error.
#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    short_code: String,
    long_url: String,
    created_at: String,
    hits: i64,
    last_visited: Option<String>,
}

impl TryFrom<LinkRow> for Link {
    type Error = StoreError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        let created_at = parse_ts(&row.created_at)?;
        let last_visited = row.last_visited.as_deref().map(parse_ts).transpose()?;
        Ok(Link {
            short_code: row.short_code,
            long_url: row.long_url,
            created_at,
            hits: row.hits,
            last_visited,
        })
    }
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{raw}': {e}")))
}

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl SqliteLinkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if needed) the database at `database_url` and apply the
    /// embedded migrations.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(
                database_url
                    .parse::<SqliteConnectOptions>()?
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal),
            )
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl LinkStore for SqliteLinkStore {
    async fn insert_if_absent(&self, link: &Link) -> Result<(), StoreError> {
        let res = sqlx::query(
            "INSERT INTO links (short_code, long_url, created_at, hits, last_visited)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&link.short_code)
        .bind(&link.long_url)
        .bind(format_ts(link.created_at))
        .bind(link.hits)
        .bind(link.last_visited.map(format_ts))
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::AlreadyExists)
            }
            Err(e) => Err(StoreError::Backend(e)),
        }
    }

    async fn get_consistent(&self, short_code: &str) -> Result<Link, StoreError> {
        let row: Option<LinkRow> = sqlx::query_as(
            "SELECT short_code, long_url, created_at, hits, last_visited
             FROM links WHERE short_code = ?1",
        )
        .bind(short_code)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(StoreError::NotFound)?.try_into()
    }

    async fn increment_hit_and_touch(&self, short_code: &str) -> Result<(), StoreError> {
        let affected = sqlx::query(
            "UPDATE links SET hits = hits + 1, last_visited = ?2 WHERE short_code = ?1",
        )
        .bind(short_code)
        .bind(format_ts(Utc::now()))
        .execute(&self.pool)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
