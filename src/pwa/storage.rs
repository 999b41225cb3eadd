/// SQLite persistence layer for PWA records
///
/// Handles record CRUD in the directory database. Saving a record first
/// runs the manifest fetcher, so a record never lands in the table unless
/// its manifest URL resolved to a parseable document. The manifest itself
/// is stored as JSON next to the indexed lookup fields.

use crate::pwa::{
    error::PwaError,
    manifest::ManifestFetcher,
    types::{Manifest, Pwa},
};
use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool},
    Row,
};
use std::path::Path;
use std::sync::Arc;

/// Open (and create if missing) the directory database under `data_dir`
pub async fn open_pool(data_dir: &str) -> Result<SqlitePool> {
    std::fs::create_dir_all(data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory '{}': {}", data_dir, e))?;
    let db_path = Path::new(data_dir).join("pwas.db");

    tracing::info!("Opening directory database: {}", db_path.display());

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;

    Ok(pool)
}

/// SQLite-backed store for PWA records
///
/// Wraps a connection pool plus the manifest fetcher consulted on every
/// save. Cloning is cheap: the pool is a handle and the fetcher is shared.
#[derive(Clone)]
pub struct PwaStore {
    /// SQLite connection pool for the directory database
    pool: SqlitePool,
    /// Fetcher consulted before any record is persisted
    fetcher: Arc<dyn ManifestFetcher>,
}

impl PwaStore {
    /// Create a new store over an open pool
    pub fn new(pool: SqlitePool, fetcher: Arc<dyn ManifestFetcher>) -> Self {
        Self { pool, fetcher }
    }

    /// Initialize the record schema
    ///
    /// Creates the pwas table and its indexes. Safe to call multiple times
    /// (uses IF NOT EXISTS).
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pwas (
                id TEXT PRIMARY KEY,
                manifest_url TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                manifest TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Index on updated_at for the list ordering
        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_pwas_updated_at
            ON pwas(updated_at)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List a page of records, most recently updated first
    ///
    /// Returns up to `page_size` records starting at the opaque
    /// `page_token` cursor, plus the cursor for the following page (`None`
    /// once the page comes back short). Repeating a cursor re-reads the
    /// same page.
    pub async fn list(
        &self,
        page_size: i64,
        page_token: Option<&str>,
    ) -> Result<(Vec<Pwa>, Option<String>), PwaError> {
        let offset = decode_page_token(page_token)?;

        let rows = sqlx::query(
            r#"
            SELECT id, manifest_url, user_id, manifest, created_at, updated_at
            FROM pwas
            ORDER BY updated_at DESC, id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut pwas = Vec::with_capacity(rows.len());
        for row in rows {
            pwas.push(row_to_pwa(&row)?);
        }

        let next_page_token = if pwas.len() as i64 == page_size {
            Some((offset + page_size).to_string())
        } else {
            None
        };

        Ok((pwas, next_page_token))
    }

    /// Retrieve a record by id
    pub async fn find(&self, id: &str) -> Result<Pwa, PwaError> {
        let row = sqlx::query(
            r#"
            SELECT id, manifest_url, user_id, manifest, created_at, updated_at
            FROM pwas
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_pwa(&row),
            None => Err(PwaError::NotFound),
        }
    }

    /// Persist a record, fetching its manifest first
    ///
    /// Assigns an id on first save; a record carrying an id is updated in
    /// place. Fails with `ManifestLoad` when the manifest URL does not
    /// resolve to a parseable document, and with `AlreadyExists` when a
    /// different record already claims the same manifest URL.
    pub async fn save(&self, pwa: Pwa) -> Result<Pwa, PwaError> {
        let manifest = self.fetcher.fetch(&pwa.manifest_url).await?;

        // A different record owning the same manifest URL is a duplicate,
        // whether this save is a create or an update.
        let existing = sqlx::query("SELECT id FROM pwas WHERE manifest_url = ?")
            .bind(&pwa.manifest_url)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = existing {
            let existing_id: String = row.get("id");
            if pwa.id.as_deref() != Some(existing_id.as_str()) {
                return Err(PwaError::AlreadyExists);
            }
        }

        let user_id = pwa
            .user_id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("record has no owning user"))?;
        let id = pwa
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let manifest_json = serde_json::to_string(&manifest)?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO pwas (id, manifest_url, user_id, manifest, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                manifest_url = excluded.manifest_url,
                user_id = excluded.user_id,
                manifest = excluded.manifest,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&pwa.manifest_url)
        .bind(&user_id)
        .bind(&manifest_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!("Saved PWA record: {} ({})", id, pwa.manifest_url);

        self.find(&id).await
    }

    /// Delete a record by id
    ///
    /// Deleting an id that is already gone is not a failure.
    pub async fn delete(&self, id: &str) -> Result<(), PwaError> {
        sqlx::query("DELETE FROM pwas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!("Deleted PWA record: {}", id);

        Ok(())
    }
}

/// Decode the opaque list cursor
///
/// Cursors are minted by `list` itself; anything that does not parse back
/// is a caller error, reported opaquely rather than coerced to page one.
fn decode_page_token(page_token: Option<&str>) -> Result<i64, PwaError> {
    match page_token {
        None => Ok(0),
        Some(token) => token
            .parse::<i64>()
            .ok()
            .filter(|offset| *offset >= 0)
            .ok_or_else(|| PwaError::Other(anyhow::anyhow!("invalid page token: {token}"))),
    }
}

/// Map a database row to a record
fn row_to_pwa(row: &sqlx::sqlite::SqliteRow) -> Result<Pwa, PwaError> {
    let manifest_json: String = row.get("manifest");
    let manifest: Manifest = serde_json::from_str(&manifest_json)?;

    Ok(Pwa {
        id: Some(row.get("id")),
        manifest_url: row.get("manifest_url"),
        user_id: Some(row.get("user_id")),
        manifest: Some(manifest),
        created_at: Some(row.get("created_at")),
        updated_at: Some(row.get("updated_at")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;

    /// Stub fetcher so store tests never touch the network
    struct StubFetcher {
        fail: bool,
    }

    #[async_trait]
    impl ManifestFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<Manifest, PwaError> {
            if self.fail {
                return Err(PwaError::ManifestLoad(format!("stub refused {url}")));
            }
            Ok(Manifest {
                name: Some("Stub App".to_string()),
                ..Manifest::default()
            })
        }
    }

    async fn memory_store(fail_fetch: bool) -> PwaStore {
        // Single connection: each in-memory SQLite connection is its own db
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let store = PwaStore::new(pool, Arc::new(StubFetcher { fail: fail_fetch }));
        store.init_schema().await.unwrap();
        store
    }

    fn draft(url: &str) -> Pwa {
        let mut pwa = Pwa::new(url);
        pwa.user_id = Some("user-1".to_string());
        pwa
    }

    #[tokio::test]
    async fn save_assigns_id_and_populates_manifest() {
        let store = memory_store(false).await;

        let saved = store.save(draft("https://a.example/manifest.json")).await.unwrap();
        let id = saved.id.clone().unwrap();
        assert!(!id.is_empty());
        assert_eq!(saved.manifest.as_ref().unwrap().name.as_deref(), Some("Stub App"));
        assert!(saved.created_at.is_some());

        let found = store.find(&id).await.unwrap();
        assert_eq!(found.manifest_url, "https://a.example/manifest.json");
        assert_eq!(found.user_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn duplicate_manifest_url_is_rejected() {
        let store = memory_store(false).await;

        store.save(draft("https://a.example/manifest.json")).await.unwrap();
        let err = store
            .save(draft("https://a.example/manifest.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, PwaError::AlreadyExists));
    }

    #[tokio::test]
    async fn resave_with_id_updates_in_place() {
        let store = memory_store(false).await;

        let saved = store.save(draft("https://a.example/manifest.json")).await.unwrap();
        let id = saved.id.clone().unwrap();

        let mut edited = saved;
        edited.manifest_url = "https://a.example/v2/manifest.json".to_string();
        let resaved = store.save(edited).await.unwrap();

        assert_eq!(resaved.id.as_deref(), Some(id.as_str()));
        let found = store.find(&id).await.unwrap();
        assert_eq!(found.manifest_url, "https://a.example/v2/manifest.json");
    }

    #[tokio::test]
    async fn update_colliding_with_other_record_is_rejected() {
        let store = memory_store(false).await;

        store.save(draft("https://a.example/manifest.json")).await.unwrap();
        let second = store.save(draft("https://b.example/manifest.json")).await.unwrap();

        let mut edited = second;
        edited.manifest_url = "https://a.example/manifest.json".to_string();
        let err = store.save(edited).await.unwrap_err();
        assert!(matches!(err, PwaError::AlreadyExists));
    }

    #[tokio::test]
    async fn fetch_failure_keeps_record_out_of_store() {
        let store = memory_store(true).await;

        let err = store
            .save(draft("https://a.example/manifest.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, PwaError::ManifestLoad(_)));

        let (pwas, _) = store.list(10, None).await.unwrap();
        assert!(pwas.is_empty());
    }

    #[tokio::test]
    async fn find_missing_is_not_found() {
        let store = memory_store(false).await;
        let err = store.find("nope").await.unwrap_err();
        assert!(matches!(err, PwaError::NotFound));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = memory_store(false).await;

        let saved = store.save(draft("https://a.example/manifest.json")).await.unwrap();
        let id = saved.id.unwrap();

        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();

        assert!(matches!(store.find(&id).await.unwrap_err(), PwaError::NotFound));
    }

    #[tokio::test]
    async fn list_paginates_with_opaque_cursor() {
        let store = memory_store(false).await;

        for i in 0..12 {
            store
                .save(draft(&format!("https://app-{i}.example/manifest.json")))
                .await
                .unwrap();
        }

        let (first, token) = store.list(10, None).await.unwrap();
        assert_eq!(first.len(), 10);
        let token = token.expect("full page should carry a cursor");

        let (second, next) = store.list(10, Some(&token)).await.unwrap();
        assert_eq!(second.len(), 2);
        assert!(next.is_none());

        // Same cursor, same page
        let (replay, _) = store.list(10, Some(&token)).await.unwrap();
        let ids = |page: &[Pwa]| page.iter().map(|p| p.id.clone().unwrap()).collect::<Vec<_>>();
        assert_eq!(ids(&second), ids(&replay));
    }

    #[tokio::test]
    async fn garbled_cursor_is_an_opaque_failure() {
        let store = memory_store(false).await;
        let err = store.list(10, Some("not-a-cursor")).await.unwrap_err();
        assert!(matches!(err, PwaError::Other(_)));
    }

    #[tokio::test]
    async fn open_pool_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");

        let pool = open_pool(data_dir.to_str().unwrap()).await.unwrap();
        let store = PwaStore::new(pool, Arc::new(StubFetcher { fail: false }));
        store.init_schema().await.unwrap();

        let saved = store.save(draft("https://a.example/manifest.json")).await.unwrap();
        assert!(store.find(&saved.id.unwrap()).await.is_ok());
        assert!(data_dir.join("pwas.db").exists());
    }
}
