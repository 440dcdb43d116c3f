use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use uuid::Uuid;

use shared::domain::{CollectionKind, EntryBody, EntryId, MoveDirection};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub id: EntryId,
    pub collection: CollectionKind,
    pub position: i64,
    pub body: EntryBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Returns every entry of the collection, sorted by position (id as a
    /// stable tiebreak while positions are sparse after deletes).
    pub async fn list_entries(&self, collection: CollectionKind) -> Result<Vec<StoredEntry>> {
        let rows = sqlx::query(
            "SELECT id, position, body, created_at, updated_at
             FROM entries
             WHERE collection = ?
             ORDER BY position ASC, id ASC",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| decode_entry(collection, &row))
            .collect()
    }

    /// Inserts a new entry with a fresh id. Appends at `count + 1` unless an
    /// explicit position is supplied.
    pub async fn create_entry(
        &self,
        collection: CollectionKind,
        position: Option<i64>,
        body: &EntryBody,
    ) -> Result<StoredEntry> {
        let id = Uuid::new_v4().to_string();
        let body_json = serde_json::to_string(body).context("failed to encode entry body")?;

        let mut tx = self.pool.begin().await?;
        let position = match position {
            Some(position) => position,
            None => {
                let count: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM entries WHERE collection = ?")
                        .bind(collection.as_str())
                        .fetch_one(&mut *tx)
                        .await?;
                count + 1
            }
        };

        let row = sqlx::query(
            "INSERT INTO entries (id, collection, position, body)
             VALUES (?, ?, ?, ?)
             RETURNING id, position, body, created_at, updated_at",
        )
        .bind(&id)
        .bind(collection.as_str())
        .bind(position)
        .bind(&body_json)
        .fetch_one(&mut *tx)
        .await?;
        let entry = decode_entry(collection, &row)?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Replaces the body of the matching entry. The stored position is kept
    /// unless an explicit one is supplied. Returns `None` when no entry
    /// matches.
    pub async fn update_entry(
        &self,
        collection: CollectionKind,
        id: &EntryId,
        position: Option<i64>,
        body: &EntryBody,
    ) -> Result<Option<StoredEntry>> {
        let body_json = serde_json::to_string(body).context("failed to encode entry body")?;

        let row = if let Some(position) = position {
            sqlx::query(
                "UPDATE entries
                 SET position = ?, body = ?, updated_at = CURRENT_TIMESTAMP
                 WHERE collection = ? AND id = ?
                 RETURNING id, position, body, created_at, updated_at",
            )
            .bind(position)
            .bind(&body_json)
            .bind(collection.as_str())
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?
        } else {
            sqlx::query(
                "UPDATE entries
                 SET body = ?, updated_at = CURRENT_TIMESTAMP
                 WHERE collection = ? AND id = ?
                 RETURNING id, position, body, created_at, updated_at",
            )
            .bind(&body_json)
            .bind(collection.as_str())
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?
        };

        row.map(|row| decode_entry(collection, &row)).transpose()
    }

    /// Removes the matching entry without renumbering the remainder; the
    /// position sequence may stay sparse until the next reorder. Reports
    /// whether a row was removed.
    pub async fn delete_entry(&self, collection: CollectionKind, id: &EntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE collection = ? AND id = ?")
            .bind(collection.as_str())
            .bind(&id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Swap-and-renumber reorder. Swaps the entry with its immediate
    /// neighbour in sort order (no-op at the boundary), then rewrites every
    /// entry's position to the dense 1..N sequence matching the new order,
    /// inside one transaction so readers never observe a half-renumbered
    /// collection. Returns the full collection, or `None` when the id does
    /// not match any entry.
    pub async fn reorder_entry(
        &self,
        collection: CollectionKind,
        id: &EntryId,
        direction: MoveDirection,
    ) -> Result<Option<Vec<StoredEntry>>> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            "SELECT id, position, body, created_at, updated_at
             FROM entries
             WHERE collection = ?
             ORDER BY position ASC, id ASC",
        )
        .bind(collection.as_str())
        .fetch_all(&mut *tx)
        .await?;
        let mut entries = rows
            .into_iter()
            .map(|row| decode_entry(collection, &row))
            .collect::<Result<Vec<_>>>()?;

        let Some(index) = entries.iter().position(|entry| &entry.id == id) else {
            return Ok(None);
        };

        let neighbour = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < entries.len() => index + 1,
            // First + up or last + down: the collection is returned unchanged.
            _ => return Ok(Some(entries)),
        };

        entries.swap(index, neighbour);
        for (offset, entry) in entries.iter_mut().enumerate() {
            entry.position = (offset + 1) as i64;
            sqlx::query(
                "UPDATE entries SET position = ?, updated_at = CURRENT_TIMESTAMP
                 WHERE collection = ? AND id = ?",
            )
            .bind(entry.position)
            .bind(collection.as_str())
            .bind(&entry.id.0)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(Some(entries))
    }
}

fn decode_entry(collection: CollectionKind, row: &SqliteRow) -> Result<StoredEntry> {
    let body_json = row.get::<String, _>(2);
    let body: EntryBody = serde_json::from_str(&body_json)
        .with_context(|| format!("invalid stored body in collection '{collection}'"))?;
    if body.collection() != collection {
        return Err(anyhow!(
            "stored body kind '{}' does not match collection '{collection}'",
            body.collection()
        ));
    }

    Ok(StoredEntry {
        id: EntryId(row.get::<String, _>(0)),
        collection,
        position: row.get::<i64, _>(1),
        body,
        created_at: row.get::<DateTime<Utc>, _>(3),
        updated_at: row.get::<DateTime<Utc>, _>(4),
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
