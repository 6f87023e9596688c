//! Document rows in the key-value table.
//!
//! Values are stored as JSON text next to a denormalized `recency` column
//! used for ordering and pruning.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio_rusqlite::{params, rusqlite};

use super::{KvDb, RemoteStore};
use crate::Error;
use crate::store::DocumentRecord;

impl KvDb {
    /// Insert or update a batch of documents in one transaction.
    pub async fn put_documents(&self, records: Vec<DocumentRecord>) -> Result<usize, Error> {
        let updated_at = Utc::now().to_rfc3339();
        let rows = records
            .iter()
            .map(|r| -> Result<_, Error> { Ok((r.id.clone(), serde_json::to_string(r)?, r.recency.value())) })
            .collect::<Result<Vec<_>, Error>>()?;

        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        "INSERT INTO documents (key, value, recency, updated_at)
                        VALUES (?1, ?2, ?3, ?4)
                        ON CONFLICT(key) DO UPDATE SET
                            value = excluded.value,
                            recency = excluded.recency,
                            updated_at = excluded.updated_at",
                    )?;
                    for (key, value, recency) in &rows {
                        stmt.execute(params![key, value, recency, updated_at])?;
                    }
                }
                tx.commit()?;
                Ok(rows.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Write a raw JSON value under `key`, bypassing record encoding.
    pub async fn put_raw(&self, key: &str, value: &str, recency: i64) -> Result<(), Error> {
        let key = key.to_string();
        let value = value.to_string();
        let updated_at = Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO documents (key, value, recency, updated_at) VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        recency = excluded.recency,
                        updated_at = excluded.updated_at",
                    params![key, value, recency, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get a document by id.
    ///
    /// Returns None if the id doesn't exist in the store.
    pub async fn get_document(&self, key: &str) -> Result<Option<DocumentRecord>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<DocumentRecord>, Error> {
                let result = conn.query_row("SELECT value FROM documents WHERE key = ?1", params![key], |row| {
                    row.get::<_, String>(0)
                });

                match result {
                    Ok(raw) => Ok(Some(decode(&key, &raw))),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Load every stored document, keyed by id.
    pub async fn load_documents(&self) -> Result<BTreeMap<String, DocumentRecord>, Error> {
        self.conn
            .call(|conn| -> Result<BTreeMap<String, DocumentRecord>, Error> {
                let mut stmt = conn.prepare("SELECT key, value FROM documents")?;
                let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

                let mut documents = BTreeMap::new();
                for row in rows {
                    let (key, raw) = row?;
                    let record = decode(&key, &raw);
                    documents.insert(key, record);
                }
                Ok(documents)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored documents.
    pub async fn count(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Purge lowest-recency documents until count <= max_entries.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_lru(&self, max_entries: usize) -> Result<u64, Error> {
        let max = max_entries as i64;
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
                if count <= max {
                    return Ok(0);
                }

                let to_delete = count - max;
                let deleted = conn.execute(
                    "DELETE FROM documents WHERE key IN (
                    SELECT key FROM documents ORDER BY recency ASC, updated_at ASC LIMIT ?1
                )",
                    params![to_delete],
                )?;
                Ok(deleted as u64)
            })
            .await
            .map_err(Error::from)
    }
}

fn decode(key: &str, raw: &str) -> DocumentRecord {
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|e| {
        tracing::debug!(key, error = %e, "stored value is not JSON; decoding as empty");
        Value::Null
    });
    DocumentRecord::from_stored(key, &value)
}

#[async_trait]
impl RemoteStore for KvDb {
    async fn load_all(&self) -> Result<BTreeMap<String, DocumentRecord>, Error> {
        self.load_documents().await
    }

    fn store(&self, records: BTreeMap<String, DocumentRecord>) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(count = records.len(), "no async runtime available; dropping remote write");
            return;
        };

        let db = self.clone();
        handle.spawn(async move {
            let count = records.len();
            match db.put_documents(records.into_values().collect()).await {
                Ok(_) => tracing::debug!(count, "persisted documents"),
                Err(e) => tracing::warn!(count, error = %e, "remote write failed"),
            }
        });
    }
}
