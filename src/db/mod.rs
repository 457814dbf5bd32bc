use crate::errors::{AppError, AppResult};
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!("schema.sql");

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Store(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn insert_document(&self, collection: &str, body: &serde_json::Value) -> AppResult<Document> {
        let id = Uuid::new_v4().to_string();
        let now = now_micros();

        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "INSERT INTO documents (collection, id, body_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                collection,
                id,
                serde_json::to_string(body)?,
                format_timestamp(now),
                format_timestamp(now),
            ],
        )?;

        Ok(Document {
            id,
            body: body.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_document(&self, collection: &str, id: &str) -> AppResult<Option<Document>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let row: Option<(String, String, String, String)> = conn
            .query_row(
                "SELECT id, body_json, created_at, updated_at FROM documents
                 WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        row.map(document_from_row).transpose()
    }

    pub fn list_documents(&self, collection: &str) -> AppResult<Vec<Document>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let mut statement = conn.prepare(
            "SELECT id, body_json, created_at, updated_at FROM documents
             WHERE collection = ?1
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = statement
            .query_map(params![collection], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<Result<Vec<(String, String, String, String)>, _>>()?;

        rows.into_iter().map(document_from_row).collect()
    }

    pub fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: &serde_json::Value,
    ) -> AppResult<Document> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let existing: Option<(String, String)> = conn
            .query_row(
                "SELECT body_json, created_at FROM documents
                 WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((raw_body, raw_created_at)) = existing else {
            return Err(AppError::NotFound(format!(
                "No document {} in collection {}",
                id, collection
            )));
        };

        let mut body: serde_json::Value = serde_json::from_str(&raw_body)?;
        if let (Some(target), Some(updates)) = (body.as_object_mut(), fields.as_object()) {
            for (key, value) in updates {
                target.insert(key.clone(), value.clone());
            }
        }

        let now = now_micros();
        conn.execute(
            "UPDATE documents SET body_json = ?1, updated_at = ?2
             WHERE collection = ?3 AND id = ?4",
            params![serde_json::to_string(&body)?, format_timestamp(now), collection, id],
        )?;

        Ok(Document {
            id: id.to_string(),
            body,
            created_at: parse_timestamp(&raw_created_at)?,
            updated_at: now,
        })
    }

    // Deleting an absent document is a no-op.
    pub fn delete_document(&self, collection: &str, id: &str) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        Ok(())
    }

    pub fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> AppResult<Vec<Document>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))?;
        let mut statement = conn.prepare(
            "SELECT id, body_json, created_at, updated_at FROM documents
             WHERE collection = ?1 AND json_extract(body_json, '$.' || ?2) = ?3
             ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = statement
            .query_map(params![collection, field, value], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<Result<Vec<(String, String, String, String)>, _>>()?;

        rows.into_iter().map(document_from_row).collect()
    }
}

fn document_from_row(
    (id, body_json, created_at, updated_at): (String, String, String, String),
) -> AppResult<Document> {
    Ok(Document {
        id,
        body: serde_json::from_str(&body_json)?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// Timestamps are held at microsecond precision so a document read back from
// the store compares equal to the one returned at write time.
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

// Fixed-width RFC 3339 so lexicographic column order matches chronological order.
fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|err| AppError::Internal(format!("invalid stored timestamp '{}': {}", raw, err)))
}
