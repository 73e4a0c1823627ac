//! Document Storage
//! Mission: Schema-flexible JSON collections for guests, rooms and bookings
//!
//! Each document is a JSON object stored whole in a single row. The store
//! assigns the identifier and exposes it to clients as `_id`; whatever `_id`
//! a client sends is discarded. All operations touch exactly one document.

use super::{open_database, IN_MEMORY};
use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// A stored JSON object
pub type Document = Map<String, Value>;

/// Key under which the document identifier is exposed
pub const ID_FIELD: &str = "_id";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body_json TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection
    ON documents(collection);
"#;

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Guests,
    Rooms,
    Bookings,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Guests, Collection::Rooms, Collection::Bookings];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Guests => "guests",
            Collection::Rooms => "rooms",
            Collection::Bookings => "bookings",
        }
    }

    /// Singular, capitalised name used in client-facing messages
    pub fn kind(&self) -> &'static str {
        match self {
            Collection::Guests => "Guest",
            Collection::Rooms => "Room",
            Collection::Bookings => "Booking",
        }
    }
}

/// SQLite-backed document store
pub struct DocumentStore {
    conn: Arc<Mutex<Connection>>,
}

impl DocumentStore {
    /// Open (or create) the document store at `db_path`
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = open_database(db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize document schema")?;

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .context("Failed to count documents")?;
        info!("🏨 Document store ready ({} documents)", count);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(IN_MEMORY)
    }

    /// Insert a new document and return it with its assigned `_id`
    pub fn insert(&self, collection: Collection, mut doc: Document) -> Result<Document> {
        doc.remove(ID_FIELD);
        let id = Uuid::new_v4();
        let body_json = serde_json::to_string(&doc)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents (collection, id, body_json, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                collection.as_str(),
                id.to_string(),
                body_json,
                Utc::now().to_rfc3339()
            ],
        )
        .with_context(|| format!("Failed to insert into {}", collection.as_str()))?;

        debug!(collection = collection.as_str(), %id, "document inserted");
        Ok(with_id(id, doc))
    }

    /// All documents of a collection in insertion order
    pub fn find_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, body_json FROM documents WHERE collection = ?1 ORDER BY rowid",
        )?;

        let rows = stmt
            .query_map(params![collection.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, body)| decode(&id, &body))
            .collect()
    }

    pub fn find_by_id(&self, collection: Collection, id: &Uuid) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        load(&conn, collection, id)
    }

    /// Shallow-merge `fields` into an existing document.
    ///
    /// Returns the updated document, or `None` when no document has that id.
    pub fn update(
        &self,
        collection: Collection,
        id: &Uuid,
        mut fields: Document,
    ) -> Result<Option<Document>> {
        fields.remove(ID_FIELD);

        // Read-modify-write happens under one lock acquisition.
        let conn = self.conn.lock();
        let Some(mut doc) = load(&conn, collection, id)? else {
            return Ok(None);
        };

        doc.remove(ID_FIELD);
        doc.extend(fields);
        let body_json = serde_json::to_string(&doc)?;

        conn.execute(
            "UPDATE documents SET body_json = ?1 WHERE collection = ?2 AND id = ?3",
            params![body_json, collection.as_str(), id.to_string()],
        )
        .with_context(|| format!("Failed to update {} {}", collection.kind(), id))?;

        debug!(collection = collection.as_str(), %id, "document updated");
        Ok(Some(with_id(*id, doc)))
    }

    /// Delete a document; returns whether anything was removed
    pub fn delete(&self, collection: Collection, id: &Uuid) -> Result<bool> {
        let conn = self.conn.lock();
        let rows_affected = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id.to_string()],
        )?;

        if rows_affected > 0 {
            info!("🗑️  Deleted {} {}", collection.kind(), id);
        }
        Ok(rows_affected > 0)
    }
}

fn load(conn: &Connection, collection: Collection, id: &Uuid) -> Result<Option<Document>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body_json FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    body.map(|body| decode(&id.to_string(), &body)).transpose()
}

fn decode(id: &str, body: &str) -> Result<Document> {
    let mut doc: Document = serde_json::from_str(body)
        .with_context(|| format!("Corrupt document body for {}", id))?;
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(doc)
}

fn with_id(id: Uuid, mut doc: Document) -> Document {
    doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    doc
}
