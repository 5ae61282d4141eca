//! Persistent SQLite store for FAQ entries.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::{debug, info, warn};

use crate::bot::entry::{Attachment, FaqEntry, ViewType};
use crate::bot::error::StoreError;

const COLUMNS: &str =
    "chat_id, question, answer_text, answer_filename, answer_file, answer_viewtype";

/// FAQ entries keyed by `(chat_id, question)`.
///
/// Constructed once at startup and shared with the handlers. Each call runs
/// one statement on the blocking pool under the connection lock, so reads
/// always observe earlier writes and handlers in other chats keep running.
pub struct FaqStore {
    conn: Arc<Mutex<Connection>>,
}

impl FaqStore {
    /// Create a new in-memory store.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    /// Open (or create) a store at the given path. Runs before the
    /// dispatcher starts, so it blocks.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM faq", [], |row| row.get(0))?;
        info!("Loaded FAQ database from {:?} ({} entries)", path, count);
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    #[cfg(test)]
    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        init_schema(&conn)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&*guard)
        })
        .await?
    }

    /// Close the underlying connection, flushing anything SQLite still holds.
    pub fn close(self) -> Result<(), StoreError> {
        let conn = Arc::try_unwrap(self.conn).map_err(|_| StoreError::InUse)?;
        let conn = conn.into_inner().map_err(|_| StoreError::Poisoned)?;
        conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    /// Total number of entries across all chats.
    #[cfg(test)]
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM faq", [], |row| row.get(0))?;
            Ok(n as usize)
        })
        .await
    }

    /// All entries of a chat, oldest first.
    pub async fn list(&self, chat_id: i64) -> Result<Vec<FaqEntry>, StoreError> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM faq WHERE chat_id = ?1 ORDER BY id"
            ))?;
            let entries = stmt
                .query_map(params![chat_id], entry_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
    }

    /// Exact-match lookup of a question within a chat.
    pub async fn find(&self, chat_id: i64, question: &str) -> Result<Option<FaqEntry>, StoreError> {
        let question = question.to_string();
        self.with_conn(move |conn| {
            let entry = conn
                .query_row(
                    &format!("SELECT {COLUMNS} FROM faq WHERE chat_id = ?1 AND question = ?2"),
                    params![chat_id, question],
                    entry_from_row,
                )
                .optional()?;
            Ok(entry)
        })
        .await
    }

    /// Insert a new entry. Fails with [`StoreError::DuplicateKey`] if the
    /// question is already saved in that chat.
    pub async fn create(&self, entry: &FaqEntry) -> Result<(), StoreError> {
        let entry = entry.clone();
        self.with_conn(move |conn| {
            let (filename, file, view_type) = match &entry.attachment {
                Some(a) => (
                    Some(a.filename.as_str()),
                    Some(a.bytes.as_slice()),
                    Some(a.view_type.as_str()),
                ),
                None => (None, None, None),
            };

            let result = conn.execute(
                &format!("INSERT INTO faq ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![entry.chat_id, entry.question, entry.answer_text, filename, file, view_type],
            );

            match result {
                Ok(_) => {
                    debug!("Saved question {:?} in chat {}", entry.question, entry.chat_id);
                    Ok(())
                }
                Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                    Err(StoreError::DuplicateKey {
                        chat_id: entry.chat_id,
                        question: entry.question.clone(),
                    })
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }

    /// Remove an entry. Returns whether a row was deleted.
    pub async fn delete(&self, chat_id: i64, question: &str) -> Result<bool, StoreError> {
        let question = question.to_string();
        self.with_conn(move |conn| {
            let n = conn.execute(
                "DELETE FROM faq WHERE chat_id = ?1 AND question = ?2",
                params![chat_id, question],
            )?;
            Ok(n > 0)
        })
        .await
    }
}

fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS faq (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            chat_id INTEGER NOT NULL,
            question TEXT NOT NULL,
            answer_text TEXT,
            answer_filename TEXT,
            answer_file BLOB,
            answer_viewtype TEXT,
            UNIQUE (chat_id, question)
        );

        CREATE INDEX IF NOT EXISTS idx_faq_chat_id ON faq(chat_id);
    "#,
    )?;
    Ok(())
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<FaqEntry> {
    let chat_id: i64 = row.get(0)?;
    let question: String = row.get(1)?;
    let filename: Option<String> = row.get(3)?;
    let file: Option<Vec<u8>> = row.get(4)?;
    let view_type: Option<String> = row.get(5)?;

    let attachment = match (filename, file, view_type) {
        (Some(filename), Some(bytes), Some(view_type)) => {
            let view_type = view_type.parse().unwrap_or_else(|e| {
                warn!("Entry {:?} in chat {}: {}, sending as file", question, chat_id, e);
                ViewType::File
            });
            Some(Attachment { filename, bytes, view_type })
        }
        (None, None, None) => None,
        _ => {
            warn!("Entry {:?} in chat {} has a partial attachment, ignoring it", question, chat_id);
            None
        }
    };

    Ok(FaqEntry {
        chat_id,
        question,
        answer_text: row.get(2)?,
        attachment,
    })
}
