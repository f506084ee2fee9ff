//! SQLite book store
//!
//! Reads the catalog snapshot from, and writes accepted records to, an
//! existing `books` table. The table itself is owned by the surrounding
//! application; this adapter never creates or alters it.

use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

use super::CatalogSource;
use crate::catalog::{BookRecord, CatalogEntry};
use crate::error::Result;

/// Category stored when a record has none
pub const FALLBACK_CATEGORY: &str = "其他";

/// Database connection wrapper
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open the database at path
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        debug!("Opened book database {:?}", path);
        Ok(Self { conn })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Insert accepted records, returning their row ids in order
    pub fn save_records(
        &mut self,
        records: &[BookRecord],
        image_path: Option<&str>,
        ocr_text: Option<&str>,
    ) -> Result<Vec<i64>> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(records.len());

        for record in records {
            tx.execute(
                "INSERT INTO books (title, author, publisher, edition, category, price, image_path, ocr_text)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.title,
                    record.author,
                    record.publisher,
                    record.edition,
                    record.category.as_deref().unwrap_or(FALLBACK_CATEGORY),
                    record.price,
                    image_path,
                    ocr_text,
                ],
            )?;
            ids.push(tx.last_insert_rowid());
        }

        tx.commit()?;
        info!("Saved {} books", ids.len());
        Ok(ids)
    }
}

impl CatalogSource for SqliteCatalog {
    fn recent_entries(&self, limit: usize) -> Result<Vec<CatalogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, author, publisher, edition, category FROM books
             ORDER BY created_at DESC, id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(CatalogEntry {
                title: row.get(0)?,
                author: row.get(1)?,
                publisher: row.get(2)?,
                edition: row.get(3)?,
                category: row.get(4)?,
            })
        })?;

        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        debug!("Loaded {} catalog entries (limit {})", entries.len(), limit);
        Ok(entries)
    }

    fn save_books(
        &mut self,
        records: &[BookRecord],
        image_path: Option<&str>,
        ocr_text: Option<&str>,
    ) -> Result<usize> {
        Ok(self.save_records(records, image_path, ocr_text)?.len())
    }
}
