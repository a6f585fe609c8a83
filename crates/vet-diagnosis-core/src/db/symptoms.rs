//! Symptom database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::Symptom;

impl Database {
    /// Insert a new symptom. Names are unique.
    pub fn insert_symptom(&self, symptom: &Symptom) -> DbResult<()> {
        if self.get_symptom_by_name(&symptom.name)?.is_some() {
            return Err(DbError::Constraint(format!(
                "Symptom name already exists: {}",
                symptom.name
            )));
        }

        self.conn.execute(
            "INSERT INTO symptoms (id, name, description) VALUES (?1, ?2, ?3)",
            params![symptom.id, symptom.name, symptom.description],
        )?;
        Ok(())
    }

    /// Update name/description of an existing symptom.
    pub fn update_symptom(&self, symptom: &Symptom) -> DbResult<bool> {
        if let Some(existing) = self.get_symptom_by_name(&symptom.name)? {
            if existing.id != symptom.id {
                return Err(DbError::Constraint(format!(
                    "Symptom name already exists: {}",
                    symptom.name
                )));
            }
        }

        let rows_affected = self.conn.execute(
            "UPDATE symptoms SET name = ?2, description = ?3 WHERE id = ?1",
            params![symptom.id, symptom.name, symptom.description],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a symptom by ID.
    pub fn get_symptom(&self, id: &str) -> DbResult<Option<Symptom>> {
        self.conn
            .query_row(
                "SELECT id, name, description FROM symptoms WHERE id = ?",
                [id],
                symptom_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Get a symptom by exact name (case-insensitive).
    pub fn get_symptom_by_name(&self, name: &str) -> DbResult<Option<Symptom>> {
        self.conn
            .query_row(
                "SELECT id, name, description FROM symptoms WHERE name = ? COLLATE NOCASE",
                [name],
                symptom_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all symptoms ordered by name.
    pub fn list_symptoms(&self) -> DbResult<Vec<Symptom>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM symptoms ORDER BY name")?;
        let rows = stmt.query_map([], symptom_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Search symptoms using FTS5 (BM25 ranking), prefix matching each word.
    pub fn search_symptoms(&self, query: &str, limit: usize) -> DbResult<Vec<Symptom>> {
        let escaped_query = escape_fts_query(query);
        if escaped_query.is_empty() {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.id, s.name, s.description,
                   bm25(symptoms_fts) as rank
            FROM symptoms s
            JOIN symptoms_fts fts ON s.rowid = fts.rowid
            WHERE symptoms_fts MATCH ?
            ORDER BY rank
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(params![escaped_query, limit as i64], symptom_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a symptom (also removes it from disease profiles and consultations).
    pub fn delete_symptom(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM symptoms WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

fn symptom_from_row(row: &Row<'_>) -> rusqlite::Result<Symptom> {
    Ok(Symptom {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

/// Escape special FTS5 characters and prepare query for prefix matching.
///
/// Each word becomes a quoted prefix term so AND/OR/NOT/NEAR are matched as text.
fn escape_fts_query(query: &str) -> String {
    let cleaned: String = query
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    cleaned
        .split_whitespace()
        .map(|word| format!("\"{}\"*", word.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}
