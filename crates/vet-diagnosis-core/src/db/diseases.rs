//! Disease knowledge base operations.

use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{params, OptionalExtension};

use super::{collect_ids, Database, DbError, DbResult};
use crate::diagnosis::DiseaseCatalog;
use crate::models::{Disease, SymptomId};

impl Database {
    /// Insert or update a disease together with its symptom profile.
    ///
    /// The stored profile is replaced by `disease.symptoms`.
    pub fn upsert_disease(&self, disease: &Disease) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        let name_taken: Option<String> = tx
            .query_row(
                "SELECT id FROM diseases WHERE name = ? COLLATE NOCASE AND id <> ?",
                params![disease.name, disease.id],
                |row| row.get(0),
            )
            .optional()?;
        if name_taken.is_some() {
            return Err(DbError::Constraint(format!(
                "Disease name already exists: {}",
                disease.name
            )));
        }

        tx.execute(
            r#"
            INSERT INTO diseases (id, name, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                updated_at = excluded.updated_at
            "#,
            params![disease.id, disease.name, disease.description, chrono::Utc::now().to_rfc3339()],
        )?;

        tx.execute("DELETE FROM disease_symptoms WHERE disease_id = ?", [&disease.id])?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO disease_symptoms (disease_id, symptom_id) VALUES (?1, ?2)",
            )?;
            for symptom_id in &disease.symptoms {
                stmt.execute(params![disease.id, symptom_id])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get a disease with its profile.
    pub fn get_disease(&self, id: &str) -> DbResult<Option<Disease>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, description FROM diseases WHERE id = ?",
                [id],
                |row| {
                    Ok(Disease {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        symptoms: BTreeSet::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut disease) = row else {
            return Ok(None);
        };
        disease.symptoms = self.disease_symptoms(&disease.id)?;
        Ok(Some(disease))
    }

    /// Get a disease by exact name (case-insensitive).
    pub fn get_disease_by_name(&self, name: &str) -> DbResult<Option<Disease>> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM diseases WHERE name = ? COLLATE NOCASE",
                [name],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(id) => self.get_disease(&id),
            None => Ok(None),
        }
    }

    /// Symptom profile of a disease.
    pub fn disease_symptoms(&self, disease_id: &str) -> DbResult<BTreeSet<SymptomId>> {
        collect_ids(
            &self.conn,
            "SELECT symptom_id FROM disease_symptoms WHERE disease_id = ?",
            disease_id,
        )
    }

    /// List every disease with its profile, ordered by name.
    pub fn list_diseases(&self) -> DbResult<Vec<Disease>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM diseases ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Disease {
                id: row.get(0)?,
                name: row.get(1)?,
                description: row.get(2)?,
                symptoms: BTreeSet::new(),
            })
        })?;
        let mut diseases = rows.collect::<Result<Vec<_>, _>>()?;

        // One pass over the join table instead of a query per disease
        let mut profiles: BTreeMap<String, BTreeSet<SymptomId>> = BTreeMap::new();
        let mut stmt = self
            .conn
            .prepare("SELECT disease_id, symptom_id FROM disease_symptoms")?;
        let pairs = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for pair in pairs {
            let (disease_id, symptom_id) = pair?;
            profiles.entry(disease_id).or_default().insert(symptom_id);
        }

        for disease in &mut diseases {
            if let Some(profile) = profiles.remove(&disease.id) {
                disease.symptoms = profile;
            }
        }
        Ok(diseases)
    }

    /// Delete a disease (cascades to profile and consultation links).
    pub fn delete_disease(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM diseases WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

impl DiseaseCatalog for Database {
    type Error = DbError;

    fn diseases(&self) -> DbResult<Vec<Disease>> {
        self.list_diseases()
    }
}
