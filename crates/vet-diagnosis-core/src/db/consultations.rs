//! Consultation database operations and their symptom/disease associations.

use std::collections::BTreeSet;

use rusqlite::{params, OptionalExtension};

use super::{collect_ids, Database, DbError, DbResult};
use crate::diagnosis::ConsultationStore;
use crate::models::{Consultation, ConsultationKind, DiseaseId, SymptomId};

const CONSULTATION_COLUMNS: &str = r#"
    id, patient_id, veterinarian_id, scheduled_at, kind,
    chief_complaint, treatment, created_at, updated_at
"#;

impl Database {
    /// Insert a consultation together with its presented symptoms and definitive diagnoses.
    ///
    /// Suspected diseases are not written here; they are produced by a recompute.
    pub fn insert_consultation(&self, consultation: &Consultation) -> DbResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO consultations ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                CONSULTATION_COLUMNS
            ),
            params![
                consultation.id,
                consultation.patient_id,
                consultation.veterinarian_id,
                consultation.scheduled_at,
                consultation.kind.as_str(),
                consultation.chief_complaint,
                consultation.treatment,
                consultation.created_at,
                consultation.updated_at,
            ],
        )?;
        write_links(
            &tx,
            "consultation_symptoms",
            "symptom_id",
            &consultation.id,
            &consultation.presented_symptoms,
        )?;
        write_links(
            &tx,
            "consultation_definitive_diagnoses",
            "disease_id",
            &consultation.id,
            &consultation.definitive_diagnoses,
        )?;

        tx.commit()?;
        Ok(())
    }

    /// Update the scalar fields of a consultation. Associations are left alone.
    pub fn update_consultation(&self, consultation: &Consultation) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE consultations SET
                veterinarian_id = ?2,
                scheduled_at = ?3,
                kind = ?4,
                chief_complaint = ?5,
                treatment = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                consultation.id,
                consultation.veterinarian_id,
                consultation.scheduled_at,
                consultation.kind.as_str(),
                consultation.chief_complaint,
                consultation.treatment,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a consultation with all three associations loaded.
    pub fn get_consultation(&self, id: &str) -> DbResult<Option<Consultation>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {} FROM consultations WHERE id = ?", CONSULTATION_COLUMNS),
                [id],
                consultation_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(self.load_consultation(row)?)),
            None => Ok(None),
        }
    }

    /// List consultations for a patient, most recent first.
    pub fn list_consultations_for_patient(&self, patient_id: &str) -> DbResult<Vec<Consultation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM consultations WHERE patient_id = ? ORDER BY scheduled_at DESC",
            CONSULTATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map([patient_id], consultation_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(|row| self.load_consultation(row)).collect()
    }

    /// Delete a consultation (cascades to its associations).
    pub fn delete_consultation(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM consultations WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Replace the presented symptoms of a consultation.
    pub fn set_presented_symptoms(
        &self,
        consultation_id: &str,
        symptom_ids: &BTreeSet<SymptomId>,
    ) -> DbResult<()> {
        self.replace_links(
            "consultation_symptoms",
            "symptom_id",
            consultation_id,
            symptom_ids,
            true,
        )
    }

    /// Presented symptoms of a consultation.
    pub fn consultation_symptoms(&self, consultation_id: &str) -> DbResult<BTreeSet<SymptomId>> {
        collect_ids(
            &self.conn,
            "SELECT symptom_id FROM consultation_symptoms WHERE consultation_id = ?",
            consultation_id,
        )
    }

    /// Current suspected diseases of a consultation.
    pub fn suspected_diseases(&self, consultation_id: &str) -> DbResult<BTreeSet<DiseaseId>> {
        collect_ids(
            &self.conn,
            "SELECT disease_id FROM consultation_suspected_diseases WHERE consultation_id = ?",
            consultation_id,
        )
    }

    /// Replace the definitive diagnoses of a consultation.
    pub fn set_definitive_diagnoses(
        &self,
        consultation_id: &str,
        disease_ids: &BTreeSet<DiseaseId>,
    ) -> DbResult<()> {
        self.replace_links(
            "consultation_definitive_diagnoses",
            "disease_id",
            consultation_id,
            disease_ids,
            true,
        )
    }

    /// Definitive diagnoses of a consultation.
    pub fn definitive_diagnoses(&self, consultation_id: &str) -> DbResult<BTreeSet<DiseaseId>> {
        collect_ids(
            &self.conn,
            "SELECT disease_id FROM consultation_definitive_diagnoses WHERE consultation_id = ?",
            consultation_id,
        )
    }

    fn consultation_exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row("SELECT 1 FROM consultations WHERE id = ?", [id], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    /// Rewrite one association table for a consultation in a single transaction.
    ///
    /// `touch` bumps `updated_at`; engine-owned rewrites leave it alone.
    fn replace_links(
        &self,
        table: &str,
        column: &str,
        consultation_id: &str,
        ids: &BTreeSet<String>,
        touch: bool,
    ) -> DbResult<()> {
        if !self.consultation_exists(consultation_id)? {
            return Err(DbError::NotFound(format!("consultation {}", consultation_id)));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            &format!("DELETE FROM {} WHERE consultation_id = ?", table),
            [consultation_id],
        )?;
        write_links(&tx, table, column, consultation_id, ids)?;
        if touch {
            tx.execute(
                "UPDATE consultations SET updated_at = ?2 WHERE id = ?1",
                params![consultation_id, chrono::Utc::now().to_rfc3339()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn load_consultation(&self, row: ConsultationRow) -> DbResult<Consultation> {
        let kind = ConsultationKind::parse(&row.kind)
            .ok_or_else(|| DbError::Constraint(format!("Unknown consultation kind: {}", row.kind)))?;

        Ok(Consultation {
            presented_symptoms: self.consultation_symptoms(&row.id)?,
            suspected_diseases: self.suspected_diseases(&row.id)?,
            definitive_diagnoses: self.definitive_diagnoses(&row.id)?,
            id: row.id,
            patient_id: row.patient_id,
            veterinarian_id: row.veterinarian_id,
            scheduled_at: row.scheduled_at,
            kind,
            chief_complaint: row.chief_complaint,
            treatment: row.treatment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl ConsultationStore for Database {
    type Error = DbError;

    fn presented_symptoms(&self, consultation_id: &str) -> DbResult<Option<BTreeSet<SymptomId>>> {
        if !self.consultation_exists(consultation_id)? {
            return Ok(None);
        }
        self.consultation_symptoms(consultation_id).map(Some)
    }

    fn replace_suspected_diseases(
        &self,
        consultation_id: &str,
        disease_ids: &BTreeSet<DiseaseId>,
    ) -> DbResult<()> {
        self.replace_links(
            "consultation_suspected_diseases",
            "disease_id",
            consultation_id,
            disease_ids,
            false,
        )
    }

    fn clear_suspected_diseases(&self, consultation_id: &str) -> DbResult<()> {
        self.replace_links(
            "consultation_suspected_diseases",
            "disease_id",
            consultation_id,
            &BTreeSet::new(),
            false,
        )
    }
}

struct ConsultationRow {
    id: String,
    patient_id: String,
    veterinarian_id: Option<String>,
    scheduled_at: String,
    kind: String,
    chief_complaint: Option<String>,
    treatment: Option<String>,
    created_at: String,
    updated_at: String,
}

fn consultation_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ConsultationRow> {
    Ok(ConsultationRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        veterinarian_id: row.get(2)?,
        scheduled_at: row.get(3)?,
        kind: row.get(4)?,
        chief_complaint: row.get(5)?,
        treatment: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn write_links(
    conn: &rusqlite::Connection,
    table: &str,
    column: &str,
    consultation_id: &str,
    ids: &BTreeSet<String>,
) -> DbResult<()> {
    let mut stmt = conn.prepare_cached(&format!(
        "INSERT INTO {} (consultation_id, {}) VALUES (?1, ?2)",
        table, column
    ))?;
    for id in ids {
        stmt.execute(params![consultation_id, id])?;
    }
    Ok(())
}
