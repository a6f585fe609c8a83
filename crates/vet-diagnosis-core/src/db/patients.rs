//! Patient and veterinarian database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Patient, PatientStatus, Sex, Species, Veterinarian};

const PATIENT_COLUMNS: &str = r#"
    id, name, species, breed, sex, date_of_birth, weight_kg,
    microchip, tutor_name, known_allergies, status, created_at, updated_at
"#;

impl Database {
    /// Insert a new patient.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO patients ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                PATIENT_COLUMNS
            ),
            params![
                patient.id,
                patient.name,
                patient.species.as_str(),
                patient.breed,
                patient.sex.map(|s| s.as_str()),
                patient.date_of_birth,
                patient.weight_kg,
                patient.microchip,
                patient.tutor_name,
                patient.known_allergies,
                patient.status.as_str(),
                patient.created_at,
                patient.updated_at,
            ],
        )?;
        Ok(())
    }

    /// Update an existing patient.
    pub fn update_patient(&self, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                name = ?2,
                species = ?3,
                breed = ?4,
                sex = ?5,
                date_of_birth = ?6,
                weight_kg = ?7,
                microchip = ?8,
                tutor_name = ?9,
                known_allergies = ?10,
                status = ?11,
                updated_at = ?12
            WHERE id = ?1
            "#,
            params![
                patient.id,
                patient.name,
                patient.species.as_str(),
                patient.breed,
                patient.sex.map(|s| s.as_str()),
                patient.date_of_birth,
                patient.weight_kg,
                patient.microchip,
                patient.tutor_name,
                patient.known_allergies,
                patient.status.as_str(),
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: &str) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM patients WHERE id = ?", PATIENT_COLUMNS),
                [id],
                patient_row,
            )
            .optional()?
            .map(TryInto::try_into)
            .transpose()
    }

    /// Search patients by name (prefix match).
    pub fn search_patients(&self, query: &str, limit: usize) -> DbResult<Vec<Patient>> {
        let pattern = format!("{}%", query);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM patients WHERE name LIKE ? ORDER BY name LIMIT ?",
            PATIENT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![pattern, limit as i64], patient_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// List all patients.
    pub fn list_patients(&self) -> DbResult<Vec<Patient>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM patients ORDER BY name", PATIENT_COLUMNS))?;

        let rows = stmt.query_map([], patient_row)?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?.try_into()?);
        }
        Ok(patients)
    }

    /// Delete a patient (cascades to their consultations).
    pub fn delete_patient(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn.execute("DELETE FROM patients WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }

    /// Insert a veterinarian.
    pub fn insert_veterinarian(&self, vet: &Veterinarian) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO veterinarians (id, full_name, crmv) VALUES (?1, ?2, ?3)",
            params![vet.id, vet.full_name, vet.crmv],
        )?;
        Ok(())
    }

    /// Get a veterinarian by ID.
    pub fn get_veterinarian(&self, id: &str) -> DbResult<Option<Veterinarian>> {
        self.conn
            .query_row(
                "SELECT id, full_name, crmv FROM veterinarians WHERE id = ?",
                [id],
                |row| {
                    Ok(Veterinarian {
                        id: row.get(0)?,
                        full_name: row.get(1)?,
                        crmv: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// List veterinarians ordered by name.
    pub fn list_veterinarians(&self) -> DbResult<Vec<Veterinarian>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, full_name, crmv FROM veterinarians ORDER BY full_name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Veterinarian {
                id: row.get(0)?,
                full_name: row.get(1)?,
                crmv: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    name: String,
    species: String,
    breed: Option<String>,
    sex: Option<String>,
    date_of_birth: Option<String>,
    weight_kg: Option<f64>,
    microchip: Option<String>,
    tutor_name: Option<String>,
    known_allergies: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

fn patient_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatientRow> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        species: row.get(2)?,
        breed: row.get(3)?,
        sex: row.get(4)?,
        date_of_birth: row.get(5)?,
        weight_kg: row.get(6)?,
        microchip: row.get(7)?,
        tutor_name: row.get(8)?,
        known_allergies: row.get(9)?,
        status: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

impl TryFrom<PatientRow> for Patient {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let species = Species::parse(&row.species)
            .ok_or_else(|| DbError::Constraint(format!("Unknown species: {}", row.species)))?;
        let sex = row
            .sex
            .map(|s| Sex::parse(&s).ok_or_else(|| DbError::Constraint(format!("Unknown sex: {}", s))))
            .transpose()?;
        let status = PatientStatus::parse(&row.status)
            .ok_or_else(|| DbError::Constraint(format!("Unknown patient status: {}", row.status)))?;

        Ok(Patient {
            id: row.id,
            name: row.name,
            species,
            breed: row.breed,
            sex,
            date_of_birth: row.date_of_birth,
            weight_kg: row.weight_kg,
            microchip: row.microchip,
            tutor_name: row.tutor_name,
            known_allergies: row.known_allergies,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_and_get() {
        let db = setup_db();

        let mut patient = Patient::new("Max".into(), Species::Canine);
        patient.breed = Some("Golden Retriever".into());
        patient.sex = Some(Sex::NeuteredMale);
        patient.weight_kg = Some(30.0);

        db.insert_patient(&patient).unwrap();

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Max");
        assert_eq!(retrieved.species, Species::Canine);
        assert_eq!(retrieved.breed, Some("Golden Retriever".into()));
        assert_eq!(retrieved.sex, Some(Sex::NeuteredMale));
        assert_eq!(retrieved.weight_kg, Some(30.0));
    }

    #[test]
    fn test_update_patient() {
        let db = setup_db();

        let mut patient = Patient::new("Max".into(), Species::Canine);
        db.insert_patient(&patient).unwrap();

        patient.weight_kg = Some(32.0);
        patient.status = PatientStatus::Transferred;
        assert!(db.update_patient(&patient).unwrap());

        let retrieved = db.get_patient(&patient.id).unwrap().unwrap();
        assert_eq!(retrieved.weight_kg, Some(32.0));
        assert_eq!(retrieved.status, PatientStatus::Transferred);
    }

    #[test]
    fn test_search_patients() {
        let db = setup_db();

        db.insert_patient(&Patient::new("Max".into(), Species::Canine)).unwrap();
        db.insert_patient(&Patient::new("Maxine".into(), Species::Feline)).unwrap();
        db.insert_patient(&Patient::new("Luna".into(), Species::Canine)).unwrap();

        let results = db.search_patients("Max", 10).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|p| p.name == "Max"));
        assert!(results.iter().any(|p| p.name == "Maxine"));

        assert_eq!(db.list_patients().unwrap().len(), 3);
    }

    #[test]
    fn test_microchip_unique() {
        let db = setup_db();

        let mut first = Patient::new("Max".into(), Species::Canine);
        first.microchip = Some("985112000123456".into());
        db.insert_patient(&first).unwrap();

        let mut second = Patient::new("Rex".into(), Species::Canine);
        second.microchip = first.microchip.clone();
        assert!(db.insert_patient(&second).is_err());
    }

    #[test]
    fn test_veterinarians() {
        let db = setup_db();

        let mut vet = Veterinarian::new("Dr. Ana Souza".into());
        vet.crmv = Some("SP-12345".into());
        db.insert_veterinarian(&vet).unwrap();

        assert_eq!(db.get_veterinarian(&vet.id).unwrap(), Some(vet.clone()));

        let mut duplicate = Veterinarian::new("Dr. Other".into());
        duplicate.crmv = vet.crmv.clone();
        assert!(db.insert_veterinarian(&duplicate).is_err());

        assert_eq!(db.list_veterinarians().unwrap().len(), 1);
    }
}
