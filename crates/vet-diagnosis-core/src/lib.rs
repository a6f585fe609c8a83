//! Vet Diagnosis Core Library
//!
//! Diagnosis suggestions for veterinary consultations, ranked by how well each
//! disease's typical symptom profile matches the symptoms a patient presents.
//!
//! # Architecture
//!
//! ```text
//! Vet records presented symptoms (ids or free-text names)
//!                     │
//!          [SymptomMatcher: names → symptom ids]
//!                     │
//!             Consultation saved
//!                     │
//!     ┌───────────────▼───────────────┐
//!     │      Suggestion Engine        │
//!     │  f1 = 2·cov·prec/(cov+prec)   │
//!     │  score = f1·100 + common·0.1  │
//!     └───────────────┬───────────────┘
//!                     │
//!     Suspected diseases replaced (exact scored set)
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//!   Ranked view              Suggestion report
//!   (FFI / UI)               (JSON / CSV)
//! ```
//!
//! # Core Principle
//!
//! **Suggestions never confirm anything.** Suspected diseases are recomputed
//! from scratch on every change; definitive diagnoses belong to the vet.
//!
//! # Modules
//!
//! - [`db`]: SQLite store with FTS5 symptom search
//! - [`models`]: Domain types (Symptom, Disease, Patient, Consultation, etc.)
//! - [`diagnosis`]: Scoring engine, symptom matcher and the recompute service
//! - [`export`]: Suggestion report export
//! - [`config`], [`logging`], [`seed`]: Configuration, tracing setup, reference catalog

pub mod config;
pub mod db;
pub mod diagnosis;
pub mod export;
pub mod logging;
pub mod models;
pub mod seed;

// Re-export commonly used types
pub use config::CoreConfig;
pub use db::Database;
pub use diagnosis::{suggest, DiagnosisService, DiseaseCatalog, ConsultationStore, SymptomMatcher};
pub use export::SuggestionReport;
pub use models::{
    Consultation, ConsultationKind, Disease, MatchBreakdown, Patient, PatientStatus,
    ScoredCandidate, Sex, Species, SuggestionResult, Symptom, Veterinarian,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum VetDiagnosisError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<db::DbError> for VetDiagnosisError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => VetDiagnosisError::NotFound(what),
            other => VetDiagnosisError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for VetDiagnosisError {
    fn from(e: serde_json::Error) -> Self {
        VetDiagnosisError::SerializationError(e.to_string())
    }
}

impl From<diagnosis::DiagnosisError> for VetDiagnosisError {
    fn from(e: diagnosis::DiagnosisError) -> Self {
        match e {
            diagnosis::DiagnosisError::ConsultationNotFound(id) => {
                VetDiagnosisError::NotFound(format!("consultation {}", id))
            }
            other => VetDiagnosisError::DatabaseError(other.to_string()),
        }
    }
}

impl From<config::ConfigError> for VetDiagnosisError {
    fn from(e: config::ConfigError) -> Self {
        VetDiagnosisError::ConfigError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for VetDiagnosisError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        VetDiagnosisError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<VetDiagnosisCore>, VetDiagnosisError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(VetDiagnosisCore::new(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<VetDiagnosisCore>, VetDiagnosisError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(VetDiagnosisCore::new(db)))
}

/// Open the database described by a TOML config file.
///
/// Installs logging at the configured level and seeds the reference catalog
/// when enabled.
#[uniffi::export]
pub fn open_with_config(config_path: String) -> Result<Arc<VetDiagnosisCore>, VetDiagnosisError> {
    let config = CoreConfig::load(&config_path)?;
    Ok(Arc::new(VetDiagnosisCore::from_config(&config)?))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct VetDiagnosisCore {
    db: Arc<Mutex<Database>>,
    log_top: usize,
}

impl VetDiagnosisCore {
    /// Wrap an open database.
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            log_top: diagnosis::DEFAULT_LOG_TOP,
        }
    }

    /// Build from an already loaded configuration.
    pub fn from_config(config: &CoreConfig) -> Result<Self, VetDiagnosisError> {
        logging::init_logging(&config.logging.level);

        let db = if config.database.is_in_memory() {
            Database::open_in_memory()?
        } else {
            Database::open(&config.database.path)?
        };

        if config.database.seed_reference_catalog {
            seed::seed_reference_catalog(&db)?;
        }

        info!(path = %config.database.path, "diagnosis core ready");
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            log_top: config.suggestions.log_top,
        })
    }

    /// Recompute suggestions for a stored consultation and build its view.
    fn recompute_view(&self, db: &Database, consultation_id: &str) -> Result<FfiConsultation, VetDiagnosisError> {
        let service = DiagnosisService::new(db, db).with_log_top(self.log_top);
        let result = service.recompute(consultation_id)?;

        let consultation = db
            .get_consultation(consultation_id)?
            .ok_or_else(|| VetDiagnosisError::NotFound(format!("consultation {}", consultation_id)))?;

        Ok(FfiConsultation::from_parts(consultation, result))
    }
}

#[uniffi::export]
impl VetDiagnosisCore {
    // =========================================================================
    // Symptom Operations
    // =========================================================================

    /// Add a symptom to the catalog.
    pub fn add_symptom(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<FfiSymptom, VetDiagnosisError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(VetDiagnosisError::InvalidInput("symptom name is empty".into()));
        }

        let db = self.db.lock()?;
        let mut symptom = Symptom::new(name);
        symptom.description = description;
        db.insert_symptom(&symptom)?;
        Ok(symptom.into())
    }

    /// List all symptoms.
    pub fn list_symptoms(&self) -> Result<Vec<FfiSymptom>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let symptoms = db.list_symptoms()?;
        Ok(symptoms.into_iter().map(|s| s.into()).collect())
    }

    /// Search symptoms by name/description.
    pub fn search_symptoms(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiSymptom>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let symptoms = db.search_symptoms(&query, limit as usize)?;
        Ok(symptoms.into_iter().map(|s| s.into()).collect())
    }

    /// Resolve free-text names to catalog symptoms.
    pub fn resolve_symptom_names(
        &self,
        names: Vec<String>,
    ) -> Result<FfiSymptomResolution, VetDiagnosisError> {
        let db = self.db.lock()?;
        let matcher = SymptomMatcher::new(db.list_symptoms()?);
        Ok(matcher.resolve_all(&names).into())
    }

    // =========================================================================
    // Disease Operations
    // =========================================================================

    /// Add or update a disease and its symptom profile.
    pub fn upsert_disease(&self, disease: FfiDisease) -> Result<(), VetDiagnosisError> {
        let db = self.db.lock()?;
        let disease: Disease = disease.into();
        db.upsert_disease(&disease)?;
        Ok(())
    }

    /// Get a disease by ID.
    pub fn get_disease(&self, id: String) -> Result<Option<FfiDisease>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let disease = db.get_disease(&id)?;
        Ok(disease.map(|d| d.into()))
    }

    /// List every disease with its profile.
    pub fn list_diseases(&self) -> Result<Vec<FfiDisease>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let diseases = db.list_diseases()?;
        Ok(diseases.into_iter().map(|d| d.into()).collect())
    }

    /// Install the built-in reference catalog (idempotent).
    pub fn seed_reference_catalog(&self) -> Result<FfiSeedStats, VetDiagnosisError> {
        let db = self.db.lock()?;
        let stats = seed::seed_reference_catalog(&db)?;
        Ok(stats.into())
    }

    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Create a new patient.
    pub fn create_patient(
        &self,
        name: String,
        species: String,
    ) -> Result<FfiPatient, VetDiagnosisError> {
        let species = Species::parse(&species)
            .ok_or_else(|| VetDiagnosisError::InvalidInput(format!("unknown species: {}", species)))?;

        let db = self.db.lock()?;
        let patient = Patient::new(name, species);
        db.insert_patient(&patient)?;
        Ok(patient.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let patient = db.get_patient(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Search patients by name.
    pub fn search_patients(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatient>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let patients = db.search_patients(&query, limit as usize)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Register a veterinarian.
    pub fn add_veterinarian(
        &self,
        full_name: String,
        crmv: Option<String>,
    ) -> Result<FfiVeterinarian, VetDiagnosisError> {
        let db = self.db.lock()?;
        let mut vet = Veterinarian::new(full_name);
        vet.crmv = crmv;
        db.insert_veterinarian(&vet)?;
        Ok(vet.into())
    }

    /// List veterinarians.
    pub fn list_veterinarians(&self) -> Result<Vec<FfiVeterinarian>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let vets = db.list_veterinarians()?;
        Ok(vets.into_iter().map(|v| v.into()).collect())
    }

    // =========================================================================
    // Consultation Operations
    // =========================================================================

    /// Open a consultation with its presented symptoms and compute suggestions.
    pub fn create_consultation(
        &self,
        patient_id: String,
        veterinarian_id: Option<String>,
        kind: Option<String>,
        chief_complaint: Option<String>,
        symptom_ids: Vec<String>,
    ) -> Result<FfiConsultation, VetDiagnosisError> {
        let kind = match kind {
            Some(k) => ConsultationKind::parse(&k)
                .ok_or_else(|| VetDiagnosisError::InvalidInput(format!("unknown consultation kind: {}", k)))?,
            None => ConsultationKind::default(),
        };

        let db = self.db.lock()?;
        if db.get_patient(&patient_id)?.is_none() {
            return Err(VetDiagnosisError::NotFound(format!("patient {}", patient_id)));
        }

        let mut consultation = Consultation::new(patient_id);
        consultation.veterinarian_id = veterinarian_id;
        consultation.kind = kind;
        consultation.chief_complaint = chief_complaint;
        consultation.presented_symptoms = symptom_ids.into_iter().collect();
        db.insert_consultation(&consultation)?;

        self.recompute_view(&db, &consultation.id)
    }

    /// Replace the presented symptoms and recompute suggestions.
    pub fn update_consultation_symptoms(
        &self,
        consultation_id: String,
        symptom_ids: Vec<String>,
    ) -> Result<FfiConsultation, VetDiagnosisError> {
        let db = self.db.lock()?;
        let symptoms: BTreeSet<String> = symptom_ids.into_iter().collect();
        db.set_presented_symptoms(&consultation_id, &symptoms)?;
        self.recompute_view(&db, &consultation_id)
    }

    /// Record presented symptoms given as free-text names.
    ///
    /// Names that match nothing in the catalog are returned, not stored.
    pub fn record_symptoms_by_name(
        &self,
        consultation_id: String,
        names: Vec<String>,
    ) -> Result<FfiRecordedSymptoms, VetDiagnosisError> {
        let db = self.db.lock()?;
        let matcher = SymptomMatcher::new(db.list_symptoms()?);
        let resolution = matcher.resolve_all(&names);

        if !resolution.unresolved.is_empty() {
            warn!(
                consultation = %consultation_id,
                unresolved = ?resolution.unresolved,
                "some symptom names did not match the catalog"
            );
        }

        let symptoms: BTreeSet<String> = resolution
            .matched
            .iter()
            .map(|m| m.symptom.id.clone())
            .collect();
        db.set_presented_symptoms(&consultation_id, &symptoms)?;

        Ok(FfiRecordedSymptoms {
            consultation: self.recompute_view(&db, &consultation_id)?,
            unresolved: resolution.unresolved,
        })
    }

    /// Get a consultation with freshly recomputed suggestions.
    pub fn get_consultation(
        &self,
        consultation_id: String,
    ) -> Result<Option<FfiConsultation>, VetDiagnosisError> {
        let db = self.db.lock()?;
        match self.recompute_view(&db, &consultation_id) {
            Ok(view) => Ok(Some(view)),
            Err(VetDiagnosisError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Record the diagnoses confirmed by the veterinarian.
    pub fn set_definitive_diagnoses(
        &self,
        consultation_id: String,
        disease_ids: Vec<String>,
    ) -> Result<(), VetDiagnosisError> {
        let db = self.db.lock()?;
        let diseases: BTreeSet<String> = disease_ids.into_iter().collect();
        db.set_definitive_diagnoses(&consultation_id, &diseases)?;
        Ok(())
    }

    // =========================================================================
    // Suggestion Operations
    // =========================================================================

    /// Rank diseases for a symptom set without touching any consultation.
    pub fn suggest_for_symptoms(
        &self,
        symptom_ids: Vec<String>,
    ) -> Result<Vec<FfiScoredDisease>, VetDiagnosisError> {
        let db = self.db.lock()?;
        let presented: BTreeSet<String> = symptom_ids.into_iter().collect();
        let service = DiagnosisService::new(&*db, &*db).with_log_top(self.log_top);
        let result = service.suggest_for(&presented)?;
        Ok(result.candidates.into_iter().map(|c| c.into()).collect())
    }

    /// Recompute a consultation and export its ranked suggestions as JSON.
    pub fn export_suggestion_report_json(
        &self,
        consultation_id: String,
    ) -> Result<String, VetDiagnosisError> {
        let db = self.db.lock()?;
        let service = DiagnosisService::new(&*db, &*db).with_log_top(self.log_top);
        let result = service.recompute(&consultation_id)?;
        let report = SuggestionReport::from_result(&consultation_id, &result);
        Ok(report.to_json()?)
    }

    /// Recompute a consultation and export its ranked suggestions as CSV.
    pub fn export_suggestion_report_csv(
        &self,
        consultation_id: String,
    ) -> Result<String, VetDiagnosisError> {
        let db = self.db.lock()?;
        let service = DiagnosisService::new(&*db, &*db).with_log_top(self.log_top);
        let result = service.recompute(&consultation_id)?;
        Ok(SuggestionReport::from_result(&consultation_id, &result).to_csv())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe symptom.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSymptom {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<Symptom> for FfiSymptom {
    fn from(symptom: Symptom) -> Self {
        Self {
            id: symptom.id,
            name: symptom.name,
            description: symptom.description,
        }
    }
}

/// FFI-safe disease with its symptom profile.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDisease {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub symptom_ids: Vec<String>,
}

impl From<Disease> for FfiDisease {
    fn from(disease: Disease) -> Self {
        Self {
            id: disease.id,
            name: disease.name,
            description: disease.description,
            symptom_ids: disease.symptoms.into_iter().collect(),
        }
    }
}

impl From<FfiDisease> for Disease {
    fn from(disease: FfiDisease) -> Self {
        Disease {
            id: disease.id,
            name: disease.name,
            description: disease.description,
            symptoms: disease.symptom_ids.into_iter().collect(),
        }
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub sex: Option<String>,
    pub weight_kg: Option<f64>,
    pub tutor_name: Option<String>,
    pub status: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            species: patient.species.as_str().to_string(),
            breed: patient.breed,
            sex: patient.sex.map(|s| s.as_str().to_string()),
            weight_kg: patient.weight_kg,
            tutor_name: patient.tutor_name,
            status: patient.status.as_str().to_string(),
        }
    }
}

/// FFI-safe veterinarian.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVeterinarian {
    pub id: String,
    pub full_name: String,
    pub crmv: Option<String>,
}

impl From<Veterinarian> for FfiVeterinarian {
    fn from(vet: Veterinarian) -> Self {
        Self {
            id: vet.id,
            full_name: vet.full_name,
            crmv: vet.crmv,
        }
    }
}

/// FFI-safe ranked suggestion.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiScoredDisease {
    pub disease_id: String,
    pub name: String,
    pub score: f64,
    /// F1 as a whole percentage, e.g. "72%"
    pub percentage: String,
    pub common_symptoms: u32,
}

impl From<ScoredCandidate> for FfiScoredDisease {
    fn from(candidate: ScoredCandidate) -> Self {
        Self {
            percentage: candidate.percentage(),
            common_symptoms: candidate.breakdown.common as u32,
            disease_id: candidate.disease.id,
            name: candidate.disease.name,
            score: candidate.score,
        }
    }
}

/// FFI-safe consultation with its ranked suggestions.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConsultation {
    pub id: String,
    pub patient_id: String,
    pub veterinarian_id: Option<String>,
    pub scheduled_at: String,
    pub kind: String,
    pub chief_complaint: Option<String>,
    pub treatment: Option<String>,
    pub presented_symptom_ids: Vec<String>,
    /// Stored suspected set (unordered)
    pub suspected_disease_ids: Vec<String>,
    pub definitive_diagnosis_ids: Vec<String>,
    /// Same diseases as `suspected_disease_ids`, highest score first
    pub suggestions: Vec<FfiScoredDisease>,
}

impl FfiConsultation {
    fn from_parts(consultation: Consultation, result: SuggestionResult) -> Self {
        Self {
            id: consultation.id,
            patient_id: consultation.patient_id,
            veterinarian_id: consultation.veterinarian_id,
            scheduled_at: consultation.scheduled_at,
            kind: consultation.kind.as_str().to_string(),
            chief_complaint: consultation.chief_complaint,
            treatment: consultation.treatment,
            presented_symptom_ids: consultation.presented_symptoms.into_iter().collect(),
            suspected_disease_ids: consultation.suspected_diseases.into_iter().collect(),
            definitive_diagnosis_ids: consultation.definitive_diagnoses.into_iter().collect(),
            suggestions: result.candidates.into_iter().map(|c| c.into()).collect(),
        }
    }
}

/// FFI-safe outcome of recording symptoms by name.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecordedSymptoms {
    pub consultation: FfiConsultation,
    /// Names that matched no catalog symptom
    pub unresolved: Vec<String>,
}

/// FFI-safe single name resolution.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSymptomMatch {
    pub input: String,
    pub symptom: FfiSymptom,
    /// "exact", "synonym" or "fuzzy"
    pub kind: String,
    pub similarity: f64,
}

impl From<diagnosis::SymptomMatch> for FfiSymptomMatch {
    fn from(m: diagnosis::SymptomMatch) -> Self {
        let (kind, similarity) = match m.kind {
            diagnosis::MatchKind::Exact => ("exact", 1.0),
            diagnosis::MatchKind::Synonym => ("synonym", 1.0),
            diagnosis::MatchKind::Fuzzy { similarity } => ("fuzzy", similarity),
        };
        Self {
            input: m.input,
            symptom: m.symptom.into(),
            kind: kind.to_string(),
            similarity,
        }
    }
}

/// FFI-safe batch name resolution.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSymptomResolution {
    pub matched: Vec<FfiSymptomMatch>,
    pub unresolved: Vec<String>,
}

impl From<diagnosis::SymptomResolution> for FfiSymptomResolution {
    fn from(resolution: diagnosis::SymptomResolution) -> Self {
        Self {
            matched: resolution.matched.into_iter().map(|m| m.into()).collect(),
            unresolved: resolution.unresolved,
        }
    }
}

/// FFI-safe seeding outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSeedStats {
    pub symptoms_added: u32,
    pub diseases_added: u32,
}

impl From<seed::SeedStats> for FfiSeedStats {
    fn from(stats: seed::SeedStats) -> Self {
        Self {
            symptoms_added: stats.symptoms_added as u32,
            diseases_added: stats.diseases_added as u32,
        }
    }
}
