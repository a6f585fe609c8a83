//! Diagnosis suggestion for consultations.
//!
//! Pipeline: Presented symptoms → Profile matching → Ranking → Suspected-disease replacement
//!
//! The engine ([`suggest`]) is a pure function over an injected catalog snapshot.
//! [`DiagnosisService`] wraps it with the consultation store: it reads the
//! current presented symptoms, recomputes, and overwrites the suspected-disease
//! set with exactly the diseases that scored.

mod engine;
mod matcher;

pub use engine::*;
pub use matcher::*;

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::error::Error as StdError;

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Disease, DiseaseId, SuggestionResult, SymptomId};

/// Number of top suggestions written to the log.
pub const DEFAULT_LOG_TOP: usize = 5;

/// Diagnosis errors.
#[derive(Error, Debug)]
pub enum DiagnosisError {
    #[error("Store error: {0}")]
    Store(#[source] Box<dyn StdError + Send + Sync>),

    #[error("Consultation not found: {0}")]
    ConsultationNotFound(String),
}

impl DiagnosisError {
    fn store<E: StdError + Send + Sync + 'static>(e: E) -> Self {
        DiagnosisError::Store(Box::new(e))
    }
}

pub type DiagnosisResult<T> = Result<T, DiagnosisError>;

/// Read access to the disease knowledge base.
pub trait DiseaseCatalog {
    type Error: StdError + Send + Sync + 'static;

    /// Snapshot of every disease with its symptom profile.
    fn diseases(&self) -> Result<Vec<Disease>, Self::Error>;
}

impl DiseaseCatalog for [Disease] {
    type Error = Infallible;

    fn diseases(&self) -> Result<Vec<Disease>, Self::Error> {
        Ok(self.to_vec())
    }
}

impl DiseaseCatalog for Vec<Disease> {
    type Error = Infallible;

    fn diseases(&self) -> Result<Vec<Disease>, Self::Error> {
        Ok(self.clone())
    }
}

/// The consultation associations the service reads and rewrites.
pub trait ConsultationStore {
    type Error: StdError + Send + Sync + 'static;

    /// Presented symptoms, or `None` if the consultation does not exist.
    fn presented_symptoms(&self, consultation_id: &str) -> Result<Option<BTreeSet<SymptomId>>, Self::Error>;

    /// Overwrite the suspected-disease set.
    fn replace_suspected_diseases(
        &self,
        consultation_id: &str,
        disease_ids: &BTreeSet<DiseaseId>,
    ) -> Result<(), Self::Error>;

    /// Remove every suspected disease.
    fn clear_suspected_diseases(&self, consultation_id: &str) -> Result<(), Self::Error>;
}

/// Recompute-and-replace adapter between the engine and the consultation store.
pub struct DiagnosisService<'a, C: ?Sized, S: ?Sized> {
    catalog: &'a C,
    store: &'a S,
    log_top: usize,
}

impl<'a, C, S> DiagnosisService<'a, C, S>
where
    C: DiseaseCatalog + ?Sized,
    S: ConsultationStore + ?Sized,
{
    /// Create a new service.
    pub fn new(catalog: &'a C, store: &'a S) -> Self {
        Self {
            catalog,
            store,
            log_top: DEFAULT_LOG_TOP,
        }
    }

    /// Set how many top suggestions are logged per run.
    pub fn with_log_top(mut self, log_top: usize) -> Self {
        self.log_top = log_top;
        self
    }

    /// Rank diseases for an arbitrary symptom set without touching any consultation.
    pub fn suggest_for(&self, presented: &BTreeSet<SymptomId>) -> DiagnosisResult<SuggestionResult> {
        if presented.is_empty() {
            debug!("no presented symptoms, skipping catalog scan");
            return Ok(SuggestionResult::default());
        }

        let diseases = self.catalog.diseases().map_err(DiagnosisError::store)?;
        Ok(suggest(presented, &diseases))
    }

    /// Recompute suggestions for a consultation and replace its suspected diseases.
    ///
    /// The returned result carries the ranked order; the stored association is a set.
    pub fn recompute(&self, consultation_id: &str) -> DiagnosisResult<SuggestionResult> {
        let presented = self
            .store
            .presented_symptoms(consultation_id)
            .map_err(DiagnosisError::store)?
            .ok_or_else(|| DiagnosisError::ConsultationNotFound(consultation_id.to_string()))?;

        info!(
            consultation = consultation_id,
            symptoms = presented.len(),
            "computing diagnosis suggestions"
        );

        let result = self.suggest_for(&presented)?;

        if result.is_empty() {
            self.store
                .clear_suspected_diseases(consultation_id)
                .map_err(DiagnosisError::store)?;
            info!(consultation = consultation_id, "no matching diseases, suspicions cleared");
            return Ok(result);
        }

        let suspected: BTreeSet<DiseaseId> = result.disease_ids().into_iter().collect();
        self.store
            .replace_suspected_diseases(consultation_id, &suspected)
            .map_err(DiagnosisError::store)?;

        let top: Vec<&str> = result.disease_names().into_iter().take(self.log_top).collect();
        info!(
            consultation = consultation_id,
            candidates = result.len(),
            top = ?top,
            "suspected diseases replaced"
        );

        Ok(result)
    }
}
