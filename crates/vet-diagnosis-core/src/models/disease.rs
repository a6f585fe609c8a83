//! Disease knowledge base models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::SymptomId;

/// Opaque disease identifier.
pub type DiseaseId = String;

/// A disease together with its typical symptom profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Disease {
    /// Unique identifier
    pub id: DiseaseId,
    /// Display name (unique across the catalog)
    pub name: String,
    /// Etiology, general notes
    pub description: Option<String>,
    /// Symptoms commonly associated with this disease
    pub symptoms: BTreeSet<SymptomId>,
}

impl Disease {
    /// Create a new disease with an empty profile.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description: None,
            symptoms: BTreeSet::new(),
        }
    }

    /// Builder-style helper to attach a symptom profile.
    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SymptomId>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    /// A disease without a profile can never be matched.
    pub fn is_inert(&self) -> bool {
        self.symptoms.is_empty()
    }

    /// Number of profile symptoms also present in `presented`.
    pub fn common_symptom_count(&self, presented: &BTreeSet<SymptomId>) -> usize {
        // Iterate the smaller set
        if presented.len() < self.symptoms.len() {
            presented.iter().filter(|s| self.symptoms.contains(*s)).count()
        } else {
            self.symptoms.iter().filter(|s| presented.contains(*s)).count()
        }
    }
}
