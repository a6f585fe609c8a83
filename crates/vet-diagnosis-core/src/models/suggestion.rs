//! Diagnosis suggestion models.

use serde::{Deserialize, Serialize};

use super::{Disease, DiseaseId};

/// Breakdown of how a disease profile matched the presented symptoms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MatchBreakdown {
    /// Symptoms shared by the patient and the disease profile
    pub common: usize,
    /// Fraction of the disease profile the patient exhibits
    pub coverage: f64,
    /// Fraction of the patient's symptoms that belong to the profile
    pub precision: f64,
    /// Harmonic mean of coverage and precision (0.0 - 1.0)
    pub f1: f64,
}

impl MatchBreakdown {
    /// Weight of the F1 component.
    pub const F1_WEIGHT: f64 = 100.0;
    /// Bonus per shared symptom, separating equal F1 values.
    pub const COMMON_BONUS: f64 = 0.1;

    /// Final ranking score.
    pub fn score(&self) -> f64 {
        self.f1 * Self::F1_WEIGHT + self.common as f64 * Self::COMMON_BONUS
    }

    /// F1 as a whole percentage label, e.g. "72%".
    pub fn percentage(&self) -> String {
        format!("{:.0}%", self.f1 * 100.0)
    }
}

/// A disease that matched at least one presented symptom.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    /// The matched disease
    pub disease: Disease,
    /// Ranking score (always > 0)
    pub score: f64,
    /// How the score was obtained
    pub breakdown: MatchBreakdown,
}

impl ScoredCandidate {
    /// Display label for the score.
    pub fn percentage(&self) -> String {
        self.breakdown.percentage()
    }
}

/// Ranked suggestions, highest score first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SuggestionResult {
    pub candidates: Vec<ScoredCandidate>,
}

impl SuggestionResult {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Best candidate, if any.
    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }

    /// Disease IDs in ranked order.
    pub fn disease_ids(&self) -> Vec<DiseaseId> {
        self.candidates.iter().map(|c| c.disease.id.clone()).collect()
    }

    /// Disease names in ranked order.
    pub fn disease_names(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.disease.name.as_str()).collect()
    }

    /// Score for a disease, if it was suggested.
    pub fn score_of(&self, disease_id: &str) -> Option<f64> {
        self.candidates
            .iter()
            .find(|c| c.disease.id == disease_id)
            .map(|c| c.score)
    }
}
