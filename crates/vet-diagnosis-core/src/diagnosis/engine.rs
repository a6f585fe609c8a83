//! Symptom-profile matching and ranking.
//!
//! Each disease is scored by the harmonic mean (F1) of:
//! - coverage: share of the disease profile the patient exhibits
//! - precision: share of the patient's symptoms that belong to the profile
//!
//! `score = f1 * 100 + common * 0.1`, where the small bonus separates diseases
//! with identical F1 by the absolute number of shared symptoms.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{Disease, MatchBreakdown, ScoredCandidate, SuggestionResult, SymptomId};

/// Rank the diseases of `catalog` against the presented symptoms.
///
/// Returns an empty result when no symptom is presented or nothing overlaps.
/// Diseases with an empty profile are skipped.
pub fn suggest<'a, I>(presented: &BTreeSet<SymptomId>, catalog: I) -> SuggestionResult
where
    I: IntoIterator<Item = &'a Disease>,
{
    if presented.is_empty() {
        return SuggestionResult::default();
    }

    let mut candidates: Vec<ScoredCandidate> = catalog
        .into_iter()
        .filter_map(|disease| {
            let breakdown = score_disease(disease, presented)?;
            let score = breakdown.score();
            debug!(
                disease = %disease.name,
                common = breakdown.common,
                coverage = breakdown.coverage,
                precision = breakdown.precision,
                score,
                "scored disease"
            );
            Some(ScoredCandidate {
                disease: disease.clone(),
                score,
                breakdown,
            })
        })
        .collect();

    rank(&mut candidates);

    SuggestionResult { candidates }
}

/// Match a single disease profile against the presented symptoms.
///
/// `None` when the profile is empty or shares nothing with `presented`.
pub fn score_disease(disease: &Disease, presented: &BTreeSet<SymptomId>) -> Option<MatchBreakdown> {
    if disease.is_inert() || presented.is_empty() {
        return None;
    }

    let common = disease.common_symptom_count(presented);
    if common == 0 {
        return None;
    }

    let coverage = common as f64 / disease.symptoms.len() as f64;
    let precision = common as f64 / presented.len() as f64;

    Some(MatchBreakdown {
        common,
        coverage,
        precision,
        f1: harmonic_mean(coverage, precision),
    })
}

/// F1-style harmonic mean; 0.0 when both inputs are 0.
fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a + b == 0.0 {
        0.0
    } else {
        2.0 * a * b / (a + b)
    }
}

/// Sort by score descending. Equal scores fall back to disease name, then ID.
pub fn rank(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(compare_candidates);
}

fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.disease.name.cmp(&b.disease.name))
        .then_with(|| a.disease.id.cmp(&b.disease.id))
}
