//! Golden and property tests for the suggestion engine.

use std::collections::BTreeSet;

use proptest::prelude::*;
use vet_diagnosis_core::diagnosis::{score_disease, suggest};
use vet_diagnosis_core::models::Disease;

/// Golden scenario: fixed catalog, fixed presented set, expected ranking.
struct GoldenCase {
    id: &'static str,
    presented: &'static [&'static str],
    /// (disease name, score, percentage label) in ranked order
    expected: &'static [(&'static str, f64, &'static str)],
}

fn catalog() -> Vec<Disease> {
    vec![
        Disease::new("A".into()).with_symptoms(["fever", "cough"]),
        Disease::new("B".into()).with_symptoms(["fever", "cough", "fatigue"]),
        Disease::new("C".into()).with_symptoms(["fever"]),
        Disease::new("Inert".into()),
    ]
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "fever-and-cough",
            presented: &["fever", "cough"],
            expected: &[("A", 100.2, "100%"), ("B", 80.2, "80%"), ("C", 66.7667, "67%")],
        },
        GoldenCase {
            id: "fever-only",
            presented: &["fever"],
            expected: &[("C", 100.1, "100%"), ("A", 66.7667, "67%"), ("B", 50.1, "50%")],
        },
        GoldenCase {
            id: "full-profile-of-b",
            presented: &["fever", "cough", "fatigue"],
            expected: &[("B", 100.3, "100%"), ("A", 80.2, "80%"), ("C", 50.1, "50%")],
        },
        GoldenCase {
            id: "unknown-symptom-dilutes-precision",
            presented: &["fever", "cough", "itching"],
            expected: &[("A", 80.2, "80%"), ("B", 66.8667, "67%"), ("C", 50.1, "50%")],
        },
        GoldenCase {
            id: "no-overlap",
            presented: &["itching"],
            expected: &[],
        },
        GoldenCase {
            id: "nothing-presented",
            presented: &[],
            expected: &[],
        },
    ]
}

fn set(ids: &[&str]) -> BTreeSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_golden_cases() {
    let catalog = catalog();

    for case in get_golden_cases() {
        let result = suggest(&set(case.presented), &catalog);

        assert_eq!(
            result.len(),
            case.expected.len(),
            "Case '{}': candidate count mismatch",
            case.id
        );

        for (candidate, (name, score, percentage)) in result.candidates.iter().zip(case.expected) {
            assert_eq!(
                candidate.disease.name, *name,
                "Case '{}': ranking mismatch",
                case.id
            );
            assert!(
                (candidate.score - score).abs() < 1e-3,
                "Case '{}': {} scored {}, expected {}",
                case.id,
                name,
                candidate.score,
                score
            );
            assert_eq!(
                candidate.percentage(),
                *percentage,
                "Case '{}': percentage mismatch for {}",
                case.id,
                name
            );
        }
    }
}

#[test]
fn test_inert_disease_never_suggested() {
    let catalog = catalog();
    let result = suggest(&set(&["fever", "cough", "fatigue", "itching"]), &catalog);
    assert!(!result.disease_names().contains(&"Inert"));
}

#[test]
fn test_percentage_never_exceeds_hundred() {
    let catalog = vec![Disease::new("Big".into()).with_symptoms((0..40).map(|i| format!("s{}", i)))];
    let presented: BTreeSet<String> = (0..40).map(|i| format!("s{}", i)).collect();

    let result = suggest(&presented, &catalog);
    // 100 + 40 * 0.1 raw score, but the label is F1 only
    assert!((result.candidates[0].score - 104.0).abs() < 1e-9);
    assert_eq!(result.candidates[0].percentage(), "100%");
}

// =========================================================================
// Properties
// =========================================================================

fn symptom_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set((0u8..12).prop_map(|i| format!("s{}", i)), 0..8)
}

fn disease_catalog() -> impl Strategy<Value = Vec<Disease>> {
    prop::collection::vec(symptom_set(), 0..10).prop_map(|profiles| {
        profiles
            .into_iter()
            .enumerate()
            .map(|(i, profile)| Disease::new(format!("D{}", i)).with_symptoms(profile))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_every_candidate_shares_a_symptom(presented in symptom_set(), catalog in disease_catalog()) {
        let result = suggest(&presented, &catalog);

        for candidate in &result.candidates {
            prop_assert!(!candidate.disease.is_inert());
            prop_assert!(candidate.breakdown.common > 0);
            prop_assert!(candidate.score > 0.0);
            prop_assert!(candidate.breakdown.f1 <= 1.0);
        }

        let expected = catalog
            .iter()
            .filter(|d| d.common_symptom_count(&presented) > 0)
            .count();
        prop_assert_eq!(result.len(), expected);
    }

    #[test]
    fn prop_sorted_by_score_descending(presented in symptom_set(), catalog in disease_catalog()) {
        let result = suggest(&presented, &catalog);
        for pair in result.candidates.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn prop_exact_match_is_maximal(presented in symptom_set(), catalog in disease_catalog()) {
        prop_assume!(!presented.is_empty());

        let mut catalog = catalog;
        catalog.push(Disease::new("Exact".into()).with_symptoms(presented.iter().cloned()));

        let result = suggest(&presented, &catalog);
        let exact = result
            .candidates
            .iter()
            .find(|c| c.disease.name == "Exact")
            .expect("exact match must be suggested");

        prop_assert_eq!(exact.breakdown.f1, 1.0);
        for candidate in &result.candidates {
            prop_assert!(exact.score >= candidate.score);
        }
    }

    #[test]
    fn prop_adding_matching_symptom_never_lowers_score(
        presented in symptom_set(),
        profile in symptom_set(),
    ) {
        let disease = Disease::new("D".into()).with_symptoms(profile.clone());
        let before = score_disease(&disease, &presented).map(|b| b.score()).unwrap_or(0.0);

        for extra in profile.difference(&presented) {
            let mut grown = presented.clone();
            grown.insert(extra.clone());
            let after = score_disease(&disease, &grown).map(|b| b.score()).unwrap_or(0.0);
            prop_assert!(after >= before, "adding {} lowered {} to {}", extra, before, after);
        }
    }

    #[test]
    fn prop_suggest_is_deterministic(presented in symptom_set(), catalog in disease_catalog()) {
        let first = suggest(&presented, &catalog);

        let mut reversed = catalog.clone();
        reversed.reverse();
        let second = suggest(&presented, &reversed);

        prop_assert_eq!(first.disease_ids(), second.disease_ids());
    }
}
