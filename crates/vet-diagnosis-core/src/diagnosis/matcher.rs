//! Free-text symptom name resolution.
//!
//! Handles:
//! - Text normalization (case, whitespace, diacritics)
//! - Clinical synonym expansion (pyrexia→fever, pruritus→itching)
//! - Fuzzy matching against the symptom catalog for typos

use std::collections::HashMap;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::Symptom;

/// Minimum similarity for a fuzzy match to be accepted.
const MIN_SIMILARITY: f64 = 0.85;

/// How a name was resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    /// Normalized name equals the catalog name
    Exact,
    /// Matched through a clinical synonym
    Synonym,
    /// Closest catalog name above the similarity threshold
    Fuzzy { similarity: f64 },
}

/// A free-text name resolved to a catalog symptom.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomMatch {
    pub input: String,
    pub symptom: Symptom,
    pub kind: MatchKind,
}

/// Outcome of resolving a batch of names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomResolution {
    pub matched: Vec<SymptomMatch>,
    /// Names with no acceptable catalog match
    pub unresolved: Vec<String>,
}

/// Resolves free-text symptom names against a catalog snapshot.
pub struct SymptomMatcher {
    /// Normalized catalog name → symptom
    catalog: Vec<(String, Symptom)>,
    /// Normalized synonym → normalized canonical name
    synonyms: HashMap<String, String>,
}

impl SymptomMatcher {
    /// Build a matcher over a catalog snapshot.
    pub fn new(symptoms: Vec<Symptom>) -> Self {
        Self {
            catalog: symptoms
                .into_iter()
                .map(|s| (normalize_name(&s.name), s))
                .collect(),
            synonyms: Self::default_synonyms(),
        }
    }

    /// Resolve a single name.
    pub fn resolve(&self, name: &str) -> Option<SymptomMatch> {
        let normalized = normalize_name(name);
        if normalized.is_empty() {
            return None;
        }

        if let Some(symptom) = self.find_exact(&normalized) {
            return Some(SymptomMatch {
                input: name.to_string(),
                symptom: symptom.clone(),
                kind: MatchKind::Exact,
            });
        }

        if let Some(symptom) = self
            .synonyms
            .get(&normalized)
            .and_then(|canonical| self.find_exact(canonical))
        {
            return Some(SymptomMatch {
                input: name.to_string(),
                symptom: symptom.clone(),
                kind: MatchKind::Synonym,
            });
        }

        let (similarity, symptom) = self
            .catalog
            .iter()
            .map(|(candidate, symptom)| (fuzzy_match(&normalized, candidate), symptom))
            .max_by(|a, b| a.0.total_cmp(&b.0))?;

        (similarity >= MIN_SIMILARITY).then(|| SymptomMatch {
            input: name.to_string(),
            symptom: symptom.clone(),
            kind: MatchKind::Fuzzy { similarity },
        })
    }

    /// Resolve many names, keeping track of the ones that failed.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> SymptomResolution {
        let mut resolution = SymptomResolution::default();
        for name in names {
            match self.resolve(name.as_ref()) {
                Some(m) => resolution.matched.push(m),
                None => resolution.unresolved.push(name.as_ref().to_string()),
            }
        }
        resolution
    }

    /// Add a custom synonym mapping.
    pub fn add_synonym(&mut self, synonym: &str, canonical: &str) {
        self.synonyms
            .insert(normalize_name(synonym), normalize_name(canonical));
    }

    fn find_exact(&self, normalized: &str) -> Option<&Symptom> {
        self.catalog
            .iter()
            .find(|(name, _)| name == normalized)
            .map(|(_, symptom)| symptom)
    }

    /// Default clinical synonyms.
    fn default_synonyms() -> HashMap<String, String> {
        let pairs = [
            ("pyrexia", "fever"),
            ("hyperthermia", "fever"),
            ("coughing", "cough"),
            ("vomit", "vomiting"),
            ("emesis", "vomiting"),
            ("throwing up", "vomiting"),
            ("anorexia", "loss of appetite"),
            ("inappetence", "loss of appetite"),
            ("not eating", "loss of appetite"),
            ("lethargic", "lethargy"),
            ("apathy", "lethargy"),
            ("polydipsia", "increased thirst"),
            ("polyuria", "frequent urination"),
            ("pollakiuria", "frequent urination"),
            ("pruritus", "itching"),
            ("scratching", "itching"),
            ("hematuria", "blood in urine"),
            ("hematochezia", "blood in stool"),
            ("dyspnea", "difficulty breathing"),
            ("seizure", "seizures"),
            ("convulsions", "seizures"),
            ("limping", "lameness"),
            ("claudication", "lameness"),
            ("edema", "swelling"),
            ("runny nose", "nasal discharge"),
            ("rhinorrhea", "nasal discharge"),
        ];

        pairs
            .into_iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }
}

/// Lowercase, fold diacritics and collapse whitespace.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.chars().flat_map(char::to_lowercase).map(fold_diacritic).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        other => other,
    }
}

/// Combined string similarity.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favors shared prefixes, Levenshtein overall edits
    jaro_winkler(a, b) * 0.6 + normalized_levenshtein(a, b) * 0.4
}
