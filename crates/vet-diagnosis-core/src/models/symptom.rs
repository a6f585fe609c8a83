//! Symptom reference data.

use serde::{Deserialize, Serialize};

/// Opaque symptom identifier.
pub type SymptomId = String;

/// A clinical sign that can be recorded on a consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Symptom {
    /// Unique identifier
    pub id: SymptomId,
    /// Display name (unique across the catalog)
    pub name: String,
    /// Optional free-text description
    pub description: Option<String>,
}

impl Symptom {
    /// Create a new symptom with a fresh identifier.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description: None,
        }
    }
}
