//! Consultation and veterinarian models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{DiseaseId, SymptomId};

/// A veterinarian responsible for consultations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Veterinarian {
    pub id: String,
    pub full_name: String,
    /// Council registration number (unique when present)
    pub crmv: Option<String>,
}

impl Veterinarian {
    pub fn new(full_name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            full_name,
            crmv: None,
        }
    }
}

/// Kind of visit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ConsultationKind {
    #[default]
    Routine,
    Emergency,
    Vaccination,
    Surgery,
    PostSurgical,
    FollowUp,
    Other,
}

impl ConsultationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationKind::Routine => "routine",
            ConsultationKind::Emergency => "emergency",
            ConsultationKind::Vaccination => "vaccination",
            ConsultationKind::Surgery => "surgery",
            ConsultationKind::PostSurgical => "post_surgical",
            ConsultationKind::FollowUp => "follow_up",
            ConsultationKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "routine" => Some(ConsultationKind::Routine),
            "emergency" => Some(ConsultationKind::Emergency),
            "vaccination" => Some(ConsultationKind::Vaccination),
            "surgery" => Some(ConsultationKind::Surgery),
            "post_surgical" => Some(ConsultationKind::PostSurgical),
            "follow_up" => Some(ConsultationKind::FollowUp),
            "other" => Some(ConsultationKind::Other),
            _ => None,
        }
    }
}

/// A veterinary consultation.
///
/// `suspected_diseases` is owned by the diagnosis service and is overwritten on
/// every recompute. `definitive_diagnoses` belongs to the veterinarian and is
/// never touched by the suggestion engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Consultation {
    /// Unique consultation ID
    pub id: String,
    /// Patient ID
    pub patient_id: String,
    /// Responsible veterinarian, if any
    pub veterinarian_id: Option<String>,
    /// When the visit took place
    pub scheduled_at: String,
    /// Kind of visit
    pub kind: ConsultationKind,
    /// Main complaint reported by the tutor
    pub chief_complaint: Option<String>,
    /// Symptoms observed on this visit
    pub presented_symptoms: BTreeSet<SymptomId>,
    /// Engine-computed suspicions (unordered)
    pub suspected_diseases: BTreeSet<DiseaseId>,
    /// Diagnoses confirmed by the veterinarian
    pub definitive_diagnoses: BTreeSet<DiseaseId>,
    /// Prescribed treatment
    pub treatment: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Consultation {
    /// Create a new consultation for a patient, scheduled now.
    pub fn new(patient_id: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            patient_id,
            veterinarian_id: None,
            scheduled_at: now.clone(),
            kind: ConsultationKind::default(),
            chief_complaint: None,
            presented_symptoms: BTreeSet::new(),
            suspected_diseases: BTreeSet::new(),
            definitive_diagnoses: BTreeSet::new(),
            treatment: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}
