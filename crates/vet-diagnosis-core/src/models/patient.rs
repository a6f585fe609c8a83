//! Patient models.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Species handled by the clinic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Species {
    Canine,
    Feline,
    Bird,
    Reptile,
    Rodent,
    /// Rabbits and hares
    Lagomorph,
    Other,
}

impl Species {
    pub fn as_str(&self) -> &'static str {
        match self {
            Species::Canine => "canine",
            Species::Feline => "feline",
            Species::Bird => "bird",
            Species::Reptile => "reptile",
            Species::Rodent => "rodent",
            Species::Lagomorph => "lagomorph",
            Species::Other => "other",
        }
    }

    /// Parse a stored species name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "canine" => Some(Species::Canine),
            "feline" => Some(Species::Feline),
            "bird" => Some(Species::Bird),
            "reptile" => Some(Species::Reptile),
            "rodent" => Some(Species::Rodent),
            "lagomorph" => Some(Species::Lagomorph),
            "other" => Some(Species::Other),
            _ => None,
        }
    }
}

/// Patient sex, including neutered states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    NeuteredMale,
    SpayedFemale,
    Undetermined,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::NeuteredMale => "neutered_male",
            Sex::SpayedFemale => "spayed_female",
            Sex::Undetermined => "undetermined",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            "neutered_male" => Some(Sex::NeuteredMale),
            "spayed_female" => Some(Sex::SpayedFemale),
            "undetermined" => Some(Sex::Undetermined),
            _ => None,
        }
    }
}

/// Administrative status of a patient record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PatientStatus {
    #[default]
    Active,
    Deceased,
    Transferred,
    Lost,
}

impl PatientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Deceased => "deceased",
            PatientStatus::Transferred => "transferred",
            PatientStatus::Lost => "lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(PatientStatus::Active),
            "deceased" => Some(PatientStatus::Deceased),
            "transferred" => Some(PatientStatus::Transferred),
            "lost" => Some(PatientStatus::Lost),
            _ => None,
        }
    }
}

/// A patient (animal) seen by the clinic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Local UUID
    pub id: String,
    /// Patient name
    pub name: String,
    /// Species
    pub species: Species,
    /// Breed
    pub breed: Option<String>,
    /// Sex
    pub sex: Option<Sex>,
    /// Date of birth (YYYY-MM-DD)
    pub date_of_birth: Option<String>,
    /// Weight in kg
    pub weight_kg: Option<f64>,
    /// Microchip number (unique when present)
    pub microchip: Option<String>,
    /// Tutor (owner) full name
    pub tutor_name: Option<String>,
    /// Known allergies
    pub known_allergies: Option<String>,
    /// Record status
    pub status: PatientStatus,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(name: String, species: Species) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            species,
            breed: None,
            sex: None,
            date_of_birth: None,
            weight_kg: None,
            microchip: None,
            tutor_name: None,
            known_allergies: None,
            status: PatientStatus::Active,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Human readable age relative to `today`.
    ///
    /// Whole years when at least one year old, otherwise whole months, otherwise days.
    pub fn age_description(&self, today: NaiveDate) -> String {
        let Some(born) = self
            .date_of_birth
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            return "unknown".into();
        };

        let before_birthday = (today.month(), today.day()) < (born.month(), born.day());
        let years = today.year() - born.year() - i32::from(before_birthday);
        if years > 0 {
            return format!("{} year(s)", years);
        }

        let mut months = (today.year() - born.year()) * 12 + today.month() as i32 - born.month() as i32;
        if today.day() < born.day() {
            months -= 1;
        }
        if months > 0 {
            return format!("{} month(s)", months);
        }

        let days = (today - born).num_days();
        match days {
            0 => "today".into(),
            d if d < 0 => "future date".into(),
            d => format!("{} day(s)", d),
        }
    }
}
