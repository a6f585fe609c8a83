//! Built-in reference catalog of common veterinary diseases.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::db::{Database, DbResult};
use crate::models::{Disease, Symptom, SymptomId};

/// (name, description, typical symptoms)
type ReferenceDisease = (&'static str, &'static str, &'static [&'static str]);

const REFERENCE_DISEASES: &[ReferenceDisease] = &[
    (
        "Gastritis",
        "Inflammation of the gastric mucosa",
        &["Vomiting", "Abdominal Pain", "Loss of Appetite", "Lethargy"],
    ),
    (
        "Canine Flu",
        "Viral respiratory infection",
        &["Cough", "Nasal Discharge", "Fever", "Lethargy", "Loss of Appetite"],
    ),
    (
        "Canine Parvovirus",
        "Highly contagious viral disease, mostly affecting puppies",
        &[
            "Diarrhea",
            "Vomiting",
            "Fever",
            "Lethargy",
            "Loss of Appetite",
            "Dehydration",
            "Blood in Stool",
        ],
    ),
    (
        "Distemper",
        "Severe viral disease of the respiratory, digestive and nervous systems",
        &[
            "Fever",
            "Cough",
            "Nasal Discharge",
            "Ocular Discharge",
            "Vomiting",
            "Diarrhea",
            "Lethargy",
            "Seizures",
            "Tremors",
        ],
    ),
    (
        "Renal Failure",
        "Progressive loss of kidney function",
        &[
            "Increased Thirst",
            "Frequent Urination",
            "Loss of Appetite",
            "Vomiting",
            "Lethargy",
            "Weight Loss",
            "Dehydration",
        ],
    ),
    (
        "Diabetes Mellitus",
        "Metabolic disorder characterized by hyperglycemia",
        &[
            "Increased Thirst",
            "Frequent Urination",
            "Weight Loss",
            "Loss of Appetite",
            "Lethargy",
        ],
    ),
    (
        "Otitis",
        "Ear inflammation, common in dogs with floppy ears",
        &["Itching", "Ocular Discharge", "Swelling"],
    ),
    (
        "Allergic Dermatitis",
        "Allergic reaction affecting the skin",
        &["Itching", "Skin Lesions", "Swelling"],
    ),
    (
        "Pneumonia",
        "Infection or inflammation of the lungs",
        &[
            "Cough",
            "Difficulty Breathing",
            "Fever",
            "Lethargy",
            "Loss of Appetite",
            "Nasal Discharge",
        ],
    ),
    (
        "Pancreatitis",
        "Inflammation of the pancreas",
        &[
            "Abdominal Pain",
            "Vomiting",
            "Diarrhea",
            "Loss of Appetite",
            "Lethargy",
            "Fever",
        ],
    ),
    (
        "Giardiasis",
        "Intestinal infection caused by a protozoan",
        &["Diarrhea", "Weight Loss", "Loss of Appetite", "Vomiting"],
    ),
    (
        "Cystitis",
        "Inflammation of the bladder",
        &["Frequent Urination", "Blood in Urine", "Abdominal Pain", "Lethargy"],
    ),
    (
        "Epilepsy",
        "Neurological disorder with recurrent seizures",
        &["Seizures", "Tremors"],
    ),
    (
        "Obesity",
        "Excessive accumulation of body fat",
        &["Excessive Weight Gain", "Difficulty Breathing", "Lethargy", "Lameness"],
    ),
    (
        "Arthritis",
        "Inflammation of the joints",
        &["Lameness", "Lethargy", "Swelling"],
    ),
    (
        "Tick-borne Disease",
        "Diseases transmitted by ticks such as ehrlichiosis and babesiosis",
        &["Fever", "Lethargy", "Loss of Appetite", "Apathy", "Blood in Urine"],
    ),
    (
        "Infectious Tracheobronchitis",
        "Kennel cough, highly contagious",
        &["Cough", "Nasal Discharge", "Fever", "Lethargy"],
    ),
];

/// What a seeding run added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedStats {
    pub symptoms_added: usize,
    pub diseases_added: usize,
}

/// Install the reference symptoms and diseases.
///
/// Existing rows (matched by name, case-insensitive) are kept as they are, so
/// running this again adds nothing and never overwrites a curated profile.
pub fn seed_reference_catalog(db: &Database) -> DbResult<SeedStats> {
    let mut stats = SeedStats::default();
    let mut symptom_ids: BTreeMap<&str, SymptomId> = BTreeMap::new();

    for (_, _, symptoms) in REFERENCE_DISEASES {
        for &name in symptoms.iter() {
            if symptom_ids.contains_key(name) {
                continue;
            }
            let id = match db.get_symptom_by_name(name)? {
                Some(existing) => existing.id,
                None => {
                    let symptom = Symptom::new(name.to_string());
                    db.insert_symptom(&symptom)?;
                    stats.symptoms_added += 1;
                    symptom.id
                }
            };
            symptom_ids.insert(name, id);
        }
    }

    for &(name, description, symptoms) in REFERENCE_DISEASES {
        if db.get_disease_by_name(name)?.is_some() {
            debug!(disease = name, "reference disease already present");
            continue;
        }

        let mut disease = Disease::new(name.to_string())
            .with_symptoms(symptoms.iter().filter_map(|s| symptom_ids.get(s).cloned()));
        disease.description = Some(description.to_string());
        db.upsert_disease(&disease)?;
        stats.diseases_added += 1;
    }

    info!(
        symptoms_added = stats.symptoms_added,
        diseases_added = stats.diseases_added,
        "reference catalog seeded"
    );
    Ok(stats)
}
