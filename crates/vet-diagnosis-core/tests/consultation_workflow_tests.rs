//! End-to-end consultation workflow tests against SQLite.

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::Result;
use vet_diagnosis_core::db::Database;
use vet_diagnosis_core::diagnosis::{ConsultationStore, DiagnosisError, DiagnosisService};
use vet_diagnosis_core::models::{Consultation, Patient, Species};
use vet_diagnosis_core::seed::seed_reference_catalog;
use vet_diagnosis_core::{open_database_in_memory, open_with_config, SuggestionReport, VetDiagnosisError};

fn seeded_db() -> Result<Database> {
    let db = Database::open_in_memory()?;
    seed_reference_catalog(&db)?;
    Ok(db)
}

fn symptom_ids(db: &Database, names: &[&str]) -> Result<BTreeSet<String>> {
    let mut ids = BTreeSet::new();
    for name in names {
        let symptom = db
            .get_symptom_by_name(name)?
            .ok_or_else(|| anyhow::anyhow!("missing symptom {}", name))?;
        ids.insert(symptom.id);
    }
    Ok(ids)
}

fn new_consultation(db: &Database, symptoms: BTreeSet<String>) -> Result<Consultation> {
    let patient = Patient::new("Thor".into(), Species::Canine);
    db.insert_patient(&patient)?;

    let mut consultation = Consultation::new(patient.id);
    consultation.presented_symptoms = symptoms;
    db.insert_consultation(&consultation)?;
    Ok(consultation)
}

#[test]
fn test_recompute_against_reference_catalog() -> Result<()> {
    let db = seeded_db()?;
    let symptoms = symptom_ids(&db, &["Seizures", "Tremors"])?;
    let consultation = new_consultation(&db, symptoms)?;

    let service = DiagnosisService::new(&db, &db);
    let result = service.recompute(&consultation.id)?;

    let top = result.top().ok_or_else(|| anyhow::anyhow!("no suggestions"))?;
    assert_eq!(top.disease.name, "Epilepsy");
    assert_eq!(top.percentage(), "100%");
    assert!(result.disease_names().contains(&"Distemper"));

    let stored = db.suspected_diseases(&consultation.id)?;
    let returned: BTreeSet<String> = result.disease_ids().into_iter().collect();
    assert_eq!(stored, returned);
    Ok(())
}

#[test]
fn test_recompute_replaces_manual_suspicions() -> Result<()> {
    let db = seeded_db()?;
    let consultation = new_consultation(&db, symptom_ids(&db, &["Itching", "Skin Lesions"])?)?;

    let pneumonia = db.get_disease_by_name("Pneumonia")?.ok_or_else(|| anyhow::anyhow!("missing"))?;
    db.replace_suspected_diseases(&consultation.id, &[pneumonia.id.clone()].into_iter().collect())?;

    DiagnosisService::new(&db, &db).recompute(&consultation.id)?;

    let stored = db.suspected_diseases(&consultation.id)?;
    assert!(!stored.contains(&pneumonia.id));
    let dermatitis = db
        .get_disease_by_name("Allergic Dermatitis")?
        .ok_or_else(|| anyhow::anyhow!("missing"))?;
    assert!(stored.contains(&dermatitis.id));
    Ok(())
}

#[test]
fn test_removing_all_symptoms_clears_suspicions() -> Result<()> {
    let db = seeded_db()?;
    let consultation = new_consultation(&db, symptom_ids(&db, &["Cough", "Fever"])?)?;
    let service = DiagnosisService::new(&db, &db);

    assert!(!service.recompute(&consultation.id)?.is_empty());
    assert!(!db.suspected_diseases(&consultation.id)?.is_empty());

    db.set_presented_symptoms(&consultation.id, &BTreeSet::new())?;
    assert!(service.recompute(&consultation.id)?.is_empty());
    assert!(db.suspected_diseases(&consultation.id)?.is_empty());
    Ok(())
}

#[test]
fn test_recompute_is_idempotent() -> Result<()> {
    let db = seeded_db()?;
    let consultation = new_consultation(&db, symptom_ids(&db, &["Vomiting", "Diarrhea", "Fever"])?)?;
    let service = DiagnosisService::new(&db, &db);

    let first = service.recompute(&consultation.id)?;
    let first_stored = db.suspected_diseases(&consultation.id)?;
    let second = service.recompute(&consultation.id)?;
    let second_stored = db.suspected_diseases(&consultation.id)?;

    assert_eq!(first, second);
    assert_eq!(first_stored, second_stored);
    Ok(())
}

#[test]
fn test_recompute_leaves_updated_at_alone() -> Result<()> {
    let db = seeded_db()?;
    let consultation = new_consultation(&db, symptom_ids(&db, &["Cough", "Fever"])?)?;
    let service = DiagnosisService::new(&db, &db);

    service.recompute(&consultation.id)?;
    let before = db
        .get_consultation(&consultation.id)?
        .ok_or_else(|| anyhow::anyhow!("missing"))?
        .updated_at;
    service.recompute(&consultation.id)?;
    let after = db
        .get_consultation(&consultation.id)?
        .ok_or_else(|| anyhow::anyhow!("missing"))?
        .updated_at;

    assert_eq!(before, after);
    assert_eq!(after, consultation.updated_at);
    chrono::DateTime::parse_from_rfc3339(&after)?;
    Ok(())
}

#[test]
fn test_definitive_diagnoses_untouched_by_recompute() -> Result<()> {
    let db = seeded_db()?;
    let consultation = new_consultation(&db, symptom_ids(&db, &["Cough"])?)?;
    let kennel = db
        .get_disease_by_name("Infectious Tracheobronchitis")?
        .ok_or_else(|| anyhow::anyhow!("missing"))?;

    let confirmed: BTreeSet<String> = [kennel.id.clone()].into_iter().collect();
    db.set_definitive_diagnoses(&consultation.id, &confirmed)?;

    db.set_presented_symptoms(&consultation.id, &BTreeSet::new())?;
    DiagnosisService::new(&db, &db).recompute(&consultation.id)?;

    assert_eq!(db.definitive_diagnoses(&consultation.id)?, confirmed);
    Ok(())
}

#[test]
fn test_missing_consultation_is_typed_error() -> Result<()> {
    let db = seeded_db()?;
    let result = DiagnosisService::new(&db, &db).recompute("does-not-exist");
    assert!(matches!(result, Err(DiagnosisError::ConsultationNotFound(_))));
    Ok(())
}

#[test]
fn test_report_follows_ranked_order() -> Result<()> {
    let db = seeded_db()?;
    let consultation = new_consultation(&db, symptom_ids(&db, &["Increased Thirst", "Frequent Urination"])?)?;
    let result = DiagnosisService::new(&db, &db).recompute(&consultation.id)?;

    let report = SuggestionReport::from_result(&consultation.id, &result);
    let names: Vec<&str> = report.entries.iter().map(|e| e.disease_name.as_str()).collect();
    assert_eq!(names, result.disease_names());
    for pair in report.entries.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let json = report.to_json()?;
    assert!(json.contains("Diabetes Mellitus"));
    Ok(())
}

// =========================================================================
// FFI surface
// =========================================================================

#[test]
fn test_core_consultation_lifecycle() -> Result<()> {
    let core = open_database_in_memory()?;
    core.seed_reference_catalog()?;

    let patient = core.create_patient("Mia".into(), "feline".into())?;
    let symptoms: Vec<String> = core
        .list_symptoms()?
        .into_iter()
        .filter(|s| s.name == "Cough" || s.name == "Nasal Discharge")
        .map(|s| s.id)
        .collect();
    assert_eq!(symptoms.len(), 2);

    let view = core.create_consultation(patient.id.clone(), None, None, None, symptoms)?;
    assert_eq!(view.kind, "routine");
    assert!(!view.suggestions.is_empty());
    let ranked: BTreeSet<String> = view.suggestions.iter().map(|s| s.disease_id.clone()).collect();
    let stored: BTreeSet<String> = view.suspected_disease_ids.iter().cloned().collect();
    assert_eq!(ranked, stored);

    // Free-text names with a synonym and a typo
    let recorded = core.record_symptoms_by_name(
        view.id.clone(),
        vec!["convulsions".into(), "tremmors".into(), "glitter".into()],
    )?;
    assert_eq!(recorded.unresolved, vec!["glitter".to_string()]);
    assert_eq!(recorded.consultation.presented_symptom_ids.len(), 2);
    assert_eq!(recorded.consultation.suggestions[0].name, "Epilepsy");

    let fetched = core
        .get_consultation(view.id.clone())?
        .ok_or_else(|| anyhow::anyhow!("consultation vanished"))?;
    assert_eq!(fetched.suggestions[0].name, "Epilepsy");

    let cleared = core.update_consultation_symptoms(view.id.clone(), Vec::new())?;
    assert!(cleared.suggestions.is_empty());
    assert!(cleared.suspected_disease_ids.is_empty());

    assert!(core.get_consultation("nope".into())?.is_none());
    Ok(())
}

#[test]
fn test_core_rejects_bad_input() -> Result<()> {
    let core = open_database_in_memory()?;

    assert!(matches!(
        core.create_patient("Rex".into(), "dragon".into()),
        Err(VetDiagnosisError::InvalidInput(_))
    ));
    assert!(matches!(
        core.create_consultation("no-patient".into(), None, None, None, Vec::new()),
        Err(VetDiagnosisError::NotFound(_))
    ));
    assert!(matches!(
        core.update_consultation_symptoms("no-consultation".into(), Vec::new()),
        Err(VetDiagnosisError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn test_open_with_config_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let db_path = dir.path().join("clinic.db");
    let config_path = dir.path().join("core.toml");

    let mut file = std::fs::File::create(&config_path)?;
    writeln!(
        file,
        "[database]\npath = {:?}\n\n[suggestions]\nlog_top = 3",
        db_path.display().to_string()
    )?;

    let core = open_with_config(config_path.display().to_string())?;
    assert!(!core.list_diseases()?.is_empty());
    assert!(db_path.exists());

    let suggestions = core.suggest_for_symptoms(
        core.search_symptoms("blood urine".into(), 5)?
            .into_iter()
            .map(|s| s.id)
            .collect(),
    )?;
    assert!(suggestions.iter().any(|s| s.name == "Cystitis"));
    Ok(())
}
