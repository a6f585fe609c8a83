//! SQLite schema definition.

/// Complete database schema for the clinic core.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Symptoms (Reference Data)
-- ============================================================================

CREATE TABLE IF NOT EXISTS symptoms (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- FTS5 virtual table for name search
CREATE VIRTUAL TABLE IF NOT EXISTS symptoms_fts USING fts5(
    name,
    description,
    content='symptoms',
    content_rowid='rowid'
);

-- Triggers to keep FTS5 in sync with main table
CREATE TRIGGER IF NOT EXISTS symptoms_ai AFTER INSERT ON symptoms BEGIN
    INSERT INTO symptoms_fts(rowid, name, description)
    VALUES (new.rowid, new.name, new.description);
END;

CREATE TRIGGER IF NOT EXISTS symptoms_ad AFTER DELETE ON symptoms BEGIN
    INSERT INTO symptoms_fts(symptoms_fts, rowid, name, description)
    VALUES ('delete', old.rowid, old.name, old.description);
END;

CREATE TRIGGER IF NOT EXISTS symptoms_au AFTER UPDATE ON symptoms BEGIN
    INSERT INTO symptoms_fts(symptoms_fts, rowid, name, description)
    VALUES ('delete', old.rowid, old.name, old.description);
    INSERT INTO symptoms_fts(rowid, name, description)
    VALUES (new.rowid, new.name, new.description);
END;

-- ============================================================================
-- Diseases (Knowledge Base)
-- ============================================================================

CREATE TABLE IF NOT EXISTS diseases (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE,
    description TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Typical symptom profile
CREATE TABLE IF NOT EXISTS disease_symptoms (
    disease_id TEXT NOT NULL REFERENCES diseases(id) ON DELETE CASCADE,
    symptom_id TEXT NOT NULL REFERENCES symptoms(id) ON DELETE CASCADE,
    PRIMARY KEY (disease_id, symptom_id)
);

CREATE INDEX IF NOT EXISTS idx_disease_symptoms_symptom ON disease_symptoms(symptom_id);

-- ============================================================================
-- Patients and Veterinarians
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    species TEXT NOT NULL,
    breed TEXT,
    sex TEXT,
    date_of_birth TEXT,
    weight_kg REAL,
    microchip TEXT UNIQUE,
    tutor_name TEXT,
    known_allergies TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

CREATE TABLE IF NOT EXISTS veterinarians (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL,
    crmv TEXT UNIQUE
);

-- ============================================================================
-- Consultations
-- ============================================================================

CREATE TABLE IF NOT EXISTS consultations (
    id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    veterinarian_id TEXT REFERENCES veterinarians(id) ON DELETE SET NULL,
    scheduled_at TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'routine',
    chief_complaint TEXT,
    treatment TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_consultations_patient ON consultations(patient_id);
CREATE INDEX IF NOT EXISTS idx_consultations_scheduled ON consultations(scheduled_at);

CREATE TABLE IF NOT EXISTS consultation_symptoms (
    consultation_id TEXT NOT NULL REFERENCES consultations(id) ON DELETE CASCADE,
    symptom_id TEXT NOT NULL REFERENCES symptoms(id) ON DELETE CASCADE,
    PRIMARY KEY (consultation_id, symptom_id)
);

-- Engine-owned: rewritten on every recompute
CREATE TABLE IF NOT EXISTS consultation_suspected_diseases (
    consultation_id TEXT NOT NULL REFERENCES consultations(id) ON DELETE CASCADE,
    disease_id TEXT NOT NULL REFERENCES diseases(id) ON DELETE CASCADE,
    PRIMARY KEY (consultation_id, disease_id)
);

-- Veterinarian-owned
CREATE TABLE IF NOT EXISTS consultation_definitive_diagnoses (
    consultation_id TEXT NOT NULL REFERENCES consultations(id) ON DELETE CASCADE,
    disease_id TEXT NOT NULL REFERENCES diseases(id) ON DELETE CASCADE,
    PRIMARY KEY (consultation_id, disease_id)
);
"#;
