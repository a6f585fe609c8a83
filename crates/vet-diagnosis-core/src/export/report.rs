//! Suggestion report export for consultation records.

use serde::{Deserialize, Serialize};

use crate::models::SuggestionResult;

/// Ranked suggestions for one consultation, ready to hand to a frontend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionReport {
    /// Consultation the suggestions were computed for
    pub consultation_id: String,
    /// Generation timestamp (RFC 3339)
    pub generated_at: String,
    /// Entries in ranked order
    pub entries: Vec<ReportEntry>,
}

/// Single ranked suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportEntry {
    pub disease_id: String,
    pub disease_name: String,
    pub score: f64,
    /// F1 as a whole percentage, e.g. "72%"
    pub percentage: String,
    /// Number of presented symptoms found in the disease profile
    pub common_symptoms: usize,
}

impl SuggestionReport {
    /// Build a report from a ranked result, preserving its order.
    pub fn from_result(consultation_id: &str, result: &SuggestionResult) -> Self {
        let entries = result
            .candidates
            .iter()
            .map(|candidate| ReportEntry {
                disease_id: candidate.disease.id.clone(),
                disease_name: candidate.disease.name.clone(),
                score: candidate.score,
                percentage: candidate.percentage(),
                common_symptoms: candidate.breakdown.common,
            })
            .collect();

        Self {
            consultation_id: consultation_id.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            entries,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        csv.push_str("consultation_id,rank,disease_id,disease_name,score,percentage,common_symptoms\n");

        for (rank, entry) in self.entries.iter().enumerate() {
            csv.push_str(&format!(
                "{},{},{},{},{:.1},{},{}\n",
                escape_csv(&self.consultation_id),
                rank + 1,
                escape_csv(&entry.disease_id),
                escape_csv(&entry.disease_name),
                entry.score,
                entry.percentage,
                entry.common_symptoms,
            ));
        }

        csv
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::suggest;
    use crate::models::Disease;
    use std::collections::BTreeSet;

    fn make_result() -> SuggestionResult {
        let catalog = vec![
            Disease::new("Disease A".into()).with_symptoms(["s1", "s2"]),
            Disease::new("Disease B".into()).with_symptoms(["s1", "s2", "s3"]),
            Disease::new("Disease C".into()).with_symptoms(["s1"]),
        ];
        let presented: BTreeSet<String> = ["s1", "s2"].iter().map(|s| s.to_string()).collect();
        suggest(&presented, &catalog)
    }

    #[test]
    fn test_report_preserves_order() {
        let report = SuggestionReport::from_result("c1", &make_result());

        let names: Vec<&str> = report.entries.iter().map(|e| e.disease_name.as_str()).collect();
        assert_eq!(names, vec!["Disease A", "Disease B", "Disease C"]);
        assert_eq!(report.entries[0].percentage, "100%");
        assert_eq!(report.entries[1].percentage, "80%");
        assert_eq!(report.entries[2].common_symptoms, 1);
    }

    #[test]
    fn test_to_json() {
        let report = SuggestionReport::from_result("c1", &make_result());
        let json = report.to_json().unwrap();

        assert!(json.contains("\"consultation_id\": \"c1\""));
        assert!(json.contains("\"percentage\": \"67%\""));

        let parsed: SuggestionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_to_csv() {
        let mut report = SuggestionReport::from_result("c1", &make_result());
        report.entries[2].disease_name = "Flu, canine".into();
        let csv = report.to_csv();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("consultation_id,rank"));
        assert!(lines[1].contains(",1,"));
        assert!(lines[1].contains("100.2,100%,2"));
        assert!(lines[3].contains("\"Flu, canine\""));
    }

    #[test]
    fn test_empty_report() {
        let report = SuggestionReport::from_result("c1", &SuggestionResult::default());
        assert!(report.entries.is_empty());
        assert_eq!(report.to_csv().lines().count(), 1);
    }
}
