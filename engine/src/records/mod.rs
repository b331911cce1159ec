//! Patient discharge record store
//!
//! Loads the discharge report file once at startup and serves
//! case-insensitive exact-name lookups for the rest of the process lifetime.
//! A missing or malformed file degrades to an empty store: the service keeps
//! running and every lookup simply misses.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// A single patient discharge report.
///
/// Loaded from a flat JSON object; immutable once loaded and shared
/// read-only across all sessions. Fields absent from the file default to
/// empty and render as "N/A" in responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DischargeRecord {
    #[serde(default)]
    pub patient_name: String,

    #[serde(default)]
    pub discharge_date: String,

    #[serde(default)]
    pub primary_diagnosis: String,

    #[serde(default)]
    pub medications: Vec<String>,

    #[serde(default)]
    pub dietary_restrictions: String,
}

impl DischargeRecord {
    /// Discharge date, or "N/A" when the file omitted it.
    pub fn discharge_date_display(&self) -> &str {
        or_na(&self.discharge_date)
    }

    /// Primary diagnosis, or "N/A" when the file omitted it.
    pub fn diagnosis_display(&self) -> &str {
        or_na(&self.primary_diagnosis)
    }

    /// Dietary restrictions, or "N/A" when the file omitted them.
    pub fn dietary_restrictions_display(&self) -> &str {
        or_na(&self.dietary_restrictions)
    }

    /// Medication list joined for prompt embedding, or "N/A" when empty.
    pub fn medications_display(&self) -> String {
        if self.medications.is_empty() {
            "N/A".to_string()
        } else {
            self.medications.join(", ")
        }
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// In-memory store of discharge records.
pub struct RecordStore {
    records: Vec<DischargeRecord>,
}

impl RecordStore {
    /// Load records from the given JSON file.
    ///
    /// The file must contain a JSON array of flat record objects. On a
    /// missing file or malformed content the store starts empty; the
    /// condition is logged but never fails the process.
    pub fn load(path: &Path) -> Self {
        info!("Loading patient reports from {:?}", path);

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                error!("Record file {:?} could not be read: {}", path, e);
                return Self { records: Vec::new() };
            }
        };

        match serde_json::from_str::<Vec<DischargeRecord>>(&contents) {
            Ok(records) => {
                info!("Loaded {} patient reports", records.len());
                Self { records }
            }
            Err(e) => {
                error!("Error parsing records from {:?}: {}", path, e);
                Self { records: Vec::new() }
            }
        }
    }

    /// Create a store from records already in memory. Used by tests and by
    /// alternative loaders.
    pub fn from_records(records: Vec<DischargeRecord>) -> Self {
        Self { records }
    }

    /// Case-insensitive exact match on the stored patient name.
    ///
    /// Returns the first match in file order; no fuzzy or partial matching.
    /// Comparison is on lowercased forms so accented names match too.
    pub fn find(&self, name: &str) -> Option<&DischargeRecord> {
        let wanted = name.to_lowercase();
        let result = self
            .records
            .iter()
            .find(|r| r.patient_name.to_lowercase() == wanted);

        match result {
            Some(record) => {
                info!("Found discharge report for patient: {}", record.patient_name);
            }
            None => {
                warn!("No discharge report found for patient: {}", name);
            }
        }

        result
    }

    /// Number of loaded records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(name: &str) -> DischargeRecord {
        DischargeRecord {
            patient_name: name.to_string(),
            discharge_date: "2024-03-01".to_string(),
            primary_diagnosis: "Chronic kidney disease stage 3".to_string(),
            medications: vec!["Lisinopril 10mg".to_string()],
            dietary_restrictions: "Low sodium".to_string(),
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let store = RecordStore::from_records(vec![sample_record("John Smith")]);

        assert!(store.find("john smith").is_some());
        assert!(store.find("JOHN SMITH").is_some());
        assert_eq!(store.find("John Smith").unwrap().patient_name, "John Smith");
    }

    #[test]
    fn test_find_handles_accented_names() {
        let store = RecordStore::from_records(vec![sample_record("José García")]);

        assert!(store.find("josé garcía").is_some());
        assert!(store.find("JOSÉ GARCÍA").is_some());
        assert!(store.find("Jose Garcia").is_none());
    }

    #[test]
    fn test_find_requires_exact_match() {
        let store = RecordStore::from_records(vec![sample_record("John Smith")]);

        assert!(store.find("John").is_none());
        assert!(store.find("John Smithe").is_none());
        assert!(store.find("").is_none());
    }

    #[test]
    fn test_find_first_match_wins() {
        let mut first = sample_record("Ana Torres");
        first.discharge_date = "2024-01-05".to_string();
        let mut second = sample_record("Ana Torres");
        second.discharge_date = "2024-02-10".to_string();

        let store = RecordStore::from_records(vec![first, second]);
        assert_eq!(store.find("ana torres").unwrap().discharge_date, "2024-01-05");
    }

    #[test]
    fn test_display_helpers_fall_back_to_na() {
        let record = DischargeRecord {
            patient_name: "X Y".to_string(),
            discharge_date: String::new(),
            primary_diagnosis: "  ".to_string(),
            medications: Vec::new(),
            dietary_restrictions: String::new(),
        };

        assert_eq!(record.discharge_date_display(), "N/A");
        assert_eq!(record.diagnosis_display(), "N/A");
        assert_eq!(record.medications_display(), "N/A");
        assert_eq!(record.dietary_restrictions_display(), "N/A");
    }

    #[test]
    fn test_missing_file_yields_empty_store() {
        let store = RecordStore::load(Path::new("/nonexistent/reports.json"));
        assert_eq!(store.record_count(), 0);
    }
}
