//! Prompt templates for the two response-generation paths
//!
//! All model prompts are assembled here so the router body stays readable
//! and the exact wording is testable in one place.

use crate::records::DischargeRecord;

/// Personalize a reference-library answer with the patient's record.
pub fn personalized_clinical(reference_answer: &str, record: &DischargeRecord) -> String {
    format!(
        "Based on the nephrology reference materials: {}\n\n\
         Patient context:\n\
         - Name: {}\n\
         - Diagnosis: {}\n\
         - Medications: {}\n\
         - Dietary restrictions: {}\n\n\
         Provide a personalized response considering their specific condition. \
         Always remind them to consult with their healthcare provider.",
        reference_answer,
        record.patient_name,
        record.diagnosis_display(),
        record.medications_display(),
        record.dietary_restrictions_display(),
    )
}

/// Synthesize an answer from web search results when the reference library
/// is unavailable.
pub fn web_fallback(query: &str, search_results: &str, record: Option<&DischargeRecord>) -> String {
    let diagnosis = record
        .map(|r| r.diagnosis_display().to_string())
        .unwrap_or_else(|| "not available".to_string());

    format!(
        "Patient asked: \"{}\"\n\
         Web search results: {}\n\
         Patient diagnosis: {}\n\n\
         Provide a helpful medical response based on the web search results. \
         Include disclaimers about consulting healthcare providers. \
         Note: this information comes from a web search because the medical \
         reference system is temporarily unavailable.",
        query, search_results, diagnosis,
    )
}

/// Receptionist prompt for administrative questions.
pub fn receptionist(patient_name: &str, record: Option<&DischargeRecord>, query: &str) -> String {
    let discharge_info = record
        .and_then(|r| serde_json::to_string_pretty(r).ok())
        .unwrap_or_else(|| "not available".to_string());

    format!(
        "You are a medical receptionist. Patient {} is asking: \"{}\"\n\n\
         Their discharge information: {}\n\n\
         Provide a helpful response for administrative and scheduling questions. \
         If the question is medical, direct them to ask it as a medical question.",
        patient_name, query, discharge_info,
    )
}
