//! Turn classification heuristics
//!
//! Two substring checks drive the router: whether an input looks like a full
//! name, and whether a query is clinical or administrative. Both are
//! case-insensitive containment tests, deliberately simple and deterministic.

/// Medical vocabulary: symptom, treatment, and drug terms.
const MEDICAL_VOCABULARY: &[&str] = &[
    "pain",
    "medication",
    "symptoms",
    "side effects",
    "dosage",
    "treatment",
    "kidney",
    "dialysis",
    "blood pressure",
    "diet",
    "swelling",
    "worried",
    "concern",
    "feeling",
    "hurt",
    "ache",
    "research",
    "study",
    "latest",
    "new",
    "inhibitor",
    "drug",
    "should i",
    "what if",
    "is it normal",
    "help",
    "advice",
];

/// Question patterns that also mark a query as clinical.
const QUESTION_PATTERNS: &[&str] = &["?", "should i", "what", "how", "why", "when", "can i"];

/// Words that disqualify an input from being treated as a name.
const NON_NAME_WORDS: &[&str] = &["help", "hello", "hi"];

/// How a query is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryClass {
    /// Answered through the reference/search pipeline.
    Clinical,

    /// Answered by the receptionist prompt.
    Administrative,
}

/// Classify a query as clinical or administrative.
///
/// A query is clinical when ANY entry of the medical vocabulary OR any
/// question pattern appears in it (case-insensitive substring). The two
/// lists are a plain OR with no priority between them, so a message carrying
/// only a question pattern still routes clinical. That precedence is
/// load-bearing: administrative-sounding questions with any medical signal
/// must reach the clinical path, never the other way around.
pub fn classify(query: &str) -> QueryClass {
    let lowered = query.to_lowercase();

    let is_clinical = MEDICAL_VOCABULARY.iter().any(|kw| lowered.contains(kw))
        || QUESTION_PATTERNS.iter().any(|p| lowered.contains(p));

    if is_clinical {
        QueryClass::Clinical
    } else {
        QueryClass::Administrative
    }
}

/// Does this input look like a full name?
///
/// True when the input has two or more whitespace-separated tokens and none
/// of the greeting words appear anywhere in it (case-insensitive substring).
pub fn looks_like_name(input: &str) -> bool {
    if input.split_whitespace().count() < 2 {
        return false;
    }

    let lowered = input.to_lowercase();
    !NON_NAME_WORDS.iter().any(|w| lowered.contains(w))
}
