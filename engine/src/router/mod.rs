//! Conversation Router
//!
//! This module implements the per-turn decision logic of the assistant.
//! Each inbound message advances one session through three phases:
//!
//! 1. No name yet: decide whether the input looks like a full name; if so,
//!    record it and attempt a discharge-report lookup immediately
//! 2. Name known, no report: retry the lookup (idempotent until it succeeds)
//! 3. Report on file: classify the query and dispatch to the clinical or
//!    administrative response path
//!
//! No error from any external collaborator escapes a turn. Every call site
//! maps failure to a static user-facing string, and no call is ever retried.
//!
//! # Limits
//!
//! - 30-second timeout per LLM call

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::llm::{LLMError, LLMProvider, Message};
use crate::records::{DischargeRecord, RecordStore};
use crate::reference::{ReferenceClient, ReferenceOutcome};
use crate::search::SearchClient;

pub mod classify;
pub mod prompts;
mod state;

pub use classify::{classify, looks_like_name, QueryClass};
pub use state::{HistoryEntry, LogEntry, Phase, SessionState};

/// Timeout for each LLM call in seconds
const LLM_TIMEOUT_SECS: u64 = 30;

/// Greeting used whenever no plausible name has been provided yet.
pub const NAME_PROMPT: &str = "Hello! Welcome to the nephrology clinic. Could you please \
     provide your full name so I can look up your discharge information?";

/// Apology for model failures on the clinical path.
pub const CLINICAL_APOLOGY: &str = "I encountered an error processing your request. Please try \
     again or consult with your healthcare provider.";

/// Apology for search failures on the clinical fallback path.
pub const SEARCH_APOLOGY: &str = "I'm having trouble accessing medical information right now. \
     Please consult with your healthcare provider for this specific question.";

/// Apology for model failures on the administrative path.
pub const ADMIN_APOLOGY: &str = "I'm having trouble processing your request right now. Please \
     try again or contact our office directly.";

/// Suffix appended to reference answers served without patient context.
pub const SAFETY_DISCLAIMER: &str =
    "Please consult with your healthcare provider for personalized medical advice.";

/// Footer appended to answers synthesized from web search results.
pub const WEB_SOURCE_FOOTER: &str =
    "[Source: Web search results - medical reference temporarily unavailable]";

/// The conversation router.
///
/// Holds shared read-only collaborators; all per-session mutable state lives
/// in [`SessionState`] and is passed in by the caller, which is responsible
/// for serializing turns of the same session.
pub struct ConversationRouter {
    llm: Arc<dyn LLMProvider>,
    records: Arc<RecordStore>,
    reference: Arc<ReferenceClient>,
    search: Arc<SearchClient>,
}

impl ConversationRouter {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        records: Arc<RecordStore>,
        reference: Arc<ReferenceClient>,
        search: Arc<SearchClient>,
    ) -> Self {
        Self {
            llm,
            records,
            reference,
            search,
        }
    }

    /// Advance a session by one turn.
    ///
    /// Mutates `state` in place: appends the user turn to the conversation
    /// history, applies the phase rules, and leaves the response text in
    /// `state.agent_response`. Never fails the turn.
    pub async fn step(&self, state: &mut SessionState, input: &str) {
        state.record_user_turn(input);

        match state.phase.clone() {
            Phase::AwaitingName => {
                let trimmed = input.trim();
                if !trimmed.is_empty() && looks_like_name(trimmed) {
                    info!("Patient name set to: {}", trimmed);
                    state.phase = Phase::AwaitingRecord {
                        name: trimmed.to_string(),
                    };
                    self.attempt_lookup(state);
                } else {
                    debug!("Input does not look like a name, asking again");
                    state.agent_response = NAME_PROMPT.to_string();
                }
            }

            Phase::AwaitingRecord { .. } => {
                self.attempt_lookup(state);
            }

            Phase::Ready { name, record } => {
                state.current_query = input.to_string();
                self.answer_query(state, &name, &record).await;
            }
        }
    }

    /// Look up the discharge report for the recorded name.
    ///
    /// On a hit the session transitions to `Ready` and the greeting echoes
    /// the discharge date and diagnosis from the record. On a miss the
    /// session stays where it is so the next turn retries.
    fn attempt_lookup(&self, state: &mut SessionState) {
        let name = state.patient_name().to_string();
        debug!("Handling patient lookup for: {}", name);

        match self.records.find(&name) {
            Some(record) => {
                let record = record.clone();

                state.agent_response = format!(
                    "Hi {}! I found your discharge report from {} for {}. How are you \
                     feeling today? Are you following your medication schedule?",
                    name,
                    record.discharge_date_display(),
                    record.diagnosis_display(),
                );

                state.log(
                    LogEntry::new("Receptionist", "Retrieved discharge report")
                        .with_patient(&name),
                );

                state.phase = Phase::Ready { name, record };
            }
            None => {
                state.agent_response = format!(
                    "I apologize, but I couldn't find a discharge report for {}. Could \
                     you please verify the spelling of your name?",
                    name
                );
            }
        }
    }

    /// Classify the current query and dispatch it.
    async fn answer_query(&self, state: &mut SessionState, name: &str, record: &DischargeRecord) {
        let query = state.current_query.clone();

        match classify(&query) {
            QueryClass::Clinical => {
                info!("Query identified as clinical: {}", query);

                state.log(
                    LogEntry::new("Receptionist", "Routed to clinical agent").with_query(&query),
                );

                state.agent_response = self.clinical_answer(&query, Some(record)).await;

                state.log(
                    LogEntry::new("Clinical", "Answered clinical query")
                        .with_query(&query)
                        .with_patient(name),
                );
            }
            QueryClass::Administrative => {
                info!("Query identified as administrative: {}", query);
                state.agent_response = self.receptionist_answer(name, Some(record), &query).await;
            }
        }
    }

    /// Produce a clinical answer for a query.
    ///
    /// Tries the reference library first. A usable answer is personalized
    /// with the discharge record through a second model call (or returned
    /// with a safety disclaimer when no record is supplied). Anything else
    /// falls back to one web search plus one model call, with a source
    /// footer. All failures collapse into apology text.
    pub async fn clinical_answer(&self, query: &str, record: Option<&DischargeRecord>) -> String {
        let outcome = self.reference.query(query).await;

        if let ReferenceOutcome::Answer { text, .. } = &outcome {
            if outcome.is_usable() {
                return match record {
                    Some(record) => {
                        debug!("Reference answer usable; personalizing with patient context");
                        let prompt = prompts::personalized_clinical(text, record);
                        match self.generate(&prompt).await {
                            Ok(content) => content,
                            Err(e) => {
                                warn!("Personalization call failed: {}", e);
                                CLINICAL_APOLOGY.to_string()
                            }
                        }
                    }
                    None => format!("{}\n\n{}", text, SAFETY_DISCLAIMER),
                };
            }
        }

        // Reference unavailable, errored, or too short: fall back to one
        // web search call.
        warn!("Reference library not usable, falling back to web search");

        let results = match self.search.search(&format!("nephrology {}", query)).await {
            Ok(results) => results,
            Err(e) => {
                warn!("Web search failed: {}", e);
                return SEARCH_APOLOGY.to_string();
            }
        };

        let prompt = prompts::web_fallback(query, &results, record);
        match self.generate(&prompt).await {
            Ok(content) => format!("{}\n\n{}", content, WEB_SOURCE_FOOTER),
            Err(e) => {
                warn!("Web fallback model call failed: {}", e);
                CLINICAL_APOLOGY.to_string()
            }
        }
    }

    /// Answer an administrative question with one receptionist model call.
    async fn receptionist_answer(
        &self,
        name: &str,
        record: Option<&DischargeRecord>,
        query: &str,
    ) -> String {
        let prompt = prompts::receptionist(name, record, query);

        match self.generate(&prompt).await {
            Ok(content) => content,
            Err(e) => {
                warn!("Receptionist model call failed: {}", e);
                ADMIN_APOLOGY.to_string()
            }
        }
    }

    /// One LLM call with an explicit timeout.
    async fn generate(&self, prompt: &str) -> Result<String, LLMError> {
        let messages = [Message::user(prompt)];

        match timeout(
            Duration::from_secs(LLM_TIMEOUT_SECS),
            self.llm.generate(&messages),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!("LLM call timed out after {}s", LLM_TIMEOUT_SECS);
                Err(LLMError::Timeout)
            }
        }
    }
}
