//! Per-session conversation state
//!
//! The lookup lifecycle is an explicit tagged phase rather than a set of
//! optionally-populated fields: `AwaitingName` → `AwaitingRecord` → `Ready`.
//! `Ready` is terminal for the lookup phase; every later turn is a query
//! turn. State is owned by exactly one session and mutated only by the
//! conversation router.

use crate::records::DischargeRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Where a session is in the lookup lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Phase {
    /// No name recorded yet; the next plausible name input starts a lookup.
    AwaitingName,

    /// Name recorded, no discharge report found yet. Lookup is retried every
    /// turn until it succeeds.
    AwaitingRecord { name: String },

    /// Discharge report on file; all further turns are query turns.
    Ready {
        name: String,
        record: DischargeRecord,
    },
}

impl Phase {
    /// The recorded patient name, empty until one is known.
    pub fn patient_name(&self) -> &str {
        match self {
            Phase::AwaitingName => "",
            Phase::AwaitingRecord { name } => name,
            Phase::Ready { name, .. } => name,
        }
    }

    /// The discharge record, present only in `Ready`.
    pub fn record(&self) -> Option<&DischargeRecord> {
        match self {
            Phase::Ready { record, .. } => Some(record),
            _ => None,
        }
    }
}

/// One user turn in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: String,

    pub user: String,

    #[serde(rename = "type")]
    pub kind: String,
}

/// One append-only audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,

    /// Acting role tag ("Receptionist" or "Clinical").
    pub role: String,

    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<String>,
}

impl LogEntry {
    pub fn new(role: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            role: role.into(),
            action: action.into(),
            query: None,
            patient: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_patient(mut self, patient: impl Into<String>) -> Self {
        self.patient = Some(patient.into());
        self
    }
}

/// State for one conversation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Lookup lifecycle phase (carries name and record once known).
    pub phase: Phase,

    /// Ordered user turns with timestamps.
    pub conversation_history: Vec<HistoryEntry>,

    /// The query currently being answered.
    pub current_query: String,

    /// The last response produced for this session.
    pub agent_response: String,

    /// Append-only audit log.
    pub interaction_log: Vec<LogEntry>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: Phase::AwaitingName,
            conversation_history: Vec::new(),
            current_query: String::new(),
            agent_response: String::new(),
            interaction_log: Vec::new(),
        }
    }

    /// Append a timestamped user turn to the conversation history.
    pub fn record_user_turn(&mut self, input: &str) {
        self.conversation_history.push(HistoryEntry {
            timestamp: Utc::now().to_rfc3339(),
            user: input.to_string(),
            kind: "user_input".to_string(),
        });
    }

    /// Append an audit entry.
    pub fn log(&mut self, entry: LogEntry) {
        self.interaction_log.push(entry);
    }

    /// Whether a discharge report is on file for this session.
    pub fn has_discharge_report(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    /// The patient name, empty until resolved.
    pub fn patient_name(&self) -> &str {
        self.phase.patient_name()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
