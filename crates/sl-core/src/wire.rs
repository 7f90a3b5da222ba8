//! JSON wire format for event logs and network reports.
//!
//! Event records use the loader's field names (`sender`, `receiver`,
//! `timestamp`, `type`, `reactions`, `engagement`/`attention`). Every field
//! is optional on the wire so that malformed records reach admission and get
//! rejected with a reason instead of failing the whole document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::event::Event;
use crate::network::NetworkReport;

/// One raw interaction record as supplied by a loader.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub receiver: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Reaction markers; non-string markers are kept as their JSON text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reactions: Option<Vec<Value>>,
    #[serde(default, alias = "attention", skip_serializing_if = "Option::is_none")]
    pub engagement: Option<f64>,
}

impl EventRecord {
    pub fn new(sender: &str, receiver: &str, timestamp: &str) -> Self {
        Self {
            sender: Some(sender.to_string()),
            receiver: Some(receiver.to_string()),
            timestamp: Some(timestamp.to_string()),
            ..Default::default()
        }
    }

    pub fn has_reactions(&self) -> bool {
        self.reactions.as_ref().is_some_and(|r| !r.is_empty())
    }

    fn reaction_markers(&self) -> Vec<String> {
        self.reactions
            .iter()
            .flatten()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }

    /// Validate and convert into an admissible [`Event`]. A missing
    /// engagement becomes 0; run
    /// [`annotate_engagement`](crate::engagement::annotate_engagement) first
    /// to score it instead.
    pub fn to_event(&self) -> Result<Event> {
        let sender = self.sender.as_deref().ok_or(SyncError::MissingField("sender"))?;
        let receiver = self
            .receiver
            .as_deref()
            .ok_or(SyncError::MissingField("receiver"))?;
        let timestamp = self
            .timestamp
            .as_deref()
            .ok_or(SyncError::MissingField("timestamp"))?;
        let mut event = Event::new(sender, receiver, timestamp)?
            .with_reactions(self.reaction_markers())
            .with_engagement(self.engagement.unwrap_or(0.0));
        if let Some(kind) = self.kind.as_deref() {
            event = event.with_kind(kind);
        }
        Ok(event)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum EventDocument {
    List(Vec<EventRecord>),
    Wrapped { events: Vec<EventRecord> },
}

/// Parse an event log: either a bare array of records or `{"events": [...]}`.
pub fn parse_events(json: &str) -> Result<Vec<EventRecord>> {
    let doc: EventDocument = serde_json::from_str(json)?;
    Ok(match doc {
        EventDocument::List(records) => records,
        EventDocument::Wrapped { events } => events,
    })
}

/// Serialize records back to a JSON array.
pub fn export_events(records: &[EventRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Serialize a network report.
pub fn export_report(report: &NetworkReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
