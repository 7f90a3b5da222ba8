use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_TYPE;
use crate::error::{Result, SyncError};
use crate::time::parse_timestamp;

/// A single timestamped, directed interaction from one agent to another.
///
/// Construct through [`Event::new`] or [`Event::at`]; both enforce non-empty,
/// distinct endpoints. The type tag is stored upper-cased so lookups against
/// the payload and privileged tables never depend on the caller's casing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub sender: String,
    pub receiver: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reactions: Vec<String>,
    #[serde(default)]
    pub engagement: f64,
}

/// Identity used to deduplicate admissions. Engagement is derived data and
/// does not participate.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    sender: String,
    receiver: String,
    timestamp_ms: i64,
    kind: Option<String>,
    reactions: Vec<String>,
}

impl Event {
    /// Validate endpoints and parse an ISO-8601 timestamp.
    pub fn new(sender: &str, receiver: &str, timestamp: &str) -> Result<Self> {
        validate_endpoints(sender, receiver)?;
        let ts = parse_timestamp(timestamp)
            .ok_or_else(|| SyncError::InvalidTimestamp(timestamp.to_string()))?;
        Self::at(sender, receiver, ts)
    }

    /// Validate endpoints for an already-parsed instant.
    pub fn at(sender: &str, receiver: &str, timestamp: DateTime<Utc>) -> Result<Self> {
        validate_endpoints(sender, receiver)?;
        Ok(Self {
            sender: sender.trim().to_string(),
            receiver: receiver.trim().to_string(),
            timestamp,
            kind: None,
            reactions: Vec::new(),
            engagement: 0.0,
        })
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        let kind = kind.trim();
        self.kind = (!kind.is_empty()).then(|| kind.to_uppercase());
        self
    }

    pub fn with_reactions<I, S>(mut self, reactions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reactions = reactions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_engagement(mut self, engagement: f64) -> Self {
        self.engagement = engagement;
        self
    }

    /// Type tag, or `DEFAULT` when the event carries none.
    pub fn kind_or_default(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_TYPE)
    }

    pub fn has_reactions(&self) -> bool {
        !self.reactions.is_empty()
    }

    /// Whether this event travels between `a` and `b`, in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.sender == a && self.receiver == b) || (self.sender == b && self.receiver == a)
    }

    /// Re-check the endpoint invariant. Fields are public, so callers that
    /// assemble an `Event` by hand are checked again at admission.
    pub fn validate(&self) -> Result<()> {
        validate_endpoints(&self.sender, &self.receiver)
    }

    pub fn key(&self) -> EventKey {
        EventKey {
            sender: self.sender.clone(),
            receiver: self.receiver.clone(),
            timestamp_ms: self.timestamp.timestamp_millis(),
            kind: self.kind.clone(),
            reactions: self.reactions.clone(),
        }
    }
}

fn validate_endpoints(sender: &str, receiver: &str) -> Result<()> {
    let sender = sender.trim();
    let receiver = receiver.trim();
    if sender.is_empty() {
        return Err(SyncError::MissingField("sender"));
    }
    if receiver.is_empty() {
        return Err(SyncError::MissingField("receiver"));
    }
    if sender == receiver {
        return Err(SyncError::SelfInteraction(sender.to_string()));
    }
    Ok(())
}

/// Sort events chronologically. Stable, so equal timestamps keep input order.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by_key(|e| e.timestamp);
}
