use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::config::{BiasConfig, TimeConfig};
use crate::event::Event;
use crate::time::minutes_between;

/// A maximal run of events whose consecutive gaps stay within the
/// configured session gap. Borrowed from the log it was grouped from and
/// rebuilt on every geometry computation.
#[derive(Clone, Debug)]
pub struct Session<'a> {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Upper-cased type tags seen in this session (`DEFAULT` for untagged).
    pub types: BTreeSet<String>,
    pub events: Vec<&'a Event>,
}

impl<'a> Session<'a> {
    fn open(event: &'a Event) -> Self {
        let mut session = Self {
            start: event.timestamp,
            end: event.timestamp,
            types: BTreeSet::new(),
            events: Vec::new(),
        };
        session.extend(event);
        session
    }

    fn extend(&mut self, event: &'a Event) {
        self.end = event.timestamp;
        self.types.insert(event.kind_or_default().to_string());
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn has_reaction(&self) -> bool {
        self.events.iter().any(|e| e.has_reactions())
    }

    pub fn has_privileged(&self, bias: &BiasConfig) -> bool {
        self.types.iter().any(|t| bias.is_privileged(t))
    }

    /// Payload weight of this session: the heaviest type tag (unknown tags
    /// weigh 1), plus one if anything in the session drew a reaction.
    pub fn payload(&self, bias: &BiasConfig) -> f64 {
        let heaviest = self.types.iter().map(|t| bias.weight(t)).fold(0.0, f64::max);
        let reaction_bonus = if self.has_reaction() { 1.0 } else { 0.0 };
        heaviest + reaction_bonus
    }
}

/// Group events into sessions. Input is re-sorted chronologically first, so
/// the returned sessions are time-ordered whatever order the log was
/// appended in.
///
/// A new session opens when the gap since the current session's end
/// strictly exceeds the configured session gap.
pub fn group_sessions<'a>(events: &'a [Event], time: &TimeConfig) -> Vec<Session<'a>> {
    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let gap = time.session_gap_minutes();
    let mut sessions: Vec<Session<'a>> = Vec::new();
    for event in ordered {
        match sessions.last_mut() {
            Some(current) if minutes_between(current.end, event.timestamp) <= gap => {
                current.extend(event);
            }
            _ => sessions.push(Session::open(event)),
        }
    }
    sessions
}
