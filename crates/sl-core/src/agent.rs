use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;
use crate::config::SyncConfig;
use crate::constants::DEFAULT_ANGLE_DEG;
use crate::event::Event;
use crate::geometry::synthesize;
use crate::time::to_iso8601;

/// A participant in the network with append-only directional logs.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub outgoing: Vec<Event>,
    pub incoming: Vec<Event>,
    pub partners: BTreeSet<String>,
    /// Bookkeeping only; never feeds a score.
    pub last_update: DateTime<Utc>,
}

/// Directional traits of one agent, each derived from its own stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    /// Angle of the incoming geometry (90° without one).
    pub receptivity: f64,
    /// Angle of the outgoing geometry (90° without one).
    pub assertiveness: f64,
    /// Quantized payload of the latest outgoing session (1 without one).
    pub capacity: f64,
    /// Symmetry score of the outgoing geometry (0 without one).
    pub reliability: f64,
}

/// Serializable view of an agent for reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub id: String,
    pub name: String,
    pub interaction_count: usize,
    pub interaction_partners: Vec<String>,
    pub last_update: String,
}

impl Agent {
    pub fn new(id: &str, name: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.map_or_else(|| format!("Agent_{id}"), str::to_string),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            partners: BTreeSet::new(),
            last_update: Utc::now(),
        }
    }

    pub fn record_outgoing(&mut self, event: Event) {
        self.partners.insert(event.receiver.clone());
        self.outgoing.push(event);
        self.last_update = Utc::now();
    }

    pub fn record_incoming(&mut self, event: Event) {
        self.partners.insert(event.sender.clone());
        self.incoming.push(event);
        self.last_update = Utc::now();
    }

    pub fn interaction_count(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }

    /// Synthesize and classify each stream independently.
    pub fn profile(&self, config: &SyncConfig) -> AgentProfile {
        let incoming = synthesize(&self.incoming, &config.time, &config.bias);
        let outgoing = synthesize(&self.outgoing, &config.time, &config.bias);

        let reliability = outgoing.as_ref().map_or(0.0, |g| {
            Classifier::new(&config.classifier)
                .classify_geometry(g)
                .symmetry_score
        });

        AgentProfile {
            id: self.id.clone(),
            receptivity: incoming.as_ref().map_or(DEFAULT_ANGLE_DEG, |g| g.angle_deg),
            assertiveness: outgoing.as_ref().map_or(DEFAULT_ANGLE_DEG, |g| g.angle_deg),
            capacity: outgoing.as_ref().map_or(1.0, |g| g.val_b),
            reliability,
        }
    }

    pub fn summary(&self) -> AgentSummary {
        AgentSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            interaction_count: self.interaction_count(),
            interaction_partners: self.partners.iter().cloned().collect(),
            last_update: to_iso8601(self.last_update),
        }
    }
}
