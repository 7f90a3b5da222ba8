use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentProfile, AgentSummary};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::event::{Event, EventKey};
use crate::pair::{DirectionalMetrics, PairKey, PairSynchronizer, SyncResult};
use crate::time::now_iso8601;
use crate::wire::EventRecord;

/// Outcome of admitting one valid event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// An identical event was already admitted; nothing changed.
    Duplicate,
}

/// Partial-success counts for a batch admission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub submitted: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
}

/// A connected group of synchronized agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    /// Sorted agent ids.
    pub agents: Vec<String>,
    pub size: usize,
    /// Analyzed pairs whose both agents are in the cluster.
    pub pair_count: usize,
    /// Mean score over those pairs.
    pub avg_sync_score: f64,
}

/// Fingerprint-level compatibility of two agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Compatibility {
    pub agents: (String, String),
    /// 0.4·potential + 0.3·alignment + 0.3·actualized.
    pub potential_sync: f64,
    /// 1 − |assertiveness(A) − receptivity(B)| / 180.
    pub potential: f64,
    /// Mean reliability of the two agents.
    pub alignment: f64,
    /// Current score of the registered pair, 0 if never analyzed.
    pub actualized_sync: f64,
    pub balance: f64,
    pub verified: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub total_events: usize,
    pub total_agents: usize,
    pub total_pairs: usize,
    pub synchronized_pairs: usize,
    pub synchronization_rate: f64,
    pub network_density: f64,
    pub average_sync_score: f64,
    pub cluster_count: usize,
    pub largest_cluster: usize,
}

/// One pair listed under a motif.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotifPair {
    pub agents: (String, String),
    pub sync_score: f64,
    pub fingerprint: Option<String>,
}

/// Registered pairs sharing a geometry category.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MotifGroup {
    pub category: String,
    pub pair_count: usize,
    pub pairs: Vec<MotifPair>,
}

/// A timestamped pair analysis kept in the bounded history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub timestamp: String,
    pub pair_key: String,
    pub result: SyncResult,
}

/// Snapshot of the whole network for export.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkReport {
    pub network_metrics: NetworkMetrics,
    pub agents: Vec<AgentSummary>,
    pub clusters: Vec<Cluster>,
    pub analysis_history: Vec<AnalysisRecord>,
    pub total_events: usize,
}

/// Owner of the global event log and the agent and pair registries.
///
/// Agents and pairs are created lazily. A registered pair's sublog is
/// rebuilt eagerly whenever an event touching that pair is admitted, so
/// every analysis sees the current log without a staleness check.
pub struct NetworkGraph {
    config: SyncConfig,
    events: Vec<Event>,
    seen: HashSet<EventKey>,
    agents: BTreeMap<String, Agent>,
    pairs: BTreeMap<PairKey, PairSynchronizer>,
    clusters: Vec<Cluster>,
    history: VecDeque<AnalysisRecord>,
}

impl NetworkGraph {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            events: Vec::new(),
            seen: HashSet::new(),
            agents: BTreeMap::new(),
            pairs: BTreeMap::new(),
            clusters: Vec::new(),
            history: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    pub fn pair(&self, a: &str, b: &str) -> Option<&PairSynchronizer> {
        self.pairs.get(&PairKey::new(a, b))
    }

    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// Latest cluster snapshot from `analyze_all_pairs`.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn history(&self) -> impl Iterator<Item = &AnalysisRecord> {
        self.history.iter()
    }

    /// Register an agent explicitly, e.g. to give it a display name. Returns
    /// `None` for a blank id.
    pub fn register_agent(&mut self, id: &str, name: Option<&str>) -> Option<&mut Agent> {
        let id = id.trim();
        if id.is_empty() {
            tracing::warn!("attempted to register agent with empty id");
            return None;
        }
        Some(
            self.agents
                .entry(id.to_string())
                .or_insert_with(|| Agent::new(id, name)),
        )
    }

    /// Admit one event. Invalid endpoints are logged and returned as an
    /// error; the log is left untouched.
    pub fn add_event(&mut self, event: Event) -> Result<Admission> {
        if let Err(e) = event.validate() {
            tracing::warn!("rejected event: {e}");
            return Err(e);
        }
        if !self.seen.insert(event.key()) {
            tracing::debug!(
                sender = %event.sender,
                receiver = %event.receiver,
                "duplicate event ignored"
            );
            return Ok(Admission::Duplicate);
        }

        let sender = event.sender.clone();
        let receiver = event.receiver.clone();
        self.events.push(event.clone());

        self.agents
            .entry(sender.clone())
            .or_insert_with(|| Agent::new(&sender, None))
            .record_outgoing(event.clone());
        self.agents
            .entry(receiver.clone())
            .or_insert_with(|| Agent::new(&receiver, None))
            .record_incoming(event);

        if let Some(pair) = self.pairs.get_mut(&PairKey::new(&sender, &receiver)) {
            pair.rebuild(&self.events);
        }
        Ok(Admission::Accepted)
    }

    /// Validate a raw record and admit it.
    pub fn add_record(&mut self, record: &EventRecord) -> Result<Admission> {
        match record.to_event() {
            Ok(event) => self.add_event(event),
            Err(e) => {
                tracing::warn!("rejected event: {e}");
                Err(e)
            }
        }
    }

    /// Admit a batch of records; bad records are skipped and counted.
    pub fn add_records<'a, I>(&mut self, records: I) -> IngestReport
    where
        I: IntoIterator<Item = &'a EventRecord>,
    {
        let mut report = IngestReport::default();
        for record in records {
            report.submitted += 1;
            match self.add_record(record) {
                Ok(Admission::Accepted) => report.accepted += 1,
                Ok(Admission::Duplicate) => report.duplicates += 1,
                Err(_) => report.rejected += 1,
            }
        }
        tracing::info!(
            "added {}/{} events ({} duplicate, {} rejected)",
            report.accepted,
            report.submitted,
            report.duplicates,
            report.rejected
        );
        report
    }

    /// Analyze one pair, creating its synchronizer on first use, and record
    /// the result in the bounded history. Pairs with an unknown agent are
    /// reported as insufficient and never registered.
    pub fn analyze_pair(&mut self, a: &str, b: &str) -> SyncResult {
        let key = PairKey::new(a, b);
        if !self.agents.contains_key(a) || !self.agents.contains_key(b) {
            tracing::debug!(pair = %key, "pair has an unknown agent");
            return SyncResult::insufficient(
                key.first(),
                key.second(),
                DirectionalMetrics::default(),
            );
        }
        let events = &self.events;
        let pair = self
            .pairs
            .entry(key.clone())
            .or_insert_with(|| PairSynchronizer::new(key.clone(), events));
        let result = pair.analyze(events, &self.config);
        pair.record_analysis();

        self.history.push_back(AnalysisRecord {
            timestamp: now_iso8601(),
            pair_key: key.to_string(),
            result: result.clone(),
        });
        while self.history.len() > self.config.network.history_limit {
            self.history.pop_front();
        }
        result
    }

    /// Analyze every unordered pair of known agents and refresh clusters.
    pub fn analyze_all_pairs(&mut self) -> Vec<SyncResult> {
        let ids: Vec<String> = self.agents.keys().cloned().collect();
        let mut results = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                results.push(self.analyze_pair(a, b));
            }
        }
        self.clusters = find_clusters(&results);
        results
    }

    /// Current results for every registered pair, without touching history.
    fn registered_results(&self) -> Vec<SyncResult> {
        self.pairs
            .values()
            .map(|p| p.analyze(&self.events, &self.config))
            .collect()
    }

    pub fn profile(&self, id: &str) -> Option<AgentProfile> {
        self.agents.get(id).map(|a| a.profile(&self.config))
    }

    /// Combine two agents' profiles with their actualized pair score.
    /// `None` if either agent is unknown.
    pub fn compare_fingerprints(&self, a: &str, b: &str) -> Option<Compatibility> {
        let fp_a = self.profile(a)?;
        let fp_b = self.profile(b)?;
        let actualized_sync = self
            .pair(a, b)
            .map_or(0.0, |p| p.analyze(&self.events, &self.config).score);

        let alignment = (fp_a.reliability + fp_b.reliability) / 2.0;
        let potential = if fp_a.capacity > 0.0 && fp_b.capacity > 0.0 {
            1.0 - (fp_a.assertiveness - fp_b.receptivity).abs() / 180.0
        } else {
            0.0
        };
        let balance =
            fp_a.capacity.min(fp_b.capacity) / fp_a.capacity.max(fp_b.capacity).max(1.0);

        Some(Compatibility {
            agents: (a.to_string(), b.to_string()),
            potential_sync: 0.4 * potential + 0.3 * alignment + 0.3 * actualized_sync,
            potential,
            alignment,
            actualized_sync,
            balance,
            verified: actualized_sync > 0.6 && alignment > 0.5,
        })
    }

    pub fn metrics(&self) -> NetworkMetrics {
        let total_agents = self.agents.len();
        let total_pairs = self.pairs.len();
        let synchronized: Vec<SyncResult> = self
            .registered_results()
            .into_iter()
            .filter(|r| r.synchronized)
            .collect();

        let possible_pairs = total_agents * total_agents.saturating_sub(1) / 2;
        NetworkMetrics {
            total_events: self.events.len(),
            total_agents,
            total_pairs,
            synchronized_pairs: synchronized.len(),
            synchronization_rate: ratio(synchronized.len(), total_pairs),
            network_density: ratio(total_pairs, possible_pairs),
            average_sync_score: if synchronized.is_empty() {
                0.0
            } else {
                synchronized.iter().map(|r| r.score).sum::<f64>() / synchronized.len() as f64
            },
            cluster_count: self.clusters.len(),
            largest_cluster: self.clusters.iter().map(|c| c.size).max().unwrap_or(0),
        }
    }

    /// Registered pairs grouped by geometry category, largest group first.
    pub fn motifs(&self) -> Vec<MotifGroup> {
        let mut groups: BTreeMap<String, Vec<MotifPair>> = BTreeMap::new();
        for result in self.registered_results() {
            groups
                .entry(result.category_name().to_string())
                .or_default()
                .push(MotifPair {
                    agents: result.agents.clone(),
                    sync_score: result.score,
                    fingerprint: result.fingerprint.clone(),
                });
        }
        let mut motifs: Vec<MotifGroup> = groups
            .into_iter()
            .map(|(category, mut pairs)| {
                pairs.sort_by(|x, y| y.sync_score.total_cmp(&x.sync_score));
                MotifGroup {
                    category,
                    pair_count: pairs.len(),
                    pairs,
                }
            })
            .collect();
        motifs.sort_by(|x, y| y.pair_count.cmp(&x.pair_count));
        motifs
    }

    pub fn report(&self) -> NetworkReport {
        NetworkReport {
            network_metrics: self.metrics(),
            agents: self.agents.values().map(Agent::summary).collect(),
            clusters: self.clusters.clone(),
            analysis_history: self.history.iter().cloned().collect(),
            total_events: self.events.len(),
        }
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 { 0.0 } else { n as f64 / d as f64 }
}

/// Connected components of the synchronized-pair graph.
///
/// Edges are results flagged `synchronized`; membership is graph
/// connectivity, so two agents can share a cluster without being
/// synchronized with each other. Components of two or more agents become
/// clusters, scored over every result in `results` lying inside them, and
/// are sorted by average score descending.
pub fn find_clusters(results: &[SyncResult]) -> Vec<Cluster> {
    let mut graph: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for r in results.iter().filter(|r| r.synchronized) {
        let (a, b) = (r.agents.0.as_str(), r.agents.1.as_str());
        graph.entry(a).or_default().insert(b);
        graph.entry(b).or_default().insert(a);
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut clusters = Vec::new();
    for &start in graph.keys() {
        if visited.contains(start) {
            continue;
        }
        let component = dfs_component(start, &graph, &mut visited);
        if component.len() < 2 {
            continue;
        }
        let inside: Vec<&SyncResult> = results
            .iter()
            .filter(|r| {
                component.contains(r.agents.0.as_str()) && component.contains(r.agents.1.as_str())
            })
            .collect();
        let avg_sync_score = if inside.is_empty() {
            0.0
        } else {
            inside.iter().map(|r| r.score).sum::<f64>() / inside.len() as f64
        };
        clusters.push(Cluster {
            size: component.len(),
            agents: component.into_iter().map(str::to_string).collect(),
            pair_count: inside.len(),
            avg_sync_score,
        });
    }

    clusters.sort_by(|x, y| {
        y.avg_sync_score
            .total_cmp(&x.avg_sync_score)
            .then_with(|| x.agents.cmp(&y.agents))
    });
    clusters
}

/// Iterative depth-first traversal from `start`.
fn dfs_component<'a>(
    start: &'a str,
    graph: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    visited: &mut HashSet<&'a str>,
) -> BTreeSet<&'a str> {
    let mut stack = vec![start];
    let mut component = BTreeSet::new();
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        component.insert(node);
        if let Some(neighbors) = graph.get(node) {
            stack.extend(neighbors.iter().filter(|n| !visited.contains(*n)));
        }
    }
    component
}
