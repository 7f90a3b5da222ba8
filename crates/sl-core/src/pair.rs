//! Pairwise synchronization between two agents.
//!
//! A `PairSynchronizer` owns the pair's private sublog (events strictly
//! between its two agents, chronological) and turns it into a
//! `SyncResult`: directional metrics, a reciprocity-boosted geometry and its
//! classification, a composite score, phase, subjective time and
//! fingerprint. Results are recomputed on every call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, Classifier};
use crate::config::{BiasConfig, SyncConfig};
use crate::constants::{
    ALIGNED_THRESHOLD, COHERENT_THRESHOLD, ENTANGLED_THRESHOLD, MAX_CATEGORY_ID,
    RECIPROCITY_LIMIT, REFERENCE_MINUTES,
};
use crate::event::{Event, sort_chronologically};
use crate::fingerprint::pair_fingerprint;
use crate::geometry::{Geometry, synthesize};

/// Order-independent pair identity: ids stored sorted.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }

    pub fn contains(&self, agent: &str) -> bool {
        self.first == agent || self.second == agent
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.second)
    }
}

/// Phase band of a pair, or the insufficient-history outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    InsufficientData,
    Decoherent,
    Coherent,
    Aligned,
    Entangled,
}

impl SyncState {
    pub fn from_score(score: f64) -> Self {
        if score >= ENTANGLED_THRESHOLD {
            Self::Entangled
        } else if score >= ALIGNED_THRESHOLD {
            Self::Aligned
        } else if score >= COHERENT_THRESHOLD {
            Self::Coherent
        } else {
            Self::Decoherent
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientData => "INSUFFICIENT_DATA",
            Self::Decoherent => "DECOHERENT",
            Self::Coherent => "COHERENT",
            Self::Aligned => "ALIGNED",
            Self::Entangled => "ENTANGLED",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction-split statistics over a pair's sublog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectionalMetrics {
    pub a_to_b: usize,
    pub b_to_a: usize,
    /// 1 − |mean engagement A→B − mean engagement B→A|; an empty direction
    /// contributes a mean of 0.
    pub engagement_symmetry: f64,
    /// min(count)/max(count); 0 when the sublog is empty.
    pub directional_balance: f64,
}

impl DirectionalMetrics {
    pub fn measure(events: &[Event], agent_a: &str, agent_b: &str) -> Self {
        let (mut a_to_b, mut b_to_a) = (0usize, 0usize);
        let (mut sum_ab, mut sum_ba) = (0.0, 0.0);
        for e in events {
            if e.sender == agent_a && e.receiver == agent_b {
                a_to_b += 1;
                sum_ab += e.engagement;
            } else if e.sender == agent_b && e.receiver == agent_a {
                b_to_a += 1;
                sum_ba += e.engagement;
            }
        }
        let mean = |sum: f64, n: usize| if n > 0 { sum / n as f64 } else { 0.0 };
        let directional_balance = match a_to_b.max(b_to_a) {
            0 => 0.0,
            max => a_to_b.min(b_to_a) as f64 / max as f64,
        };
        Self {
            a_to_b,
            b_to_a,
            engagement_symmetry: 1.0 - (mean(sum_ab, a_to_b) - mean(sum_ba, b_to_a)).abs(),
            directional_balance,
        }
    }

    /// Factor applied to edges a and b: full strength above the reciprocity
    /// limit, otherwise 0.4 + 0.6·balance.
    pub fn reciprocity_boost(&self) -> f64 {
        if self.directional_balance > RECIPROCITY_LIMIT {
            1.0
        } else {
            0.4 + 0.6 * self.directional_balance
        }
    }
}

/// Perceived compression of an hour between two synchronized agents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubjectiveTime {
    pub time_effect: f64,
    pub perceived_minutes: f64,
}

impl SubjectiveTime {
    pub fn compute(geometry: &Geometry, classification: &Classification, score: f64) -> Self {
        let mag_a = geometry.a.magnitude().max(1.0);
        let mag_b = geometry.b.magnitude().max(1.0);
        let symmetry_multiplier = f64::from(classification.category_id) / MAX_CATEGORY_ID;
        let combined_magnitude = mag_a * mag_b * (0.5 + symmetry_multiplier);
        let combined_weight = 0.4 * classification.symmetry_score + 0.6 * score;
        let time_effect =
            1.0 / (1.0 + (combined_magnitude.max(1.0) + 1.0).ln() * combined_weight);
        Self {
            time_effect,
            perceived_minutes: REFERENCE_MINUTES * time_effect,
        }
    }

    pub fn description(&self) -> String {
        format!("1 hour feels like {:.0} minutes", self.perceived_minutes)
    }
}

/// Full outcome of one pair analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncResult {
    pub agents: (String, String),
    pub state: SyncState,
    pub score: f64,
    /// Whether `score` meets the configured synchronized threshold.
    pub synchronized: bool,
    pub classification: Option<Classification>,
    pub subjective_time: Option<SubjectiveTime>,
    pub fingerprint: Option<String>,
    pub directional: DirectionalMetrics,
    /// Unboosted geometry angle, when a geometry exists.
    pub angle_deg: Option<f64>,
}

impl SyncResult {
    pub fn insufficient(agent_a: &str, agent_b: &str, directional: DirectionalMetrics) -> Self {
        Self {
            agents: (agent_a.to_string(), agent_b.to_string()),
            state: SyncState::InsufficientData,
            score: 0.0,
            synchronized: false,
            classification: None,
            subjective_time: None,
            fingerprint: None,
            directional,
            angle_deg: None,
        }
    }

    pub fn category_id(&self) -> u8 {
        self.classification.as_ref().map_or(0, |c| c.category_id)
    }

    pub fn category_name(&self) -> &str {
        self.classification
            .as_ref()
            .map_or("NONE", |c| c.category_name.as_str())
    }

    pub fn involves(&self, agent: &str) -> bool {
        self.agents.0 == agent || self.agents.1 == agent
    }

    /// Score as a percentage string, e.g. `"72.5%"`.
    pub fn percent(&self) -> String {
        format!("{:.1}%", self.score * 100.0)
    }
}

/// Fraction of the global log that is privileged-type or drew a reaction.
pub fn resonance_density(all_events: &[Event], bias: &BiasConfig) -> f64 {
    if all_events.is_empty() {
        return 0.0;
    }
    let resonant = all_events
        .iter()
        .filter(|e| e.has_reactions() || e.kind.as_deref().is_some_and(|k| bias.is_privileged(k)))
        .count();
    resonant as f64 / all_events.len() as f64
}

/// Composite score: 0.45·symmetry + 0.25·balance + 0.25·global resonance
/// density, clamped to [0, 1].
pub fn synchronization_score(symmetry_score: f64, directional_balance: f64, density: f64) -> f64 {
    (0.45 * symmetry_score + 0.25 * directional_balance + 0.25 * density).clamp(0.0, 1.0)
}

/// Analyzer for one pair, keyed canonically.
#[derive(Clone, Debug)]
pub struct PairSynchronizer {
    key: PairKey,
    sublog: Vec<Event>,
    analyses: usize,
}

impl PairSynchronizer {
    /// Orientation follows the key: `agent_a` is the lexicographically
    /// smaller id.
    pub fn new(key: PairKey, all_events: &[Event]) -> Self {
        let mut pair = Self {
            key,
            sublog: Vec::new(),
            analyses: 0,
        };
        pair.rebuild(all_events);
        pair
    }

    pub fn key(&self) -> &PairKey {
        &self.key
    }

    pub fn agent_a(&self) -> &str {
        self.key.first()
    }

    pub fn agent_b(&self) -> &str {
        self.key.second()
    }

    pub fn sublog(&self) -> &[Event] {
        &self.sublog
    }

    /// Number of times this pair has been analyzed through the network.
    pub fn analyses(&self) -> usize {
        self.analyses
    }

    pub(crate) fn record_analysis(&mut self) {
        self.analyses += 1;
    }

    /// Refilter the sublog from the global log: events strictly between the
    /// two agents, either direction, chronological.
    pub fn rebuild(&mut self, all_events: &[Event]) {
        let (a, b) = (self.key.first(), self.key.second());
        self.sublog = all_events
            .iter()
            .filter(|e| e.connects(a, b))
            .cloned()
            .collect();
        sort_chronologically(&mut self.sublog);
        tracing::debug!(pair = %self.key, events = self.sublog.len(), "rebuilt pair sublog");
    }

    pub fn directional_metrics(&self) -> DirectionalMetrics {
        DirectionalMetrics::measure(&self.sublog, self.agent_a(), self.agent_b())
    }

    pub fn analyze(&self, all_events: &[Event], config: &SyncConfig) -> SyncResult {
        let (agent_a, agent_b) = (self.agent_a(), self.agent_b());
        let directional = self.directional_metrics();

        let Some(geometry) = synthesize(&self.sublog, &config.time, &config.bias) else {
            return SyncResult::insufficient(agent_a, agent_b, directional);
        };
        let boosted = geometry.boosted(directional.reciprocity_boost());

        let classification = Classifier::new(&config.classifier).classify_geometry(&boosted);
        let score = synchronization_score(
            classification.symmetry_score,
            directional.directional_balance,
            resonance_density(all_events, &config.bias),
        );
        let subjective_time = SubjectiveTime::compute(&boosted, &classification, score);
        let fingerprint = pair_fingerprint(
            agent_a,
            agent_b,
            classification.category_id,
            geometry.angle_deg,
        );

        tracing::debug!(
            pair = %self.key,
            category = classification.category_name.as_str(),
            score,
            "analyzed pair"
        );

        SyncResult {
            agents: (agent_a.to_string(), agent_b.to_string()),
            state: SyncState::from_score(score),
            score,
            synchronized: score >= config.network.synchronized_threshold,
            classification: Some(classification),
            subjective_time: Some(subjective_time),
            fingerprint: Some(fingerprint),
            directional,
            angle_deg: Some(geometry.angle_deg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn ev(from: &str, to: &str, ts: &str) -> Event {
        Event::new(from, to, ts).unwrap()
    }

    #[test]
    fn test_pair_key_is_canonical() {
        assert_eq!(PairKey::new("b", "a"), PairKey::new("a", "b"));
        let k = PairKey::new("zed", "amy");
        assert_eq!(k.first(), "amy");
        assert_eq!(k.to_string(), "amy:zed");
        assert!(k.contains("zed"));
    }

    #[test]
    fn test_phase_bands() {
        assert_eq!(SyncState::from_score(0.95), SyncState::Entangled);
        assert_eq!(SyncState::from_score(0.8), SyncState::Entangled);
        assert_eq!(SyncState::from_score(0.6), SyncState::Aligned);
        assert_eq!(SyncState::from_score(0.4), SyncState::Coherent);
        assert_eq!(SyncState::from_score(0.39), SyncState::Decoherent);
        assert_eq!(SyncState::InsufficientData.to_string(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn test_directional_balance() {
        let events = vec![
            ev("a", "b", "2024-03-01T10:00:00Z").with_engagement(0.8),
            ev("a", "b", "2024-03-01T10:01:00Z").with_engagement(0.6),
            ev("b", "a", "2024-03-01T10:02:00Z").with_engagement(0.5),
        ];
        let m = DirectionalMetrics::measure(&events, "a", "b");
        assert_eq!((m.a_to_b, m.b_to_a), (2, 1));
        assert_abs_diff_eq!(m.directional_balance, 0.5);
        assert_abs_diff_eq!(m.engagement_symmetry, 1.0 - (0.7 - 0.5), epsilon = 1e-12);
        assert_abs_diff_eq!(m.reciprocity_boost(), 0.7);
    }

    #[test]
    fn test_directional_one_sided_and_empty() {
        let events = vec![ev("a", "b", "2024-03-01T10:00:00Z").with_engagement(0.4)];
        let m = DirectionalMetrics::measure(&events, "a", "b");
        assert_eq!(m.directional_balance, 0.0);
        assert_abs_diff_eq!(m.engagement_symmetry, 0.6);
        assert_abs_diff_eq!(m.reciprocity_boost(), 0.4);

        let empty = DirectionalMetrics::measure(&[], "a", "b");
        assert_eq!(empty.directional_balance, 0.0);
        assert_eq!(empty.engagement_symmetry, 1.0);
    }

    #[test]
    fn test_sublog_filters_and_sorts() {
        let all = vec![
            ev("b", "a", "2024-03-02T10:00:00Z"),
            ev("a", "c", "2024-03-01T09:00:00Z"),
            ev("a", "b", "2024-03-01T10:00:00Z"),
        ];
        let pair = PairSynchronizer::new(PairKey::new("b", "a"), &all);
        assert_eq!(pair.sublog().len(), 2);
        assert!(pair.sublog()[0].timestamp < pair.sublog()[1].timestamp);
        assert!(pair.sublog().iter().all(|e| e.connects("a", "b")));
    }

    #[test]
    fn test_single_event_is_insufficient() {
        let all = vec![ev("a", "b", "2024-03-01T10:00:00Z")];
        let pair = PairSynchronizer::new(PairKey::new("a", "b"), &all);
        let r = pair.analyze(&all, &SyncConfig::default());
        assert_eq!(r.state, SyncState::InsufficientData);
        assert_eq!(r.score, 0.0);
        assert!(!r.synchronized);
        assert!(r.classification.is_none());
        assert!(r.subjective_time.is_none());
        assert_eq!(r.category_name(), "NONE");
    }

    #[test]
    fn test_balanced_privileged_pair_is_entangled() {
        let mut all = Vec::new();
        for day in 1..=3 {
            for (from, to, minute) in [("a", "b", 0), ("b", "a", 5)] {
                let ts = format!("2024-03-0{day}T10:{minute:02}:00Z");
                all.push(ev(from, to, &ts).with_kind("call").with_reactions(["ok"]));
            }
        }
        let pair = PairSynchronizer::new(PairKey::new("a", "b"), &all);
        let r = pair.analyze(&all, &SyncConfig::default());
        let cls = r.classification.as_ref().unwrap();
        assert_eq!(cls.category_id, 17);
        assert_eq!(r.directional.directional_balance, 1.0);
        // 0.45·1 + 0.25·1 + 0.25·1
        assert_abs_diff_eq!(r.score, 0.95, epsilon = 1e-12);
        assert_eq!(r.state, SyncState::Entangled);
        assert!(r.synchronized);
        assert_eq!(r.angle_deg, Some(120.0));
        assert_eq!(
            r.fingerprint.as_deref(),
            Some(pair_fingerprint("a", "b", 17, 120.0).as_str())
        );

        let t = r.subjective_time.unwrap();
        // magA = 2, magB = 5, mult = 17/23, weight = 0.4 + 0.6·0.95
        let mag: f64 = 2.0 * 5.0 * (0.5 + 17.0 / 23.0);
        let expected = 1.0 / (1.0 + (mag + 1.0).ln() * (0.4 + 0.57));
        assert_abs_diff_eq!(t.time_effect, expected, epsilon = 1e-9);
        assert_abs_diff_eq!(t.perceived_minutes, 60.0 * expected, epsilon = 1e-9);
    }

    #[test]
    fn test_density_uses_global_log() {
        let plain = ev("x", "y", "2024-03-01T10:00:00Z");
        let hot = ev("x", "y", "2024-03-01T10:00:00Z").with_kind("video");
        let reacted = ev("x", "y", "2024-03-01T10:00:00Z").with_reactions(["+1"]);
        let bias = BiasConfig::default();
        assert_eq!(resonance_density(&[], &bias), 0.0);
        assert_abs_diff_eq!(
            resonance_density(&[plain.clone(), hot, reacted, plain], &bias),
            0.5
        );
    }

    #[test]
    fn test_score_clamped() {
        assert_abs_diff_eq!(synchronization_score(1.0, 1.0, 1.0), 0.95, epsilon = 1e-12);
        assert_eq!(synchronization_score(0.0, 0.0, 0.0), 0.0);
        assert_eq!(synchronization_score(3.0, 1.0, 1.0), 1.0);
        assert_eq!(synchronization_score(-2.0, 0.0, 0.0), 0.0);
        assert_abs_diff_eq!(synchronization_score(0.5, 0.5, 0.5), 0.475);
    }
}
