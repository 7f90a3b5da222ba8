//! Seeded synthetic interaction logs for demos and benchmarks.
//!
//! Each scenario produces raw [`EventRecord`]s without engagement, so they go
//! through the same annotate-then-admit path as file input.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::time::to_iso8601;
use crate::wire::EventRecord;

/// 2024-01-01T09:00:00Z
const BASE_EPOCH_SECS: i64 = 1_704_099_600;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// One-sided plain text: one agent talks, the other rarely answers.
    LowSync,
    /// Daily balanced exchanges with calls and reactions.
    HighSync,
    /// Three agents, every pair exchanging most days.
    Triad,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::LowSync, Scenario::HighSync, Scenario::Triad];

    pub fn name(&self) -> &'static str {
        match self {
            Self::LowSync => "LOW SYNC",
            Self::HighSync => "HIGH SYNC",
            Self::Triad => "TRIAD",
        }
    }

    /// Generate the scenario's log, ordered by timestamp.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<EventRecord> {
        let mut records = Vec::new();
        match self {
            Self::LowSync => {
                for day in 0..40 {
                    if !rng.random_bool(0.35) {
                        continue;
                    }
                    let start = day_start(day) + Duration::minutes(rng.random_range(0..600));
                    let burst = rng.random_range(1..=3);
                    for i in 0..burst {
                        let ts = start + Duration::minutes(i * rng.random_range(2..20));
                        records.push(record("alice", "bob", ts, "TEXT", false));
                    }
                    if rng.random_bool(0.15) {
                        let ts = start + Duration::hours(rng.random_range(3..9));
                        records.push(record("bob", "alice", ts, "TEXT", false));
                    }
                }
            }
            Self::HighSync => {
                for day in 0..21 {
                    let start = day_start(day) + Duration::minutes(rng.random_range(0..120));
                    exchange(&mut records, rng, ("alice", "bob"), start, 0.5);
                }
            }
            Self::Triad => {
                let pairs = [("ana", "ben"), ("ben", "cyd"), ("cyd", "ana")];
                for day in 0..30 {
                    for (slot, &pair) in pairs.iter().enumerate() {
                        if !rng.random_bool(0.8) {
                            continue;
                        }
                        let start = day_start(day)
                            + Duration::hours(3 * slot as i64)
                            + Duration::minutes(rng.random_range(0..60));
                        exchange(&mut records, rng, pair, start, 0.4);
                    }
                }
            }
        }
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        records
    }
}

fn day_start(day: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(BASE_EPOCH_SECS) + Duration::days(day)
}

/// A short back-and-forth that starts with either agent and alternates.
fn exchange<R: Rng + ?Sized>(
    records: &mut Vec<EventRecord>,
    rng: &mut R,
    (a, b): (&str, &str),
    start: DateTime<Utc>,
    reaction_p: f64,
) {
    const KINDS: [&str; 4] = ["TEXT", "CALL", "VIDEO", "VOICE"];
    let turns = 2 * rng.random_range(1..=2);
    let (mut from, mut to) = if rng.random_bool(0.5) { (a, b) } else { (b, a) };
    let mut ts = start;
    for _ in 0..turns {
        let kind = KINDS[rng.random_range(0..KINDS.len())];
        records.push(record(from, to, ts, kind, rng.random_bool(reaction_p)));
        ts += Duration::minutes(rng.random_range(1..15));
        std::mem::swap(&mut from, &mut to);
    }
}

fn record(from: &str, to: &str, ts: DateTime<Utc>, kind: &str, reacted: bool) -> EventRecord {
    let mut record = EventRecord::new(from, to, &to_iso8601(ts));
    record.kind = Some(kind.to_string());
    if reacted {
        record.reactions = Some(vec!["❤".into()]);
    }
    record
}
