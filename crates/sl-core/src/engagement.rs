//! Heuristic engagement scores for records that arrive without one.
//!
//! Scoring looks at the record itself (reactions, privileged type) and at the
//! gap since the previous record in input order: quick replies score higher,
//! replies after three days of silence lower.

use crate::config::BiasConfig;
use crate::time::{minutes_between, parse_timestamp};
use crate::wire::EventRecord;

const REACTION_BONUS: f64 = 0.25;
const PRIVILEGED_BONUS: f64 = 0.3;
const QUICK_REPLY_BONUS: f64 = 0.15;
const PROMPT_REPLY_BONUS: f64 = 0.1;
const STALE_PENALTY: f64 = 0.15;

const QUICK_REPLY_HOURS: f64 = 0.25;
const PROMPT_REPLY_HOURS: f64 = 2.0;
const STALE_HOURS: f64 = 72.0;

pub const MIN_ENGAGEMENT: f64 = 0.1;
pub const MAX_ENGAGEMENT: f64 = 1.0;

/// Score one interaction. `hours_since_previous` is `None` for the first
/// record (or when either timestamp is unreadable).
pub fn engagement_score(
    has_reactions: bool,
    privileged: bool,
    hours_since_previous: Option<f64>,
) -> f64 {
    let mut score = 0.0;
    if has_reactions {
        score += REACTION_BONUS;
    }
    if privileged {
        score += PRIVILEGED_BONUS;
    }
    if let Some(hours) = hours_since_previous {
        if hours < QUICK_REPLY_HOURS {
            score += QUICK_REPLY_BONUS;
        } else if hours < PROMPT_REPLY_HOURS {
            score += PROMPT_REPLY_BONUS;
        }
        if hours > STALE_HOURS {
            score -= STALE_PENALTY;
        }
    }
    score.clamp(MIN_ENGAGEMENT, MAX_ENGAGEMENT)
}

/// Fill in `engagement` on every record that lacks one. Records that already
/// carry a value are left untouched but still serve as the "previous" record
/// for the next one.
pub fn annotate_engagement(records: &mut [EventRecord], bias: &BiasConfig) {
    let mut previous = None;
    for record in records.iter_mut() {
        let ts = record.timestamp.as_deref().and_then(parse_timestamp);
        if record.engagement.is_none() {
            let hours = match (previous, ts) {
                (Some(prev), Some(cur)) => Some(minutes_between(prev, cur) / 60.0),
                _ => None,
            };
            let privileged = record.kind.as_deref().is_some_and(|k| bias.is_privileged(k));
            record.engagement = Some(engagement_score(record.has_reactions(), privileged, hours));
        }
        previous = ts;
    }
}
