//! Pair-analysis fingerprints.
//!
//! A fingerprint is a 32-bit multiplicative rolling hash rendered as hex. It
//! is a display identifier only: collisions are cheap to find, so it must not
//! be used to deduplicate results or to authenticate anything.

use crate::constants::{FINGERPRINT_HEX_LEN, FINGERPRINT_PREFIX};

/// `h = h * 31 + unit` over UTF-16 code units, wrapping at 32 bits.
pub fn rolling_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Fingerprint for one pair analysis.
///
/// Hashes `agent_a:agent_b:category_id:angle`, where `angle` is written in
/// shortest round-trip decimal form (`90`, `96.66666666666667`). Order
/// sensitive: swapping the agents yields a different fingerprint.
pub fn pair_fingerprint(agent_a: &str, agent_b: &str, category_id: u8, angle_deg: f64) -> String {
    let components = format!("{agent_a}:{agent_b}:{category_id}:{angle_deg}");
    let magnitude = i64::from(rolling_hash(&components)).unsigned_abs();
    let hex = format!("{magnitude:x}");
    let end = hex.len().min(FINGERPRINT_HEX_LEN);
    format!("{FINGERPRINT_PREFIX}{}", &hex[..end])
}
