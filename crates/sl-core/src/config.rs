//! Analysis configuration.
//!
//! One `SyncConfig` is built by the caller and passed by reference into every
//! component. Every section deserializes with defaults, so a partial TOML or
//! JSON document only needs the keys it overrides.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SyncError};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub classifier: ClassifierConfig,
    pub bias: BiasConfig,
    pub time: TimeConfig,
    pub network: NetworkConfig,
}

/// Tolerances for the geometry classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Fraction scaling the relative edge-equality tolerance.
    pub length_tolerance: f64,
    /// Angle tolerance in degrees.
    pub angle_tolerance: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            length_tolerance: 1.1,
            angle_tolerance: 20.0,
        }
    }
}

impl ClassifierConfig {
    /// Relative difference below which two edge lengths count as equal.
    pub fn edge_tolerance(&self) -> f64 {
        self.length_tolerance * self.angle_tolerance * 0.01
    }

    /// Weight of each bonus term in the symmetry score.
    pub fn deviation_weight(&self) -> f64 {
        self.angle_tolerance * 0.01
    }
}

/// Payload weighting and the privileged ("high resonance") type set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiasConfig {
    /// Reserved for callers; scoring does not read it.
    pub time_factor: f64,
    /// Type tags are stored upper-cased, matching `Event::kind`.
    #[serde(deserialize_with = "uppercase_set")]
    pub privileged: BTreeSet<String>,
    #[serde(deserialize_with = "uppercase_keys")]
    pub payload_weights: BTreeMap<String, f64>,
}

fn uppercase_set<'de, D>(deserializer: D) -> std::result::Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeSet::<String>::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|k| k.to_uppercase()).collect())
}

fn uppercase_keys<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, w)| (k.to_uppercase(), w))
        .collect())
}

impl Default for BiasConfig {
    fn default() -> Self {
        let payload_weights = [
            ("DEFAULT", 1.0),
            ("TEXT", 1.0),
            ("LINK", 2.0),
            ("IMAGE", 2.0),
            ("AUDIO", 3.0),
            ("VOICE", 3.0),
            ("VIDEO", 4.0),
            ("CALL", 5.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let privileged = ["VOICE", "VIDEO", "CALL"]
            .into_iter()
            .map(String::from)
            .collect();
        Self {
            time_factor: 1.0,
            payload_weights,
            privileged,
        }
    }
}

impl BiasConfig {
    /// Configured weight for a type tag; unknown tags weigh 1.
    pub fn weight(&self, kind: &str) -> f64 {
        self.payload_weights
            .get(&kind.to_uppercase())
            .copied()
            .unwrap_or(1.0)
    }

    pub fn is_privileged(&self, kind: &str) -> bool {
        self.privileged.contains(&kind.to_uppercase())
    }
}

/// Time units for session grouping and span measurement.
///
/// Session gap = `base_unit_minutes * session_gap_units`; a day =
/// `base_unit_minutes * day_units`. The defaults give a 2 hour gap and a
/// 24 hour day.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub base_unit_minutes: f64,
    pub session_gap_units: f64,
    pub day_units: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            base_unit_minutes: 60.0,
            session_gap_units: 2.0,
            day_units: 24.0,
        }
    }
}

impl TimeConfig {
    pub fn session_gap_minutes(&self) -> f64 {
        self.base_unit_minutes * self.session_gap_units
    }

    pub fn day_minutes(&self) -> f64 {
        self.base_unit_minutes * self.day_units
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Score at or above which a pair counts as synchronized.
    pub synchronized_threshold: f64,
    /// Number of pair analyses kept in the network history.
    pub history_limit: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            synchronized_threshold: crate::constants::ALIGNED_THRESHOLD,
            history_limit: 20,
        }
    }
}

impl SyncConfig {
    /// Reject values that would make scoring meaningless.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("classifier.length_tolerance", self.classifier.length_tolerance),
            ("classifier.angle_tolerance", self.classifier.angle_tolerance),
            ("time.base_unit_minutes", self.time.base_unit_minutes),
            ("time.session_gap_units", self.time.session_gap_units),
            ("time.day_units", self.time.day_units),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SyncError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        let threshold = self.network.synchronized_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(SyncError::InvalidConfig(format!(
                "network.synchronized_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if let Some((kind, w)) = self
            .bias
            .payload_weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(SyncError::InvalidConfig(format!(
                "bias.payload_weights.{kind} must be non-negative, got {w}"
            )));
        }
        Ok(())
    }
}
