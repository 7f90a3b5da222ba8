/// Highest category id in the taxonomy; symmetry scores are normalized by it.
pub const MAX_CATEGORY_ID: f64 = 23.0;

/// Angle assigned between any vector and a zero-magnitude vector (degrees).
pub const DEFAULT_ANGLE_DEG: f64 = 90.0;

/// Upper bound for the quantized span and payload components.
pub const QUANTIZE_CAP: f64 = 5.0;

/// Directional balance above which a pair gets the full reciprocity boost.
pub const RECIPROCITY_LIMIT: f64 = 0.9;

/// Span (in day units) after which an unprivileged geometry starts to drift.
pub const DRIFT_ONSET_DAYS: f64 = 30.0;

/// Span range over which drift ramps from 0 to its maximum.
pub const DRIFT_RAMP_DAYS: f64 = 335.0;

/// Phase boundaries on the synchronization score.
pub const ENTANGLED_THRESHOLD: f64 = 0.8;
pub const ALIGNED_THRESHOLD: f64 = 0.6;
pub const COHERENT_THRESHOLD: f64 = 0.4;

/// Minutes in the reference hour for subjective time.
pub const REFERENCE_MINUTES: f64 = 60.0;

/// Prefix of every pair fingerprint.
pub const FINGERPRINT_PREFIX: &str = "sync_";

/// Maximum hex digits kept after the fingerprint prefix.
pub const FINGERPRINT_HEX_LEN: usize = 12;

/// Type tag used for events that carry none.
pub const DEFAULT_TYPE: &str = "DEFAULT";

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;
