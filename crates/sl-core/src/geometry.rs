//! Vector synthesis: event history → interaction geometry.
//!
//! A history is grouped into sessions, then summarized by two quantized
//! magnitudes (span and latest payload) and one angle (privileged-type
//! density, or drift over long idle spans). Those three numbers are laid out
//! as four vectors in R⁴:
//!
//! ```text
//! a = (valA, 0, 0, 0)
//! b = (valB·cos θ, valB·sin θ, 0, 0)
//! c = (0, 0, valB, 0)
//! d = (0, 0, 0, valB)
//! ```

use serde::Serialize;

use crate::config::{BiasConfig, TimeConfig};
use crate::constants::{DEFAULT_ANGLE_DEG, DRIFT_ONSET_DAYS, DRIFT_RAMP_DAYS, QUANTIZE_CAP};
use crate::event::Event;
use crate::session::{Session, group_sessions};
use crate::time::minutes_between;
use crate::vector::Vector4;

/// The four edge vectors plus the quantities they were derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Geometry {
    pub a: Vector4,
    pub b: Vector4,
    pub c: Vector4,
    pub d: Vector4,
    /// Span from first session start to last session end, in day units.
    pub span_days: f64,
    /// Angle between a and b before any reciprocity scaling, in degrees.
    pub angle_deg: f64,
    pub val_a: f64,
    pub val_b: f64,
}

impl Geometry {
    pub fn edges(&self) -> [Vector4; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Scale the span and payload-direction edges (a, b); c and d are left
    /// untouched.
    pub fn boosted(mut self, factor: f64) -> Self {
        self.a = self.a * factor;
        self.b = self.b * factor;
        self
    }
}

/// Quantize a span in day units: ceil(log2(span + 1)), within [1, 5].
pub fn quantize_span(span_days: f64) -> f64 {
    (span_days + 1.0).log2().ceil().clamp(1.0, QUANTIZE_CAP)
}

/// Quantize the latest session's payload: ceil(weight + reaction), within [1, 5].
pub fn quantize_payload(session: &Session<'_>, bias: &BiasConfig) -> f64 {
    session.payload(bias).ceil().clamp(1.0, QUANTIZE_CAP)
}

/// Angle for a geometry given its privileged-session ratio and span.
///
/// Privileged density opens the angle past orthogonal (90°..120°); with no
/// privileged sessions a span beyond 30 days closes it toward 75°.
pub fn bias_angle(privileged_ratio: f64, span_days: f64) -> f64 {
    if privileged_ratio > 0.0 {
        DEFAULT_ANGLE_DEG + 30.0 * privileged_ratio
    } else if span_days > DRIFT_ONSET_DAYS {
        let drift = ((span_days - DRIFT_ONSET_DAYS) / DRIFT_RAMP_DAYS).min(1.0);
        DEFAULT_ANGLE_DEG - 15.0 * drift
    } else {
        DEFAULT_ANGLE_DEG
    }
}

/// Derive the interaction geometry of a history.
///
/// Returns `None` when the history spans fewer than two sessions; that is an
/// expected outcome for thin histories, not an error.
pub fn synthesize(events: &[Event], time: &TimeConfig, bias: &BiasConfig) -> Option<Geometry> {
    let sessions = group_sessions(events, time);
    if sessions.len() < 2 {
        return None;
    }
    let first = sessions.first()?;
    let latest = sessions.last()?;

    let span_days = minutes_between(first.start, latest.end) / time.day_minutes();
    let val_a = quantize_span(span_days);
    let val_b = quantize_payload(latest, bias);

    let privileged = sessions.iter().filter(|s| s.has_privileged(bias)).count();
    let ratio = privileged as f64 / sessions.len() as f64;
    let angle_deg = bias_angle(ratio, span_days);
    let theta = angle_deg.to_radians();

    Some(Geometry {
        a: Vector4::new(val_a, 0.0, 0.0, 0.0),
        b: Vector4::new(val_b * theta.cos(), val_b * theta.sin(), 0.0, 0.0),
        c: Vector4::new(0.0, 0.0, val_b, 0.0),
        d: Vector4::new(0.0, 0.0, 0.0, val_b),
        span_days,
        angle_deg,
        val_a,
        val_b,
    })
}
