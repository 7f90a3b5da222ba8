//! Symmetry classification of an interaction geometry.
//!
//! Measures the four edge lengths and six pairwise angles, then walks a
//! fixed, most-specific-first taxonomy. The first rule whose predicate holds
//! wins; the final rule always holds, so the `Unclassified` sentinel is only
//! reachable through a malformed taxonomy.
//!
//! Rule order is load-bearing: Hypercubic geometries also satisfy the
//! Tetragonal and Orthorhombic predicates, and every geometry satisfies
//! Triclinic.

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::constants::{DEFAULT_ANGLE_DEG, MAX_CATEGORY_ID};
use crate::geometry::Geometry;
use crate::vector::Vector4;

/// Symmetry categories by lattice-system analogy. Ids are not contiguous.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Unclassified,
    Triclinic,
    Diclinic,
    Monoclinic,
    Orthorhombic,
    Tetragonal,
    Trigonal,
    Hexagonal,
    Hypercubic,
}

impl Category {
    pub fn id(self) -> u8 {
        match self {
            Self::Unclassified => 0,
            Self::Triclinic => 1,
            Self::Diclinic => 3,
            Self::Monoclinic => 4,
            Self::Orthorhombic => 10,
            Self::Tetragonal => 15,
            Self::Trigonal => 17,
            Self::Hexagonal => 20,
            Self::Hypercubic => 23,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unclassified => "Unclassified",
            Self::Triclinic => "Triclinic",
            Self::Diclinic => "Diclinic",
            Self::Monoclinic => "Monoclinic",
            Self::Orthorhombic => "Orthorhombic",
            Self::Tetragonal => "Tetragonal",
            Self::Trigonal => "Trigonal",
            Self::Hexagonal => "Hexagonal",
            Self::Hypercubic => "Hypercubic",
        }
    }
}

/// Edge lengths of a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Edges {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Edges {
    pub fn as_array(&self) -> [f64; 4] {
        [self.a, self.b, self.c, self.d]
    }
}

/// The six pairwise angles in degrees:
/// α=∠(b,c) β=∠(a,c) γ=∠(a,b) δ=∠(a,d) ε=∠(b,d) ζ=∠(c,d).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Angles {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    pub epsilon: f64,
    pub zeta: f64,
}

impl Angles {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.alpha,
            self.beta,
            self.gamma,
            self.delta,
            self.epsilon,
            self.zeta,
        ]
    }
}

/// Raw measurements of four vectors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measurements {
    pub edges: Edges,
    pub angles: Angles,
}

impl Measurements {
    pub fn of(a: Vector4, b: Vector4, c: Vector4, d: Vector4) -> Self {
        Self {
            edges: Edges {
                a: a.magnitude(),
                b: b.magnitude(),
                c: c.magnitude(),
                d: d.magnitude(),
            },
            angles: Angles {
                alpha: b.angle_between(c),
                beta: a.angle_between(c),
                gamma: a.angle_between(b),
                delta: a.angle_between(d),
                epsilon: b.angle_between(d),
                zeta: c.angle_between(d),
            },
        }
    }
}

/// Boolean predicates over a measurement, evaluated once per classification.
#[derive(Clone, Copy, Debug)]
pub struct SymmetryMap {
    edge_tolerance: f64,
    angle_tolerance: f64,
    pub all_edges_equal: bool,
    pub ab_equal: bool,
    pub all_right: bool,
}

impl SymmetryMap {
    fn new(m: &Measurements, config: &ClassifierConfig) -> Self {
        let mut map = Self {
            edge_tolerance: config.edge_tolerance(),
            angle_tolerance: config.angle_tolerance,
            all_edges_equal: false,
            ab_equal: false,
            all_right: false,
        };
        let e = &m.edges;
        map.ab_equal = map.edges_equal(e.a, e.b);
        map.all_edges_equal =
            map.ab_equal && map.edges_equal(e.b, e.c) && map.edges_equal(e.c, e.d);
        map.all_right = m.angles.as_array().iter().all(|&a| map.is_right(a));
        map
    }

    /// Relative-difference equality; two zero lengths are equal.
    pub fn edges_equal(&self, x: f64, y: f64) -> bool {
        if x == 0.0 && y == 0.0 {
            return true;
        }
        (x - y).abs() / x.max(y) < self.edge_tolerance
    }

    pub fn is_right(&self, angle: f64) -> bool {
        (angle - DEFAULT_ANGLE_DEG).abs() < self.angle_tolerance
    }

    pub fn is_hexagonal(&self, angle: f64) -> bool {
        (angle - 120.0).abs() < self.angle_tolerance
    }
}

/// Which edge relation a rule describes; only `Equal` earns the graded edge
/// term in the symmetry score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeRule {
    Equal,
    AbEqual,
    Unequal,
}

/// Ideal angles for a rule. Slots left `None` fall back to `all`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IdealAngles {
    pub all: f64,
    pub gamma: Option<f64>,
    pub zeta: Option<f64>,
}

impl IdealAngles {
    const RIGHT: Self = Self {
        all: 90.0,
        gamma: None,
        zeta: None,
    };

    /// Ideal for each slot, in α β γ δ ε ζ order.
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.all,
            self.all,
            self.gamma.unwrap_or(self.all),
            self.all,
            self.all,
            self.zeta.unwrap_or(self.all),
        ]
    }
}

/// One taxonomy entry.
pub struct Rule {
    pub category: Category,
    pub edges: EdgeRule,
    /// `None` means the rule accepts any angles and earns no angle term.
    pub ideal_angles: Option<IdealAngles>,
    pub matches: fn(&Measurements, &SymmetryMap) -> bool,
}

/// The taxonomy, most specific first.
pub static TAXONOMY: [Rule; 8] = [
    Rule {
        category: Category::Hypercubic,
        edges: EdgeRule::Equal,
        ideal_angles: Some(IdealAngles::RIGHT),
        matches: |_, s| s.all_edges_equal && s.all_right,
    },
    Rule {
        category: Category::Hexagonal,
        edges: EdgeRule::Equal,
        ideal_angles: Some(IdealAngles {
            all: 90.0,
            gamma: Some(120.0),
            zeta: None,
        }),
        matches: |m, s| s.all_edges_equal && s.is_hexagonal(m.angles.gamma),
    },
    Rule {
        category: Category::Trigonal,
        edges: EdgeRule::Unequal,
        ideal_angles: Some(IdealAngles {
            all: 90.0,
            gamma: Some(120.0),
            zeta: None,
        }),
        matches: |m, s| s.is_hexagonal(m.angles.gamma),
    },
    Rule {
        category: Category::Tetragonal,
        edges: EdgeRule::AbEqual,
        ideal_angles: Some(IdealAngles::RIGHT),
        matches: |_, s| s.all_right && s.ab_equal,
    },
    Rule {
        category: Category::Orthorhombic,
        edges: EdgeRule::Unequal,
        ideal_angles: Some(IdealAngles::RIGHT),
        matches: |_, s| s.all_right,
    },
    Rule {
        category: Category::Monoclinic,
        edges: EdgeRule::Unequal,
        ideal_angles: Some(IdealAngles {
            all: 90.0,
            gamma: Some(75.0),
            zeta: None,
        }),
        matches: |m, s| {
            let a = &m.angles;
            !s.is_right(a.alpha)
                && [a.beta, a.gamma, a.delta, a.epsilon, a.zeta]
                    .iter()
                    .all(|&x| s.is_right(x))
        },
    },
    Rule {
        category: Category::Diclinic,
        edges: EdgeRule::Unequal,
        ideal_angles: Some(IdealAngles {
            all: 90.0,
            gamma: Some(75.0),
            zeta: Some(75.0),
        }),
        matches: |m, s| !s.is_right(m.angles.alpha) && !s.is_right(m.angles.zeta),
    },
    Rule {
        category: Category::Triclinic,
        edges: EdgeRule::Unequal,
        ideal_angles: None,
        matches: |_, _| true,
    },
];

/// Result of classifying one geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub category_id: u8,
    pub category_name: String,
    pub symmetry_score: f64,
}

impl Classification {
    fn new(category: Category, symmetry_score: f64) -> Self {
        Self {
            category,
            category_id: category.id(),
            category_name: category.name().to_string(),
            symmetry_score,
        }
    }

    pub fn unclassified() -> Self {
        Self::new(Category::Unclassified, 0.0)
    }
}

/// Stateless classifier holding its tolerances.
#[derive(Clone, Debug)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn classify_geometry(&self, geometry: &Geometry) -> Classification {
        self.classify(geometry.a, geometry.b, geometry.c, geometry.d)
    }

    pub fn classify(&self, a: Vector4, b: Vector4, c: Vector4, d: Vector4) -> Classification {
        self.classify_measurements(&Measurements::of(a, b, c, d))
    }

    pub fn classify_measurements(&self, m: &Measurements) -> Classification {
        let symmetry = SymmetryMap::new(m, &self.config);
        match TAXONOMY.iter().find(|rule| (rule.matches)(m, &symmetry)) {
            Some(rule) => Classification::new(rule.category, self.symmetry_score(rule, m)),
            None => Classification::unclassified(),
        }
    }

    /// Continuous score for a matched rule: id/23 plus an edge term and, for
    /// rules with ideal angles, an angle-precision term. Clamped to [0, 1].
    pub fn symmetry_score(&self, rule: &Rule, m: &Measurements) -> f64 {
        if rule.category == Category::Unclassified {
            return 0.0;
        }
        let weight = self.config.deviation_weight();
        let mut score = f64::from(rule.category.id()) / MAX_CATEGORY_ID;

        score += match rule.edges {
            EdgeRule::Equal => weight * edge_consistency(&m.edges),
            EdgeRule::AbEqual | EdgeRule::Unequal => weight,
        };

        if let Some(ideals) = rule.ideal_angles {
            let total: f64 = m
                .angles
                .as_array()
                .iter()
                .zip(ideals.as_array())
                .map(|(measured, ideal)| (measured - ideal).abs())
                .sum();
            let avg_dev = total / 6.0;
            score += weight * (1.0 - avg_dev / self.config.angle_tolerance).max(0.0);
        }

        score.clamp(0.0, 1.0)
    }
}

/// 1 − min(1, stddev/mean) over the four edge lengths. A zero mean is
/// treated as 1 so an all-zero geometry is perfectly consistent.
fn edge_consistency(edges: &Edges) -> f64 {
    let lengths = edges.as_array();
    let mean = lengths.iter().sum::<f64>() / 4.0;
    let variance = lengths.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / 4.0;
    let denom = if mean == 0.0 { 1.0 } else { mean };
    1.0 - (variance.sqrt() / denom).min(1.0)
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn axis(i: usize, len: f64) -> Vector4 {
        match i {
            0 => Vector4::new(len, 0.0, 0.0, 0.0),
            1 => Vector4::new(0.0, len, 0.0, 0.0),
            2 => Vector4::new(0.0, 0.0, len, 0.0),
            _ => Vector4::new(0.0, 0.0, 0.0, len),
        }
    }

    /// Vector of the given length in the w–x plane, `angle_deg` from the w axis.
    fn planar(magnitude: f64, angle_deg: f64) -> Vector4 {
        let theta = angle_deg.to_radians();
        Vector4::new(magnitude * theta.cos(), magnitude * theta.sin(), 0.0, 0.0)
    }

    fn tight() -> Classifier {
        Classifier::new(&ClassifierConfig {
            length_tolerance: 0.5,
            angle_tolerance: 5.0,
        })
    }

    #[test]
    fn test_taxonomy_order_is_fixed() {
        let ids: Vec<u8> = TAXONOMY.iter().map(|r| r.category.id()).collect();
        assert_eq!(ids, vec![23, 20, 17, 15, 10, 4, 3, 1]);
    }

    #[test]
    fn test_hypercubic_unit_axes() {
        let c = tight().classify(axis(0, 2.0), axis(1, 2.0), axis(2, 2.0), axis(3, 2.0));
        assert_eq!(c.category, Category::Hypercubic);
        assert_eq!(c.category_id, 23);
        assert!(c.symmetry_score > 0.9);
    }

    #[test]
    fn test_hexagonal() {
        let cls = Classifier::default();
        let c = cls.classify(axis(0, 3.0), planar(3.0, 120.0), axis(2, 3.0), axis(3, 3.0));
        assert_eq!(c.category, Category::Hexagonal);
    }

    #[test]
    fn test_trigonal_with_unequal_edges() {
        let cls = Classifier::default();
        let c = cls.classify(axis(0, 1.0), planar(5.0, 120.0), axis(2, 5.0), axis(3, 5.0));
        assert_eq!(c.category, Category::Trigonal);
        // 17/23 + 0.2 + 0.2 (all angles on their ideals) → clamped
        assert_eq!(c.symmetry_score, 1.0);
    }

    #[test]
    fn test_tetragonal_and_orthorhombic() {
        let cls = tight();
        let tetra = cls.classify(axis(0, 2.0), axis(1, 2.0), axis(2, 5.0), axis(3, 1.0));
        assert_eq!(tetra.category, Category::Tetragonal);

        let ortho = cls.classify(axis(0, 1.0), axis(1, 3.0), axis(2, 5.0), axis(3, 2.0));
        assert_eq!(ortho.category, Category::Orthorhombic);
        // 10/23 + 0.05 + 0.05
        assert_abs_diff_eq!(ortho.symmetry_score, 10.0 / 23.0 + 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_monoclinic_tilted_alpha() {
        // b leans into the c axis: only α (b,c) leaves 90°.
        let cls = tight();
        let b = Vector4::new(0.0, 45f64.to_radians().cos(), 45f64.to_radians().sin(), 0.0) * 3.0;
        let c = cls.classify(axis(0, 1.0), b, axis(2, 5.0), axis(3, 2.0));
        assert_eq!(c.category, Category::Monoclinic);
    }

    #[test]
    fn test_diclinic_alpha_and_zeta() {
        let cls = tight();
        let s = 45f64.to_radians().sin();
        let b = Vector4::new(0.0, s, s, 0.0);
        let d = Vector4::new(0.0, 0.0, s, s);
        let c = cls.classify(axis(0, 1.0), b, axis(2, 1.0), d);
        assert_eq!(c.category, Category::Diclinic);
    }

    #[test]
    fn test_triclinic_fallback_has_no_angle_term() {
        let cls = tight();
        // γ = 45°: not right, not hexagonal; α and ζ are right.
        let c = cls.classify(axis(0, 1.0), planar(1.0, 45.0), axis(2, 1.0), axis(3, 1.0));
        assert_eq!(c.category, Category::Triclinic);
        assert_abs_diff_eq!(c.symmetry_score, 1.0 / 23.0 + 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_all_zero_vectors() {
        // Every angle defaults to 90° and all edges are equal (zero).
        let z = Vector4::zero();
        let c = Classifier::default().classify(z, z, z, z);
        assert_eq!(c.category, Category::Hypercubic);
        assert!(c.symmetry_score <= 1.0);
    }

    #[test]
    fn test_edge_equality_tolerance() {
        let cfg = ClassifierConfig::default();
        let m = Measurements::of(axis(0, 1.0), axis(1, 1.0), axis(2, 1.0), axis(3, 1.0));
        let s = SymmetryMap::new(&m, &cfg);
        // default tolerance 1.1 * 20 * 0.01 = 0.22
        assert!(s.edges_equal(1.0, 1.2));
        assert!(!s.edges_equal(1.0, 1.3));
        assert!(s.edges_equal(0.0, 0.0));
        assert!(!s.edges_equal(0.0, 1.0));
    }

    #[test]
    fn test_unclassified_sentinel() {
        let u = Classification::unclassified();
        assert_eq!(u.category_id, 0);
        assert_eq!(u.category_name, "Unclassified");
        assert_eq!(u.symmetry_score, 0.0);
    }
}
