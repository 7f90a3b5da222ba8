//! Property tests over the scoring core.

use proptest::prelude::*;
use sl_core::classifier::Category;
use sl_core::config::ClassifierConfig;
use sl_core::{
    Classifier, DirectionalMetrics, Event, Measurements, TAXONOMY, Vector4, pair_fingerprint,
};

fn vector() -> impl Strategy<Value = Vector4> {
    (-100.0..100.0f64, -100.0..100.0f64, -100.0..100.0f64, -100.0..100.0f64)
        .prop_map(|(w, x, y, z)| Vector4::new(w, x, y, z))
}

fn nonzero_vector() -> impl Strategy<Value = Vector4> {
    vector().prop_filter("needs a direction", |v| v.magnitude() > 1e-3)
}

fn classifier() -> impl Strategy<Value = Classifier> {
    (0.01..5.0f64, 0.1..90.0f64).prop_map(|(length_tolerance, angle_tolerance)| {
        Classifier::new(&ClassifierConfig {
            length_tolerance,
            angle_tolerance,
        })
    })
}

fn agent_id() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

proptest! {
    #[test]
    fn angle_to_self_is_zero(v in nonzero_vector()) {
        prop_assert!(v.angle_between(v) < 1e-3);
    }

    #[test]
    fn angle_to_zero_is_right(v in vector()) {
        prop_assert_eq!(v.angle_between(Vector4::zero()), 90.0);
        prop_assert_eq!(Vector4::zero().angle_between(v), 90.0);
    }

    #[test]
    fn angle_is_symmetric_and_bounded(u in vector(), v in vector()) {
        let a = u.angle_between(v);
        prop_assert!((0.0..=180.0).contains(&a));
        prop_assert!((a - v.angle_between(u)).abs() < 1e-9);
    }

    #[test]
    fn symmetry_score_in_unit_interval(
        c in classifier(),
        a in vector(), b in vector(), cc in vector(), d in vector(),
    ) {
        let result = c.classify(a, b, cc, d);
        prop_assert!((0.0..=1.0).contains(&result.symmetry_score));
    }

    #[test]
    fn classification_is_deterministic(
        c in classifier(),
        a in vector(), b in vector(), cc in vector(), d in vector(),
    ) {
        prop_assert_eq!(c.classify(a, b, cc, d), c.classify(a, b, cc, d));
    }

    #[test]
    fn taxonomy_always_matches(
        c in classifier(),
        a in vector(), b in vector(), cc in vector(), d in vector(),
    ) {
        let m = Measurements::of(a, b, cc, d);
        prop_assert_ne!(c.classify_measurements(&m).category, Category::Unclassified);
        let fallback = TAXONOMY.last().map(|rule| rule.category);
        prop_assert_eq!(fallback, Some(Category::Triclinic));
    }

    #[test]
    fn balance_in_unit_interval(ab in 0usize..20, ba in 0usize..20) {
        let mut events = Vec::new();
        for i in 0..ab {
            events.push(Event::new("a", "b", &format!("2024-03-01T10:{i:02}:00Z")).unwrap());
        }
        for i in 0..ba {
            events.push(Event::new("b", "a", &format!("2024-03-01T11:{i:02}:00Z")).unwrap());
        }
        let m = DirectionalMetrics::measure(&events, "a", "b");
        prop_assert!((0.0..=1.0).contains(&m.directional_balance));
        if ab == 0 || ba == 0 {
            prop_assert_eq!(m.directional_balance, 0.0);
        } else if ab == ba {
            prop_assert_eq!(m.directional_balance, 1.0);
        }
    }

    #[test]
    fn fingerprint_is_pure_and_order_sensitive(
        a in agent_id(), b in agent_id(), id in 0u8..=23, angle in 60.0..130.0f64,
    ) {
        prop_assume!(a != b);
        let fp = pair_fingerprint(&a, &b, id, angle);
        prop_assert_eq!(&fp, &pair_fingerprint(&a, &b, id, angle));
        prop_assert!(fp.starts_with("sync_"));
        prop_assert_ne!(fp, pair_fingerprint(&b, &a, id, angle));
    }
}
