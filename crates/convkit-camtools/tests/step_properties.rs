use convkit_camtools::{bolt_hole_circle, normalize};
use convkit_core::Point;
use proptest::prelude::*;

proptest! {
    #[test]
    fn normalized_steps_cover_distance(distance in 0.001f64..1000.0, nominal in 0.001f64..100.0) {
        let plan = normalize(distance, nominal).unwrap();
        prop_assert!(plan.count >= 1);
        prop_assert!(plan.step <= nominal * (1.0 + 1e-9));
        prop_assert!((plan.total() - distance).abs() <= distance * 1e-9);
    }

    #[test]
    fn normalize_ignores_direction(distance in -500.0f64..500.0, nominal in 0.01f64..50.0) {
        let forward = normalize(distance, nominal).unwrap();
        let backward = normalize(-distance, -nominal).unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn bolt_circle_holes_lie_on_circle(
        num_holes in 1i64..64,
        diameter in 0.1f64..500.0,
        cx in -100.0f64..100.0,
        cy in -100.0f64..100.0,
        start_angle in -360.0f64..360.0,
    ) {
        let center = Point::new(cx, cy);
        let holes = bolt_hole_circle(num_holes, diameter, center, start_angle).unwrap();
        prop_assert_eq!(holes.len() as i64, num_holes);
        for hole in &holes {
            prop_assert!((hole.distance_to(&center) - diameter / 2.0).abs() < 1e-9 * diameter.max(1.0));
        }
    }

    #[test]
    fn bolt_circle_rejects_non_positive_counts(num_holes in -100i64..=0) {
        prop_assert!(bolt_hole_circle(num_holes, 10.0, Point::default(), 0.0).is_err());
    }
}
