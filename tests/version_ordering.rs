// tests/version_ordering.rs

//! Property coverage for the fire decision: for all version pairs, a fire
//! happens iff the observed version is strictly greater than the baseline
//! under semantic-version ordering.

use proptest::prelude::*;

use relwatch::trigger::should_fire;

fn version_triple() -> impl Strategy<Value = (u64, u64, u64)> {
    (0u64..50, 0u64..50, 0u64..50)
}

proptest! {
    #[test]
    fn fires_iff_strictly_greater(old in version_triple(), new in version_triple()) {
        let baseline = format!("{}.{}.{}", old.0, old.1, old.2);
        let observed = format!("{}.{}.{}", new.0, new.1, new.2);

        let fired = should_fire(&baseline, &observed).unwrap();
        prop_assert_eq!(fired, new > old);
    }

    #[test]
    fn identical_versions_never_fire(v in version_triple()) {
        let version = format!("{}.{}.{}", v.0, v.1, v.2);
        prop_assert!(!should_fire(&version, &version).unwrap());
    }

    #[test]
    fn comparison_is_antisymmetric(old in version_triple(), new in version_triple()) {
        let a = format!("{}.{}.{}", old.0, old.1, old.2);
        let b = format!("{}.{}.{}", new.0, new.1, new.2);

        let forward = should_fire(&a, &b).unwrap();
        let backward = should_fire(&b, &a).unwrap();
        // At most one direction can fire; both false iff equal.
        prop_assert!(!(forward && backward));
        if a != b {
            prop_assert!(forward || backward);
        }
    }

    #[test]
    fn garbage_input_is_an_error_not_a_fire(s in "[a-z ]{1,12}") {
        prop_assert!(should_fire(&s, "1.0.0").is_err());
        prop_assert!(should_fire("1.0.0", &s).is_err());
    }
}
