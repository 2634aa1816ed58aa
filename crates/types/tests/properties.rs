//! Property tests for reference parsing and version selection

use pakt_types::{select_highest, PackagePath, UnresolvedPackage, Version, VersionSpec};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

fn package_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|s| s.join("/"))
}

fn version() -> impl Strategy<Value = Version> {
    (0u64..20, 0u64..20, 0u64..20).prop_map(|(major, minor, patch)| Version::new(major, minor, patch))
}

proptest! {
    #[test]
    fn exact_reference_parses_and_round_trips(path in package_path(), v in version()) {
        let reference = format!("{path}-{v}");
        let parsed: UnresolvedPackage = reference.parse().unwrap();
        prop_assert_eq!(parsed.path.to_string(), path);
        prop_assert_eq!(parsed.range.as_exact(), Some(&v));

        // Display form re-parses to the same value.
        let again: UnresolvedPackage = parsed.to_string().parse().unwrap();
        prop_assert_eq!(again, parsed);
    }

    #[test]
    fn bare_path_parses_as_any_range(path in package_path()) {
        let parsed: UnresolvedPackage = path.parse().unwrap();
        prop_assert!(parsed.range.is_any());
        prop_assert_eq!(parsed.to_string(), path);
    }

    #[test]
    fn path_display_round_trips(path in package_path()) {
        let parsed: PackagePath = path.parse().unwrap();
        prop_assert_eq!(parsed.to_string(), path);
    }

    #[test]
    fn selected_version_is_the_maximum_match(
        candidates in prop::collection::vec(version(), 0..12),
        lower in version(),
    ) {
        let spec: VersionSpec = format!(">={lower}").parse().unwrap();
        let selected = select_highest(&spec, &candidates);

        match selected {
            Some(chosen) => {
                prop_assert!(spec.matches(&chosen));
                for candidate in &candidates {
                    if spec.matches(candidate) {
                        prop_assert!(*candidate <= chosen);
                    }
                }
            }
            None => {
                prop_assert!(candidates.iter().all(|c| !spec.matches(c)));
            }
        }
    }
}
