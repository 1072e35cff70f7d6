// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Content-derived identifiers for graph entities.
//!
//! Every identifier is a name-based (v3) UUID in the OID namespace over a
//! normalized path, so building the same entity twice always yields the same
//! identifier.

use uuid::Uuid;

/// Returns the UUID for the path built from `parts`.
///
/// Each part is trimmed, the parts are joined with `/` and the path is
/// lower-cased.
pub(crate) fn make_uuid<S: AsRef<str>>(parts: &[S]) -> Uuid {
    let path = parts
        .iter()
        .map(|p| p.as_ref().trim())
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase();
    Uuid::new_v3(&Uuid::NAMESPACE_OID, path.as_bytes())
}

pub(crate) fn process_id(category: &str, location: &str, name: &str) -> Uuid {
    make_uuid(&["modeltype.process", category, location, name])
}

pub(crate) fn flow_id(category: &str, name: &str) -> Uuid {
    make_uuid(&["modeltype.flow", category, name])
}

pub(crate) fn location_id(code: &str) -> Uuid {
    make_uuid(&["modeltype.location", code])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_paths() {
        assert_eq!(
            make_uuid(&["modeltype.location", " US "]),
            make_uuid(&["MODELTYPE.location", "us"])
        );
        assert_eq!(location_id("US"), make_uuid(&["modeltype.location/us"]));
        assert_ne!(location_id("US"), location_id("PJM"));
        assert_eq!(
            process_id("Cat", "PJM", "Electricity - GAS - PJM"),
            make_uuid(&["modeltype.process/cat/pjm/electricity - gas - pjm"])
        );
        assert_ne!(flow_id("a", "b"), process_id("a", "", "b"));
        assert_eq!(location_id("US").get_version_num(), 3);
    }
}
