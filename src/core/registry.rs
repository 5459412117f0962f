//! Registry of known packet layouts.
//!
//! The protocol has a quirk worth spelling out: both known layouts declare
//! wire version 3 and differ only in total packet length (720 vs 4304
//! bytes). Fallback candidates are therefore keyed by an ordered list of
//! lengths per version number, not by version number alone. A receiver that
//! fails the classic-length checksum reads on to the extended length and
//! tries again; a corrupted classic packet and a valid extended packet are
//! indistinguishable until that second read happens, and a wrong guess
//! desynchronizes the byte stream. That is inherited reference behavior, not
//! something this crate resolves differently.

use crate::core::packet::PacketVersion;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Immutable mapping from wire version number to layout candidates, ordered
/// by ascending total packet length.
pub struct VersionRegistry {
    versions: HashMap<i16, Vec<&'static PacketVersion>>,
}

impl VersionRegistry {
    fn new() -> Self {
        let mut versions: HashMap<i16, Vec<&'static PacketVersion>> = HashMap::new();
        versions.insert(
            PacketVersion::CLASSIC.version,
            vec![&PacketVersion::CLASSIC, &PacketVersion::EXTENDED],
        );
        Self { versions }
    }

    /// The process-wide registry, populated on first use and read-only
    /// afterwards.
    pub fn global() -> &'static VersionRegistry {
        static REGISTRY: OnceLock<VersionRegistry> = OnceLock::new();
        REGISTRY.get_or_init(VersionRegistry::new)
    }

    /// Layout candidates for `version`, shortest first. `None` for a version
    /// nobody registered; callers treat that as a configuration bug, not a
    /// runtime condition to recover from.
    pub fn candidates(&self, version: i16) -> Option<&[&'static PacketVersion]> {
        self.versions.get(&version).map(Vec::as_slice)
    }

    /// The default layout for `version`: the shortest registered candidate.
    pub fn default_for(&self, version: i16) -> Option<&'static PacketVersion> {
        self.candidates(version).and_then(|c| c.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::packet::PACKET_VERSION;

    #[test]
    fn version_3_has_two_length_ordered_candidates() {
        let registry = VersionRegistry::global();
        let candidates = registry.candidates(PACKET_VERSION).unwrap();
        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].packet_len() < candidates[1].packet_len());
    }

    #[test]
    fn default_is_the_classic_layout() {
        let registry = VersionRegistry::global();
        assert_eq!(
            registry.default_for(PACKET_VERSION),
            Some(&PacketVersion::CLASSIC)
        );
    }

    #[test]
    fn unknown_version_is_absent() {
        assert!(VersionRegistry::global().candidates(1).is_none());
    }
}
