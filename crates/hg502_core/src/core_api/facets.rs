//! Unique ids that need special handling in the Holy Grail 502 challenge.
//!
//! Quest rewards are granted by game progression and never count. Each
//! Rainbow Facet element exists under two unique ids (monster drop "die"
//! facet and quest "level-up" facet); both count as one collectible keyed by
//! the die id.

/// Unique ids awarded by quests.
pub const QUEST_UNIQUE_IDS: [u32; 7] = [123, 124, 125, 126, 127, 128, 4095];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetPair {
    pub die_id: u32,
    pub level_up_id: u32,
    pub suffix: &'static str,
}

impl FacetPair {
    pub fn contains(&self, unique_id: u32) -> bool {
        self.die_id == unique_id || self.level_up_id == unique_id
    }
}

#[rustfmt::skip]
pub static FACET_PAIRS: [FacetPair; 4] = [
    FacetPair { die_id: 392, level_up_id: 396, suffix: "Lightning" },
    FacetPair { die_id: 393, level_up_id: 397, suffix: "Cold" },
    FacetPair { die_id: 394, level_up_id: 398, suffix: "Fire" },
    FacetPair { die_id: 395, level_up_id: 399, suffix: "Poison" },
];

pub fn is_quest_unique(unique_id: u32) -> bool {
    QUEST_UNIQUE_IDS.contains(&unique_id)
}

pub fn facet_pair(unique_id: u32) -> Option<&'static FacetPair> {
    FACET_PAIRS.iter().find(|pair| pair.contains(unique_id))
}

pub fn is_facet(unique_id: u32) -> bool {
    facet_pair(unique_id).is_some()
}

pub fn die_facet_id(unique_id: u32) -> Option<u32> {
    facet_pair(unique_id).map(|pair| pair.die_id)
}

pub fn facet_suffix(unique_id: u32) -> Option<&'static str> {
    facet_pair(unique_id).map(|pair| pair.suffix)
}

/// "Rainbow Facet" + 397 -> "Rainbow Facet Cold". Non-facet names pass through.
pub fn facet_display_name(unique_id: u32, name: &str) -> String {
    match facet_suffix(unique_id) {
        Some(suffix) => format!("{name} {suffix}"),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{die_facet_id, facet_display_name, facet_suffix, is_facet, is_quest_unique};

    #[test]
    fn facet_detection() {
        for (id, expected) in [(392, true), (399, true), (391, false), (400, false)] {
            assert_eq!(is_facet(id), expected, "unique id {id}");
        }
    }

    #[test]
    fn facet_ids_resolve_to_die_id() {
        for (id, expected) in [(392, 392), (397, 393), (399, 395), (394, 394)] {
            assert_eq!(die_facet_id(id), Some(expected), "unique id {id}");
        }
        assert_eq!(die_facet_id(400), None);
    }

    #[test]
    fn facet_suffixes() {
        for (id, expected) in [
            (392, "Lightning"),
            (398, "Fire"),
            (399, "Poison"),
            (393, "Cold"),
        ] {
            assert_eq!(facet_suffix(id), Some(expected), "unique id {id}");
        }
    }

    #[test]
    fn display_name_appends_suffix_only_for_facets() {
        assert_eq!(
            facet_display_name(396, "Rainbow Facet"),
            "Rainbow Facet Lightning"
        );
        assert_eq!(facet_display_name(1, "The Gnasher"), "The Gnasher");
    }

    #[test]
    fn quest_ids() {
        assert!(is_quest_unique(4095));
        assert!(is_quest_unique(123));
        assert!(!is_quest_unique(122));
    }
}
