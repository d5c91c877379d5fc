use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Set,
    Unique,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 2] = [ItemCategory::Set, ItemCategory::Unique];

    pub fn label(self) -> &'static str {
        match self {
            ItemCategory::Set => "Set",
            ItemCategory::Unique => "Unique",
        }
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatBlock {
    pub total_items: usize,
    pub total_found: usize,
    pub total_remaining: usize,
    pub progress: f64,
    pub found_items: Vec<String>,
    pub remaining_items: Vec<String>,
}

/// Overall numbers. Item lists are kept per category only.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TotalStat {
    pub total_items: usize,
    pub total_found: usize,
    pub total_remaining: usize,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Progress {
    pub total: TotalStat,
    pub set: StatBlock,
    pub unique: StatBlock,
}

impl Progress {
    pub fn category(&self, category: ItemCategory) -> &StatBlock {
        match category {
            ItemCategory::Set => &self.set,
            ItemCategory::Unique => &self.unique,
        }
    }

    /// Set items first, then unique items; each half keeps its own order.
    pub fn all_found(&self) -> Vec<String> {
        let mut out = self.set.found_items.clone();
        out.extend(self.unique.found_items.iter().cloned());
        out
    }

    pub fn all_remaining(&self) -> Vec<String> {
        let mut out = self.set.remaining_items.clone();
        out.extend(self.unique.remaining_items.iter().cloned());
        out
    }
}
