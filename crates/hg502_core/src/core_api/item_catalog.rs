use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::error::{CoreError, CoreErrorCode};
use super::facets::{FACET_PAIRS, QUEST_UNIQUE_IDS, facet_display_name};
use super::types::ItemCategory;

pub const SET_ITEMS_TABLE: &str = "SetItems.txt";
pub const UNIQUE_ITEMS_TABLE: &str = "UniqueItems.txt";

/// Set and unique item names keyed by the ids stored in save files, before
/// any exclusions.
const REFERENCE_ITEMS: &str = include_str!("../../data/items.json");

const NAME_COLUMN: &str = "index";
const ID_COLUMN: &str = "*ID";
const SEPARATOR_ROW: &str = "Expansion";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReferenceTables {
    set_items: BTreeMap<u32, String>,
    unique_items: BTreeMap<u32, String>,
}

/// Every collectible set and unique item, with quest rewards and level-up
/// Rainbow Facets already removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCatalog {
    set_items: BTreeMap<u32, String>,
    unique_items: BTreeMap<u32, String>,
}

impl ItemCatalog {
    /// The built-in Lord of Destruction catalog: 127 set and 375 unique items.
    pub fn reference() -> Result<Self, CoreError> {
        let tables = reference_tables()?;
        Self::from_tables(tables.set_items, tables.unique_items)
    }

    /// Built-in catalog with display names taken from the game's
    /// `SetItems.txt` and `UniqueItems.txt` in `data_dir`.
    ///
    /// Table rows only rename items the catalog already tracks; rows for
    /// other ids are ignored so the challenge always has the same members.
    pub fn load_from_data_dir(data_dir: &Path) -> Result<Self, CoreError> {
        let mut tables = reference_tables()?;
        let set_rows = load_table(data_dir, SET_ITEMS_TABLE)?;
        let unique_rows = load_table(data_dir, UNIQUE_ITEMS_TABLE)?;

        let renamed_sets = rename_known(&mut tables.set_items, set_rows);
        let renamed_uniques = rename_known(&mut tables.unique_items, unique_rows);
        debug!(
            data_dir = %data_dir.display(),
            renamed_sets,
            renamed_uniques,
            "applied reference table names"
        );
        Self::from_tables(tables.set_items, tables.unique_items)
    }

    pub fn from_tables(
        set_items: BTreeMap<u32, String>,
        mut unique_items: BTreeMap<u32, String>,
    ) -> Result<Self, CoreError> {
        if set_items.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::Catalog,
                "reference data contains no set items",
            ));
        }
        if unique_items.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::Catalog,
                "reference data contains no unique items",
            ));
        }

        for quest_id in QUEST_UNIQUE_IDS {
            let Some(name) = unique_items.remove(&quest_id) else {
                return Err(CoreError::new(
                    CoreErrorCode::Catalog,
                    format!("quest reward unique id {quest_id} missing from reference data"),
                ));
            };
            debug!(unique_id = quest_id, %name, "excluded quest reward");
        }

        for pair in &FACET_PAIRS {
            if unique_items.remove(&pair.level_up_id).is_none() {
                return Err(CoreError::new(
                    CoreErrorCode::Catalog,
                    format!(
                        "level-up Rainbow Facet id {} ({}) missing from reference data",
                        pair.level_up_id, pair.suffix
                    ),
                ));
            }
        }

        Ok(Self {
            set_items,
            unique_items,
        })
    }

    pub fn set_items(&self) -> &BTreeMap<u32, String> {
        &self.set_items
    }

    pub fn unique_items(&self) -> &BTreeMap<u32, String> {
        &self.unique_items
    }

    pub fn items(&self, category: ItemCategory) -> &BTreeMap<u32, String> {
        match category {
            ItemCategory::Set => &self.set_items,
            ItemCategory::Unique => &self.unique_items,
        }
    }

    pub fn category_len(&self, category: ItemCategory) -> usize {
        self.items(category).len()
    }

    pub fn total_len(&self) -> usize {
        self.set_items.len() + self.unique_items.len()
    }

    pub fn get(&self, category: ItemCategory, id: u32) -> Option<&str> {
        self.items(category).get(&id).map(String::as_str)
    }

    /// Name as shown in item lists; Rainbow Facets carry their element.
    pub fn display_name(&self, category: ItemCategory, id: u32) -> Option<String> {
        let name = self.get(category, id)?;
        Some(match category {
            ItemCategory::Set => name.to_string(),
            ItemCategory::Unique => facet_display_name(id, name),
        })
    }
}

fn reference_tables() -> Result<ReferenceTables, CoreError> {
    serde_json::from_str(REFERENCE_ITEMS).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Catalog,
            format!("built-in item data is invalid: {e}"),
        )
    })
}

fn rename_known(items: &mut BTreeMap<u32, String>, rows: BTreeMap<u32, String>) -> usize {
    let mut renamed = 0;
    for (id, name) in rows {
        if let Some(current) = items.get_mut(&id) {
            *current = name;
            renamed += 1;
        }
    }
    renamed
}

fn load_table(data_dir: &Path, file_name: &str) -> Result<BTreeMap<u32, String>, CoreError> {
    let path = resolve_case_insensitive_path(data_dir, &[file_name]).ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::Catalog,
            format!("could not find {file_name} under {}", data_dir.display()),
        )
    })?;
    let bytes = fs::read(&path).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Catalog,
            format!("failed to read {}: {e}", path.display()),
        )
    })?;
    parse_table(&String::from_utf8_lossy(&bytes)).map_err(|e| {
        CoreError::new(
            CoreErrorCode::Catalog,
            format!("invalid table {}: {e}", path.display()),
        )
    })
}

/// Reads a tab-separated game table into id -> name.
///
/// Ids come from the `*ID` column when the table has one, otherwise from the
/// position among item rows. Blank and separator rows are not items.
fn parse_table(contents: &str) -> Result<BTreeMap<u32, String>, String> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or("table has no header row")?;
    let columns: Vec<&str> = header.split('\t').map(str::trim).collect();

    let name_col = columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(NAME_COLUMN))
        .ok_or_else(|| format!("missing `{NAME_COLUMN}` column"))?;
    let id_col = columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case(ID_COLUMN));

    let mut out = BTreeMap::new();
    let mut ordinal: u32 = 0;
    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split('\t').collect();
        let name = fields.get(name_col).map_or("", |f| f.trim());
        if name.is_empty() || name.eq_ignore_ascii_case(SEPARATOR_ROW) {
            continue;
        }

        // Data rows start on line 2.
        let row = line_no + 2;
        let id = match id_col {
            Some(col) => {
                let raw = fields.get(col).map_or("", |f| f.trim());
                raw.parse::<u32>()
                    .map_err(|_| format!("row {row} ({name}): invalid id `{raw}`"))?
            }
            None => ordinal,
        };
        ordinal += 1;

        if let Some(previous) = out.insert(id, name.to_string()) {
            return Err(format!(
                "row {row} ({name}): id {id} already used by {previous}"
            ));
        }
    }

    Ok(out)
}

fn resolve_case_insensitive_path(base: &Path, parts: &[&str]) -> Option<PathBuf> {
    let mut current = base.to_path_buf();
    for part in parts {
        current = resolve_case_insensitive_component(&current, part)?;
    }
    Some(current)
}

fn resolve_case_insensitive_component(base: &Path, part: &str) -> Option<PathBuf> {
    let direct = base.join(part);
    if direct.exists() {
        return Some(direct);
    }

    let entries = fs::read_dir(base).ok()?;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().eq_ignore_ascii_case(part) {
            return Some(entry.path());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fmt::Write as _;
    use std::fs;

    use super::super::error::CoreErrorCode;
    use super::super::facets::{FACET_PAIRS, QUEST_UNIQUE_IDS};
    use super::super::types::ItemCategory;
    use super::{ItemCatalog, parse_table, reference_tables};

    fn minimal_unique_table() -> BTreeMap<u32, String> {
        let mut unique = BTreeMap::new();
        unique.insert(0, "The Gnasher".to_string());
        for id in [123, 124, 125, 126, 127, 128, 4095] {
            unique.insert(id, format!("Quest {id}"));
        }
        for id in 392..=399 {
            unique.insert(id, "Rainbow Facet".to_string());
        }
        unique
    }

    fn minimal_set_table() -> BTreeMap<u32, String> {
        BTreeMap::from([(0, "Civerb's Ward".to_string())])
    }

    #[test]
    fn built_in_tables_hold_every_excluded_id() {
        let tables = reference_tables().expect("built-in data should parse");
        assert_eq!(tables.set_items.len(), 127);
        assert_eq!(tables.unique_items.len(), 386);
        for id in QUEST_UNIQUE_IDS {
            assert!(tables.unique_items.contains_key(&id), "quest id {id}");
        }
        for pair in &FACET_PAIRS {
            assert_eq!(tables.unique_items[&pair.die_id], "Rainbow Facet");
            assert_eq!(tables.unique_items[&pair.level_up_id], "Rainbow Facet");
        }
    }

    #[test]
    fn reference_catalog_has_502_items() {
        let catalog = ItemCatalog::reference().expect("reference catalog should build");
        assert_eq!(catalog.category_len(ItemCategory::Set), 127);
        assert_eq!(catalog.category_len(ItemCategory::Unique), 375);
        assert_eq!(catalog.total_len(), 502);
        assert_eq!(catalog.get(ItemCategory::Set, 0), Some("Civerb's Ward"));
        assert_eq!(catalog.get(ItemCategory::Unique, 0), Some("The Gnasher"));
        assert_eq!(catalog.get(ItemCategory::Unique, 122), Some("The Stone of Jordan"));
    }

    #[test]
    fn parse_table_uses_id_column_when_present() {
        let raw = "index\t*ID\tlvl\nThe Gnasher\t0\t7\nExpansion\t\t\nDeathspade\t1\t9\n\n";
        let parsed = parse_table(raw).expect("table should parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get(&0).map(String::as_str), Some("The Gnasher"));
        assert_eq!(parsed.get(&1).map(String::as_str), Some("Deathspade"));
    }

    #[test]
    fn parse_table_numbers_item_rows_without_id_column() {
        let raw = "index\tset\r\nCiverb's Ward\tCiverb's Vestments\r\nExpansion\t\r\nIratha's Collar\tIratha's Finery\r\n";
        let parsed = parse_table(raw).expect("table should parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get(&0).map(String::as_str), Some("Civerb's Ward"));
        assert_eq!(parsed.get(&1).map(String::as_str), Some("Iratha's Collar"));
    }

    #[test]
    fn parse_table_requires_name_column() {
        let err = parse_table("name\t*ID\nThe Gnasher\t0\n").expect_err("missing index column");
        assert!(err.contains("index"));
    }

    #[test]
    fn parse_table_rejects_duplicate_ids() {
        let err = parse_table("index\t*ID\nA\t5\nB\t5\n").expect_err("duplicate id");
        assert!(err.contains("id 5 already used by A"), "{err}");
    }

    #[test]
    fn parse_table_rejects_garbled_ids() {
        let err = parse_table("index\t*ID\nA\t5\nB\tfive\n").expect_err("garbled id");
        assert!(err.contains("row 3 (B)"), "{err}");

        let err = parse_table("index\t*ID\nA\t\n").expect_err("empty id");
        assert!(err.contains("invalid id"), "{err}");
    }

    #[test]
    fn from_tables_removes_quest_and_level_up_ids() {
        let catalog = ItemCatalog::from_tables(minimal_set_table(), minimal_unique_table())
            .expect("catalog should build");

        let ids: Vec<u32> = catalog.unique_items().keys().copied().collect();
        assert_eq!(ids, vec![0, 392, 393, 394, 395]);
        assert_eq!(catalog.category_len(ItemCategory::Set), 1);
        assert_eq!(catalog.total_len(), 6);
        assert_eq!(
            catalog.display_name(ItemCategory::Unique, 394).as_deref(),
            Some("Rainbow Facet Fire")
        );
        assert_eq!(
            catalog.display_name(ItemCategory::Unique, 0).as_deref(),
            Some("The Gnasher")
        );
        assert_eq!(catalog.display_name(ItemCategory::Unique, 396), None);
    }

    #[test]
    fn from_tables_rejects_missing_quest_id() {
        let mut unique = minimal_unique_table();
        unique.remove(&4095);
        let err = ItemCatalog::from_tables(minimal_set_table(), unique)
            .expect_err("missing quest id should fail");
        assert_eq!(err.code, CoreErrorCode::Catalog);
        assert!(err.message.contains("4095"));
    }

    #[test]
    fn from_tables_rejects_missing_level_up_facet() {
        let mut unique = minimal_unique_table();
        unique.remove(&398);
        let err = ItemCatalog::from_tables(minimal_set_table(), unique)
            .expect_err("missing level-up facet should fail");
        assert_eq!(err.code, CoreErrorCode::Catalog);
        assert!(err.message.contains("398"));
    }

    #[test]
    fn game_tables_rename_without_changing_membership() {
        let root = tempfile::tempdir().expect("temp dir");

        let mut set_table = String::from("index\tversion\tenabled\n");
        for id in 0..127 {
            writeln!(set_table, "Set {id}\t0\t1").expect("write set row");
        }
        let mut unique_table = String::from("index\tversion\tenabled\n");
        for id in 0..401 {
            if id == 129 {
                unique_table.push_str("Expansion\t\t\n");
            }
            writeln!(unique_table, "Unique {id}\t100\t1").expect("write unique row");
        }
        fs::write(root.path().join("setitems.txt"), set_table).expect("failed to write set table");
        fs::write(root.path().join("UNIQUEITEMS.TXT"), unique_table)
            .expect("failed to write unique table");

        let catalog =
            ItemCatalog::load_from_data_dir(root.path()).expect("game tables should load");
        assert_eq!(catalog.category_len(ItemCategory::Set), 127);
        assert_eq!(catalog.category_len(ItemCategory::Unique), 375);
        assert_eq!(catalog.get(ItemCategory::Set, 126), Some("Set 126"));
        assert_eq!(catalog.get(ItemCategory::Unique, 129), Some("Unique 129"));
        assert_eq!(
            catalog.display_name(ItemCategory::Unique, 393).as_deref(),
            Some("Unique 393 Cold")
        );
    }

    #[test]
    fn load_from_data_dir_reports_missing_tables() {
        let root = tempfile::tempdir().expect("temp dir");
        let err = ItemCatalog::load_from_data_dir(root.path()).expect_err("no tables");
        assert_eq!(err.code, CoreErrorCode::Catalog);
        assert!(err.message.contains("SetItems.txt"));
    }

    #[test]
    fn unreadable_table_is_a_catalog_error() {
        let root = tempfile::tempdir().expect("temp dir");
        fs::write(root.path().join("SetItems.txt"), "index\nCiverb's Ward\n")
            .expect("failed to write set table");
        fs::create_dir(root.path().join("UniqueItems.txt")).expect("failed to create dir");

        let err = ItemCatalog::load_from_data_dir(root.path()).expect_err("unreadable table");
        assert_eq!(err.code, CoreErrorCode::Catalog);
        assert!(err.message.contains("UniqueItems.txt"), "{}", err.message);
    }
}
