use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::decoder::{CharacterSave, FileKind, ItemRecord, SaveDecoder, StashFile};

use super::error::{CoreError, CoreErrorCode};
use super::facets::{facet_pair, is_quest_unique};
use super::item_catalog::ItemCatalog;
use super::types::{ItemCategory, Progress, StatBlock, TotalStat};

/// Socket nesting allowed below a top-level item. Real items nest one level.
pub const MAX_SOCKET_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("socketed items nested deeper than {limit} levels")]
pub struct SocketDepthExceeded {
    pub limit: usize,
}

/// Id -> name mapping that remembers first-seen order and ignores repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoundItems {
    entries: Vec<(u32, String)>,
    ids: BTreeSet<u32>,
}

impl FoundItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false (and keeps the earlier name) if `id` is already present.
    pub fn insert(&mut self, id: u32, name: impl Into<String>) -> bool {
        if !self.ids.insert(id) {
            return false;
        }
        self.entries.push((id, name.into()));
        true
    }

    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> &BTreeSet<u32> {
        &self.ids
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, name)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(u32, S)> for FoundItems {
    fn from_iter<I: IntoIterator<Item = (u32, S)>>(iter: I) -> Self {
        let mut out = Self::new();
        for (id, name) in iter {
            out.insert(id, name);
        }
        out
    }
}

/// Set and unique items discovered in one directory of saves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserCollection {
    set_items: FoundItems,
    unique_items: FoundItems,
}

impl UserCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_items(&self) -> &FoundItems {
        &self.set_items
    }

    pub fn unique_items(&self) -> &FoundItems {
        &self.unique_items
    }

    pub fn items(&self, category: ItemCategory) -> &FoundItems {
        match category {
            ItemCategory::Set => &self.set_items,
            ItemCategory::Unique => &self.unique_items,
        }
    }

    /// Classifies every item and, depth first, everything socketed into it.
    pub fn record_items(&mut self, items: &[ItemRecord]) -> Result<(), SocketDepthExceeded> {
        for item in items {
            self.record_item(item, 0)?;
        }
        Ok(())
    }

    fn record_item(&mut self, item: &ItemRecord, depth: usize) -> Result<(), SocketDepthExceeded> {
        if depth > MAX_SOCKET_DEPTH {
            return Err(SocketDepthExceeded {
                limit: MAX_SOCKET_DEPTH,
            });
        }
        self.classify(item);
        for socketed in &item.socketed_items {
            self.record_item(socketed, depth + 1)?;
        }
        Ok(())
    }

    /// Records a single item without looking at its sockets. Returns whether
    /// anything new was recorded.
    pub fn classify(&mut self, item: &ItemRecord) -> bool {
        if let Some(set_id) = item.set_id
            && !self.set_items.contains(set_id)
        {
            return self.set_items.insert(set_id, item.name.as_str());
        }

        let Some(unique_id) = item.unique_id else {
            return false;
        };
        if is_quest_unique(unique_id) || self.unique_items.contains(unique_id) {
            return false;
        }

        match facet_pair(unique_id) {
            Some(pair) => self
                .unique_items
                .insert(pair.die_id, format!("{} {}", item.name, pair.suffix)),
            None => self.unique_items.insert(unique_id, item.name.as_str()),
        }
    }

    fn record_character(&mut self, save: &CharacterSave) -> Result<(), SocketDepthExceeded> {
        self.record_items(&save.items)?;
        self.record_items(&save.corpse_items)?;
        self.record_items(&save.merc_items)
    }

    fn record_stash(&mut self, stash: &StashFile) -> Result<(), SocketDepthExceeded> {
        for page in &stash.stash {
            self.record_items(&page.items)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    catalog: ItemCatalog,
}

impl Engine {
    pub fn new(catalog: ItemCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Reads every save in `save_dir` and measures it against the catalog.
    ///
    /// Any file that fails to decode aborts the whole run.
    pub fn compute_progress<D: SaveDecoder + ?Sized>(
        &self,
        save_dir: &Path,
        decoder: &D,
    ) -> Result<Progress, CoreError> {
        let collection = load_user_items(save_dir, decoder)?;
        let progress = self.progress_from(&collection);
        info!(
            save_dir = %save_dir.display(),
            found = progress.total.total_found,
            total = progress.total.total_items,
            "computed progress"
        );
        Ok(progress)
    }

    pub fn progress_from(&self, collection: &UserCollection) -> Progress {
        let set = category_stat(&self.catalog, ItemCategory::Set, collection);
        let unique = category_stat(&self.catalog, ItemCategory::Unique, collection);

        let total_items = set.total_items + unique.total_items;
        let total_found = set.total_found + unique.total_found;
        let total = TotalStat {
            total_items,
            total_found,
            total_remaining: set.total_remaining + unique.total_remaining,
            progress: calc_percentage(total_items, total_found),
        };

        Progress { total, set, unique }
    }
}

/// Decodes every recognized file in `save_dir` and collects its items.
pub fn load_user_items<D: SaveDecoder + ?Sized>(
    save_dir: &Path,
    decoder: &D,
) -> Result<UserCollection, CoreError> {
    let files = list_save_files(save_dir)?;
    if files.is_empty() {
        return Err(CoreError::files_not_found(save_dir));
    }

    let mut characters = Vec::new();
    let mut stashes = Vec::new();
    for (path, kind) in files {
        match kind {
            FileKind::Character => {
                let save = decoder
                    .decode_character(&path)
                    .map_err(|e| CoreError::file_parse(&path, e))?;
                debug!(path = %path.display(), %kind, "decoded character save");
                characters.push((path, save));
            }
            FileKind::PersonalStash | FileKind::SharedStash => {
                let stash = decoder
                    .decode_stash(kind, &path)
                    .map_err(|e| CoreError::file_parse(&path, e))?;
                debug!(
                    path = %path.display(),
                    %kind,
                    pages = stash.stash.len(),
                    "decoded stash"
                );
                stashes.push((path, stash));
            }
        }
    }

    let mut collection = UserCollection::new();
    for (path, save) in &characters {
        collection
            .record_character(save)
            .map_err(|e| CoreError::file_parse(path, e))?;
    }
    for (path, stash) in &stashes {
        collection
            .record_stash(stash)
            .map_err(|e| CoreError::file_parse(path, e))?;
    }
    Ok(collection)
}

/// Recognized save files in path order.
fn list_save_files(save_dir: &Path) -> Result<Vec<(PathBuf, FileKind)>, CoreError> {
    let entries = match fs::read_dir(save_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(CoreError::files_not_found(save_dir));
        }
        Err(e) => {
            return Err(CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read directory {}: {e}", save_dir.display()),
            ));
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read directory {}: {e}", save_dir.display()),
            )
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(kind) = FileKind::from_path(&path) {
            files.push((path, kind));
        }
    }
    files.sort();
    Ok(files)
}

/// `total` must be non-zero.
pub fn calc_percentage(total: usize, part: usize) -> f64 {
    100.0 * (part as f64 / total as f64)
}

/// Counts and found names for one category. Found names keep collection
/// order and remaining names are left empty.
pub fn common_stat(items: &BTreeMap<u32, String>, found: &FoundItems) -> StatBlock {
    let total_items = items.len();
    let total_found = found.len();
    StatBlock {
        total_items,
        total_found,
        total_remaining: total_items.saturating_sub(total_found),
        progress: calc_percentage(total_items, total_found),
        found_items: found.names().map(str::to_string).collect(),
        remaining_items: Vec::new(),
    }
}

pub fn remaining_ids(items: &BTreeMap<u32, String>, found_ids: &BTreeSet<u32>) -> BTreeSet<u32> {
    items
        .keys()
        .filter(|id| !found_ids.contains(id))
        .copied()
        .collect()
}

fn category_stat(
    catalog: &ItemCatalog,
    category: ItemCategory,
    collection: &UserCollection,
) -> StatBlock {
    let items = catalog.items(category);
    let found = collection.items(category);

    let mut stat = common_stat(items, found);
    stat.remaining_items = remaining_ids(items, found.ids())
        .into_iter()
        .filter_map(|id| catalog.display_name(category, id))
        .collect();

    stat.found_items.sort();
    stat.remaining_items.sort();
    stat
}
