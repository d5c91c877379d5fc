use std::fmt::Write as _;

use hg502_core::core_api::{ItemCategory, Progress, StatBlock, TotalStat};
use serde_json::{Map as JsonMap, Value as JsonValue};

const CATEGORY_COL_WIDTH: usize = 10;
const NUMBER_COL_WIDTH: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonStyle {
    #[default]
    CanonicalV1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListKind {
    #[default]
    Found,
    Remaining,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Found => "found",
            ListKind::Remaining => "remaining",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySelection {
    Set,
    Unique,
    #[default]
    All,
}

impl CategorySelection {
    pub fn as_str(self) -> &'static str {
        match self {
            CategorySelection::Set => "set",
            CategorySelection::Unique => "unique",
            CategorySelection::All => "all",
        }
    }

    fn category(self) -> Option<ItemCategory> {
        match self {
            CategorySelection::Set => Some(ItemCategory::Set),
            CategorySelection::Unique => Some(ItemCategory::Unique),
            CategorySelection::All => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListSelection {
    pub category: CategorySelection,
    pub kind: ListKind,
    /// Case-insensitive substring; blank means no filtering.
    pub search: Option<String>,
}

pub fn render_json_full(progress: &Progress, style: JsonStyle) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => JsonValue::Object(progress_json(progress)),
    }
}

pub fn render_json_list(
    progress: &Progress,
    selection: &ListSelection,
    style: JsonStyle,
) -> JsonValue {
    match style {
        JsonStyle::CanonicalV1 => {
            let mut out = JsonMap::new();
            out.insert(
                "category".to_string(),
                JsonValue::String(selection.category.as_str().to_string()),
            );
            out.insert(
                "list".to_string(),
                JsonValue::String(selection.kind.as_str().to_string()),
            );
            if let Some(search) = selection.search.as_deref() {
                out.insert("search".to_string(), JsonValue::String(search.to_string()));
            }
            out.insert(
                "items".to_string(),
                string_list_json(&selected_items(progress, selection)),
            );
            JsonValue::Object(out)
        }
    }
}

/// Set, Unique and Total rows with counts and percentage.
pub fn render_stat_table(progress: &Progress) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<cw$}{:>nw$}{:>nw$}{:>nw$}{:>nw$}",
        "Category",
        "Items",
        "Found",
        "Remaining",
        "Progress",
        cw = CATEGORY_COL_WIDTH,
        nw = NUMBER_COL_WIDTH,
    );

    for category in ItemCategory::ALL {
        let stat = progress.category(category);
        push_stat_row(
            &mut out,
            category.label(),
            stat.total_items,
            stat.total_found,
            stat.total_remaining,
            stat.progress,
        );
    }

    let total = &progress.total;
    push_stat_row(
        &mut out,
        "Total",
        total.total_items,
        total.total_found,
        total.total_remaining,
        total.progress,
    );
    out
}

/// One item name per line.
pub fn render_item_list(progress: &Progress, selection: &ListSelection) -> String {
    let mut out = String::new();
    for item in selected_items(progress, selection) {
        out.push_str(&item);
        out.push('\n');
    }
    out
}

pub fn selected_items(progress: &Progress, selection: &ListSelection) -> Vec<String> {
    let items = match (selection.category.category(), selection.kind) {
        (Some(category), ListKind::Found) => progress.category(category).found_items.clone(),
        (Some(category), ListKind::Remaining) => {
            progress.category(category).remaining_items.clone()
        }
        (None, ListKind::Found) => progress.all_found(),
        (None, ListKind::Remaining) => progress.all_remaining(),
    };

    match selection.search.as_deref() {
        Some(query) => filter_items(&items, query),
        None => items,
    }
}

pub fn filter_items(items: &[String], query: &str) -> Vec<String> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

pub fn format_progress(progress: f64) -> String {
    format!("{progress:.2}%")
}

fn push_stat_row(
    out: &mut String,
    label: &str,
    items: usize,
    found: usize,
    remaining: usize,
    progress: f64,
) {
    let _ = writeln!(
        out,
        "{:<cw$}{:>nw$}{:>nw$}{:>nw$}{:>nw$}",
        label,
        items,
        found,
        remaining,
        format_progress(progress),
        cw = CATEGORY_COL_WIDTH,
        nw = NUMBER_COL_WIDTH,
    );
}

fn progress_json(progress: &Progress) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert("total".to_string(), total_json(&progress.total));
    out.insert("set".to_string(), stat_block_json(&progress.set));
    out.insert("unique".to_string(), stat_block_json(&progress.unique));
    out
}

fn total_json(total: &TotalStat) -> JsonValue {
    JsonValue::Object(counts_json(
        total.total_items,
        total.total_found,
        total.total_remaining,
        total.progress,
    ))
}

fn stat_block_json(stat: &StatBlock) -> JsonValue {
    let mut out = counts_json(
        stat.total_items,
        stat.total_found,
        stat.total_remaining,
        stat.progress,
    );
    out.insert("found_items".to_string(), string_list_json(&stat.found_items));
    out.insert(
        "remaining_items".to_string(),
        string_list_json(&stat.remaining_items),
    );
    JsonValue::Object(out)
}

fn counts_json(
    total_items: usize,
    total_found: usize,
    total_remaining: usize,
    progress: f64,
) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    out.insert("total_items".to_string(), JsonValue::from(total_items));
    out.insert("total_found".to_string(), JsonValue::from(total_found));
    out.insert(
        "total_remaining".to_string(),
        JsonValue::from(total_remaining),
    );
    out.insert("progress".to_string(), JsonValue::from(progress));
    out
}

fn string_list_json(items: &[String]) -> JsonValue {
    JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
}
