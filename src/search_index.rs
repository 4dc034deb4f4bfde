//! Plant Search Index
//!
//! Common-name lookup over the USDA plants list, restricted to genera the
//! trait store knows about. Built once at startup; queries are a linear
//! substring scan (a few thousand entries).

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::data::{read_csv, TraitStore};

pub const COMMON_NAME_COL: &str = "Common Name";
pub const SCIENTIFIC_NAME_COL: &str = "Scientific Name with Author";

/// Maximum results returned by one query
pub const MAX_RESULTS: usize = 20;

/// One searchable plant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantEntry {
    /// "{common_name} ({genus})"
    pub display_name: String,
    pub common_name: String,
    pub genus: String,
}

impl PlantEntry {
    pub fn new(common_name: impl Into<String>, genus: impl Into<String>) -> Self {
        let common_name = common_name.into();
        let genus = genus.into();
        Self {
            display_name: format!("{} ({})", common_name, genus),
            common_name,
            genus,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: Vec<PlantEntry>,
}

impl SearchIndex {
    /// Build from entries, dropping repeated display names (first position kept)
    pub fn from_entries(entries: impl IntoIterator<Item = PlantEntry>) -> Self {
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.display_name.clone()))
            .collect();
        Self { entries }
    }

    /// Load the plants CSV, keeping rows whose genus is in the trait store
    ///
    /// Never fails: an unreadable file or missing columns leave the index
    /// empty with a warning, and the rest of the service keeps running.
    pub fn load(path: impl AsRef<Path>, traits: &TraitStore) -> Self {
        let path = path.as_ref();
        let valid = valid_genera(traits);

        let result = read_csv(path).and_then(|df| Self::from_dataframe(&df, &valid));
        match result {
            Ok(index) => {
                tracing::info!(
                    "Built search index with {} entries from {:?}",
                    index.len(),
                    path
                );
                index
            }
            Err(e) => {
                tracing::warn!("Search index unavailable: {:#}", e);
                Self::default()
            }
        }
    }

    /// Build from a loaded plants table
    pub fn from_dataframe(df: &DataFrame, valid_genera: &FxHashSet<String>) -> Result<Self> {
        let common = string_column(df, COMMON_NAME_COL)?;
        let scientific = string_column(df, SCIENTIFIC_NAME_COL)?;

        let mut entries = Vec::new();
        for (common_name, sci_name) in (&common).into_iter().zip(&scientific) {
            let common_name = common_name.unwrap_or_default().trim();
            if common_name.is_empty() || common_name.eq_ignore_ascii_case("nan") {
                continue;
            }

            let Some(genus) = genus_of(sci_name.unwrap_or_default()) else {
                continue;
            };

            if valid_genera.contains(&genus) {
                entries.push(PlantEntry::new(common_name, genus));
            }
        }

        Ok(Self::from_entries(entries))
    }

    /// Case-insensitive substring search on common name or genus
    ///
    /// Blank queries return nothing; at most [`MAX_RESULTS`] in index order.
    pub fn search(&self, query: &str) -> Vec<&PlantEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|e| {
                e.common_name.to_lowercase().contains(&query) || e.genus.to_lowercase().contains(&query)
            })
            .take(MAX_RESULTS)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Trait-store genera, trimmed and capitalized
pub fn valid_genera(traits: &TraitStore) -> FxHashSet<String> {
    traits
        .genera()
        .iter()
        .map(|g| capitalize(g.trim()))
        .filter(|g| !g.is_empty())
        .collect()
}

/// "abutilon" -> "Abutilon", "ACACIA" -> "Acacia"
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Genus from "Abutilon abutiloides (Jacq.) Garcke ex Hochr."
fn genus_of(scientific_name: &str) -> Option<String> {
    let cleaned = scientific_name.replace('"', "");
    cleaned.split_whitespace().next().map(capitalize)
}

fn string_column(df: &DataFrame, name: &str) -> Result<StringChunked> {
    let column = df
        .column(name)
        .with_context(|| format!("Column '{}' not found", name))?;
    let cast = column
        .cast(&DataType::String)
        .with_context(|| format!("Column '{}' could not be read as text", name))?;
    Ok(cast
        .str()
        .with_context(|| format!("Column '{}' is not string type", name))?
        .clone())
}
