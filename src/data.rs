//! Trait Store and Salinity Index
//!
//! Loads the genus trait table and the salinity side table with Polars and
//! keeps them as typed, read-only lookups. Both are built once at startup
//! and never mutated afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use rustc_hash::FxHashMap;

use crate::traits::{TraitRow, TraitValue};
use crate::utils::DefaultsPolicy;

pub const GENUS_COL: &str = "Genus";
pub const FAMILY_COL: &str = "Family";
pub const SALINITY_COL: &str = "Salinity_Tol";

/// Trait table columns with a dedicated field on [`TraitRow`]
pub const WOOD_COL: &str = "perc_wood";
pub const PERENNIAL_COL: &str = "perc_per";
pub const TEMPERATURE_COL: &str = "tavg";
pub const C_VALUE_COL: &str = "C_value";
pub const PHYLO_COL: &str = "Phylo_Dist_Root";

const NAMED_TRAIT_COLS: &[&str] = &[WOOD_COL, PERENNIAL_COL, TEMPERATURE_COL, C_VALUE_COL, PHYLO_COL];

/// Which named trait columns the loaded table carried
///
/// An absent column is different from a present column full of unknowns:
/// only the former lets the zone rules fall back to policy defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraitColumns {
    pub perc_wood: bool,
    pub perc_per: bool,
    pub tavg: bool,
    pub c_value: bool,
    pub phylo_dist_root: bool,
}

impl TraitColumns {
    pub const ALL: TraitColumns = TraitColumns {
        perc_wood: true,
        perc_per: true,
        tavg: true,
        c_value: true,
        phylo_dist_root: true,
    };

    fn of(df: &DataFrame) -> Self {
        let has = |name: &str| df.column(name).is_ok();
        Self {
            perc_wood: has(WOOD_COL),
            perc_per: has(PERENNIAL_COL),
            tavg: has(TEMPERATURE_COL),
            c_value: has(C_VALUE_COL),
            phylo_dist_root: has(PHYLO_COL),
        }
    }
}

impl Default for TraitColumns {
    fn default() -> Self {
        Self::ALL
    }
}

/// Read-only genus -> trait row table
#[derive(Debug, Default)]
pub struct TraitStore {
    rows: FxHashMap<String, TraitRow>,
    /// Genera in table order (sampling draws from this)
    order: Vec<String>,
    columns: TraitColumns,
}

impl TraitStore {
    /// Build from rows already in memory; the first row wins on duplicate genus
    ///
    /// Every named trait column counts as present.
    pub fn from_rows(rows: impl IntoIterator<Item = TraitRow>) -> Self {
        let mut store = TraitStore::default();
        let mut duplicates = 0usize;

        for row in rows {
            if store.rows.contains_key(&row.genus) {
                duplicates += 1;
                continue;
            }
            store.order.push(row.genus.clone());
            store.rows.insert(row.genus.clone(), row);
        }

        if duplicates > 0 {
            tracing::warn!("Trait table: skipped {} duplicate genus rows", duplicates);
        }

        store
    }

    /// Load the trait table from CSV
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let df = read_csv(path)?;
        let store = Self::from_dataframe(&df)
            .with_context(|| format!("Failed to build trait store from {:?}", path))?;

        tracing::info!("Loaded {} genera from {:?}", store.len(), path);
        Ok(store)
    }

    /// Build from a loaded DataFrame
    ///
    /// `Genus` is required. `Family` and the named trait columns are optional
    /// (missing -> "Unknown" family / unknown traits). Every other numeric
    /// column lands in [`TraitRow::extra`].
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let genus_col = df
            .column(GENUS_COL)
            .with_context(|| format!("Column '{}' not found", GENUS_COL))?
            .str()
            .with_context(|| format!("Column '{}' is not string type", GENUS_COL))?;

        let family_col = df.column(FAMILY_COL).ok().and_then(|c| c.str().ok());

        let named: FxHashMap<&str, Option<Float64Chunked>> = NAMED_TRAIT_COLS
            .iter()
            .map(|name| {
                let values = numeric_column(df, name)?;
                if values.is_none() {
                    tracing::warn!("Trait column '{}' missing; treating as unknown", name);
                }
                Ok((*name, values))
            })
            .collect::<Result<_>>()?;

        let mut extra_cols: Vec<(String, Float64Chunked)> = Vec::new();
        for column in df.get_columns() {
            let name = column.name().to_string();
            if name == GENUS_COL || name == FAMILY_COL || NAMED_TRAIT_COLS.contains(&name.as_str()) {
                continue;
            }
            if let Some(values) = numeric_column(df, &name)? {
                extra_cols.push((name, values));
            }
        }

        let value_at = |name: &str, idx: usize| -> TraitValue {
            let raw = named.get(name).and_then(|c| c.as_ref()).and_then(|c| c.get(idx));
            TraitValue::from_raw(raw)
        };

        let mut rows = Vec::with_capacity(df.height());
        for idx in 0..df.height() {
            let Some(genus) = genus_col.get(idx) else {
                continue;
            };

            let family = family_col
                .and_then(|c| c.get(idx))
                .map(|s| s.to_string())
                .unwrap_or_else(|| DefaultsPolicy::STANDARD.family.to_string());

            let extra: BTreeMap<String, TraitValue> = extra_cols
                .iter()
                .map(|(name, values)| (name.clone(), TraitValue::from_raw(values.get(idx))))
                .collect();

            rows.push(TraitRow {
                genus: genus.to_string(),
                family,
                perc_wood: value_at(WOOD_COL, idx),
                perc_per: value_at(PERENNIAL_COL, idx),
                tavg: value_at(TEMPERATURE_COL, idx),
                c_value: value_at(C_VALUE_COL, idx),
                phylo_dist_root: value_at(PHYLO_COL, idx),
                extra,
            });
        }

        let mut store = Self::from_rows(rows);
        store.columns = TraitColumns::of(df);
        Ok(store)
    }

    /// Look up a genus verbatim (no case or whitespace normalization)
    pub fn lookup(&self, genus: &str) -> Option<&TraitRow> {
        self.rows.get(genus)
    }

    pub fn contains(&self, genus: &str) -> bool {
        self.rows.contains_key(genus)
    }

    /// Genera in table order
    pub fn genera(&self) -> &[String] {
        &self.order
    }

    /// Named trait columns present in the source table
    pub fn columns(&self) -> &TraitColumns {
        &self.columns
    }

    /// Same rows with an explicit column set (tables built in memory)
    pub fn with_columns(mut self, columns: TraitColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Read-only genus -> salinity tolerance lookup
#[derive(Debug, Default)]
pub struct SalinityIndex {
    values: FxHashMap<String, f64>,
}

impl SalinityIndex {
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, f64)>) -> Self {
        Self {
            values: pairs.into_iter().map(|(g, v)| (g.into(), v)).collect(),
        }
    }

    /// Load `Genus` / `Salinity_Tol` from CSV; empty cells become 0
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let df = read_csv(path)?;

        let genus_col = df
            .column(GENUS_COL)
            .with_context(|| format!("Column '{}' not found in {:?}", GENUS_COL, path))?
            .str()
            .with_context(|| format!("Column '{}' is not string type", GENUS_COL))?;

        let salinity = numeric_column(&df, SALINITY_COL)?
            .with_context(|| format!("Column '{}' not found or not numeric in {:?}", SALINITY_COL, path))?;

        let mut values = FxHashMap::default();
        for idx in 0..df.height() {
            if let Some(genus) = genus_col.get(idx) {
                let value = salinity
                    .get(idx)
                    .filter(|v| v.is_finite())
                    .unwrap_or(DefaultsPolicy::STANDARD.salinity);
                values.insert(genus.to_string(), value);
            }
        }

        tracing::info!("Loaded {} salinity values from {:?}", values.len(), path);
        Ok(Self { values })
    }

    /// Load if possible; an absent or unreadable file yields an empty index
    pub fn load_optional(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Salinity file {:?} not found; all salinity values default to 0", path);
            return Self::default();
        }

        match Self::load_csv(path) {
            Ok(index) => index,
            Err(e) => {
                tracing::warn!("Could not load salinity file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Salinity tolerance of a genus (0 when absent)
    pub fn tolerance(&self, genus: &str) -> f64 {
        self.values
            .get(genus)
            .copied()
            .unwrap_or(DefaultsPolicy::STANDARD.salinity)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Read a headed CSV with trimmed column names
///
/// Accepts the USDA export style where fields are separated by `", "`:
/// padding after a separator is dropped before parsing, so quoted fields
/// keep their embedded commas and lose their quotes.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let raw = std::fs::read(path).with_context(|| format!("Failed to read CSV: {:?}", path))?;
    let bytes = strip_padding(&raw);

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(std::io::Cursor::new(bytes))
        .finish()
        .with_context(|| format!("Failed to load CSV: {:?}", path))?;

    let cleaned: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.replace('"', "").trim().to_string())
        .collect();
    df.set_column_names(cleaned)
        .with_context(|| format!("Failed to clean column names in {:?}", path))?;

    Ok(df)
}

/// Drop spaces and tabs at the start of each field (outside quotes)
fn strip_padding(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut in_quotes = false;
    let mut field_start = true;

    for &byte in raw {
        match byte {
            b' ' | b'\t' if field_start && !in_quotes => continue,
            b'"' => in_quotes = !in_quotes,
            b',' | b'\n' if !in_quotes => {
                out.push(byte);
                field_start = true;
                continue;
            }
            _ => {}
        }
        field_start = false;
        out.push(byte);
    }

    out
}

/// Numeric column as f64, or `None` if absent or non-numeric
fn numeric_column(df: &DataFrame, name: &str) -> Result<Option<Float64Chunked>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };

    if !is_numeric_dtype(column.dtype()) {
        return Ok(None);
    }

    let cast = column
        .cast(&DataType::Float64)
        .with_context(|| format!("Column '{}' could not be cast to f64", name))?;
    let values = cast
        .f64()
        .with_context(|| format!("Column '{}' is not f64 after cast", name))?
        .clone();

    Ok(Some(values))
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::Int16
            | DataType::Int8
            | DataType::UInt64
            | DataType::UInt32
            | DataType::UInt16
            | DataType::UInt8
            | DataType::Null
    )
}
