//! Load categories and prior labels from CSV.
//!
//! Categories: `id,name`
//! Labels:     `tx_id,name,merchant,category_id`

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::io;
use std::path::Path;
use tally_core::{CategoryMeta, LabelStore, TransactionInfo, UserId};

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SeedLabel {
    pub tx_id: String,
    pub name: String,
    pub merchant: String,
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: String,
    name: String,
}

pub fn read_categories(rdr: impl io::Read) -> Result<Vec<CategoryMeta>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<CategoryRow>().enumerate() {
        // +2: header is line 1
        let row = row.with_context(|| format!("category row {}", i + 2))?;
        if row.id.is_empty() || row.name.is_empty() {
            bail!("category row {}: id and name are required", i + 2);
        }
        out.push(CategoryMeta::new(row.id, row.name));
    }
    Ok(out)
}

pub fn read_labels(rdr: impl io::Read) -> Result<Vec<SeedLabel>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut out = Vec::new();
    for (i, row) in rdr.deserialize::<SeedLabel>().enumerate() {
        let row = row.with_context(|| format!("label row {}", i + 2))?;
        if row.tx_id.is_empty() || row.category_id.is_empty() {
            bail!("label row {}: tx_id and category_id are required", i + 2);
        }
        out.push(row);
    }
    Ok(out)
}

pub fn load_categories(path: impl AsRef<Path>) -> Result<Vec<CategoryMeta>> {
    let p = path.as_ref();
    let f = std::fs::File::open(p).with_context(|| format!("opening {}", p.display()))?;
    read_categories(f).with_context(|| format!("parsing {}", p.display()))
}

pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<SeedLabel>> {
    let p = path.as_ref();
    let f = std::fs::File::open(p).with_context(|| format!("opening {}", p.display()))?;
    read_labels(f).with_context(|| format!("parsing {}", p.display()))
}

/// Apply every seed label to `store` as `user`.
///
/// Returns how many rows landed in the trash category. Those still count as
/// history for the trash id but are never offered as candidates.
pub fn seed_store(store: &mut LabelStore, user: &UserId, labels: &[SeedLabel]) -> usize {
    let mut removed = 0;
    for l in labels {
        let label = store.apply_info(
            user.clone(),
            TransactionInfo::new(l.tx_id.as_str(), l.name.as_str(), l.merchant.as_str()),
            l.category_id.as_str().into(),
        );
        if label.is_removed() {
            removed += 1;
        }
    }
    removed
}
