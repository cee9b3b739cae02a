//! Global player catalogue and bulk import.
//!
//! The pool is the source of truth for what can enter a session queue.
//! Rows arrive from roster sheets already parsed into plain fields; the
//! pool validates, then upserts keyed by player code when present, else by
//! (name, country). Entries are never deleted, only superseded in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use types::{Category, Money, PlayerPoolEntry, SkillType};

use crate::error::{EngineError, Result};

/// One raw import row, as it comes off a roster sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRow {
    /// Optional unique roster code; upsert key when present.
    #[serde(default)]
    pub code: Option<String>,
    /// Player name.
    pub name: String,
    /// Country.
    pub country: String,
    /// Skill label, parsed leniently ("Batsman", "WicketKeeper/Batsman", ...).
    pub skill: String,
    /// Category label ("Legend", "Platinum", "Gold").
    pub category: String,
    /// Opening bid floor; must be strictly positive.
    pub base_price: f64,
}

/// Validation failure for a single import row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    /// Zero-based index of the failing row in the submitted batch.
    pub row: usize,
    /// Why the row was rejected.
    pub reason: String,
}

/// Aggregate outcome of a bulk import. Partial success is the expected
/// case: valid rows commit even when others fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Rows submitted.
    pub total: usize,
    /// New catalogue entries created.
    pub inserted: usize,
    /// Existing entries superseded with changed fields.
    pub updated: usize,
    /// Duplicates with no field changes.
    pub skipped: usize,
    /// Per-row validation failures.
    pub errors: Vec<RowError>,
}

/// The importable player catalogue.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    entries: Vec<PlayerPoolEntry>,
    by_code: HashMap<String, usize>,
    by_name_country: HashMap<(String, String), usize>,
}

impl PlayerPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of catalogue entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalogue is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All catalogue entries in insertion order.
    pub fn entries(&self) -> &[PlayerPoolEntry] {
        &self.entries
    }

    /// Look up an entry by roster code.
    pub fn get_by_code(&self, code: &str) -> Option<&PlayerPoolEntry> {
        self.by_code.get(code).map(|&i| &self.entries[i])
    }

    /// Select entries for drawing into a session: all of them, or the
    /// subset named by code. Unknown codes fail the whole selection so an
    /// admin typo cannot silently shrink a queue.
    pub fn select(&self, codes: Option<&[String]>) -> Result<Vec<PlayerPoolEntry>> {
        match codes {
            None => Ok(self.entries.clone()),
            Some(codes) => {
                let mut selected = Vec::with_capacity(codes.len());
                let mut missing = Vec::new();
                for code in codes {
                    match self.get_by_code(code) {
                        Some(entry) => selected.push(entry.clone()),
                        None => missing.push(code.as_str()),
                    }
                }
                if missing.is_empty() {
                    Ok(selected)
                } else {
                    Err(EngineError::Validation(format!(
                        "unknown player codes: {}",
                        missing.join(", ")
                    )))
                }
            }
        }
    }

    /// Bulk upsert of roster rows.
    ///
    /// Each row is validated and classified independently; a failing row
    /// never aborts the batch. Outcomes: inserted, updated (existing entry
    /// superseded), skipped (duplicate with no changes), or errored with
    /// the row index and reason.
    pub fn import_batch(&mut self, rows: &[ImportRow]) -> ImportReport {
        let mut report = ImportReport {
            total: rows.len(),
            ..Default::default()
        };

        for (row_idx, row) in rows.iter().enumerate() {
            match validate_row(row) {
                Ok(entry) => match self.upsert(entry) {
                    UpsertOutcome::Inserted => report.inserted += 1,
                    UpsertOutcome::Updated => report.updated += 1,
                    UpsertOutcome::Unchanged => report.skipped += 1,
                },
                Err(reason) => report.errors.push(RowError {
                    row: row_idx,
                    reason,
                }),
            }
        }

        report
    }

    fn upsert(&mut self, entry: PlayerPoolEntry) -> UpsertOutcome {
        let existing = match &entry.code {
            Some(code) => self.by_code.get(code).copied(),
            None => self
                .by_name_country
                .get(&(entry.name.clone(), entry.country.clone()))
                .copied(),
        };

        match existing {
            Some(i) => {
                if self.entries[i] == entry {
                    UpsertOutcome::Unchanged
                } else {
                    self.entries[i] = entry;
                    UpsertOutcome::Updated
                }
            }
            None => {
                let i = self.entries.len();
                if let Some(code) = &entry.code {
                    self.by_code.insert(code.clone(), i);
                }
                self.by_name_country
                    .insert((entry.name.clone(), entry.country.clone()), i);
                self.entries.push(entry);
                UpsertOutcome::Inserted
            }
        }
    }
}

enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Validate one raw row into a catalogue entry.
fn validate_row(row: &ImportRow) -> std::result::Result<PlayerPoolEntry, String> {
    let name = row.name.trim();
    if name.is_empty() {
        return Err("player name is required".into());
    }
    let country = row.country.trim();
    if country.is_empty() {
        return Err("country is required".into());
    }

    let skill: SkillType = row.skill.parse()?;
    let category: Category = row.category.parse()?;

    let base_price = Money::from_float(row.base_price);
    if !base_price.is_positive() {
        return Err(format!(
            "base price must be positive, got {}",
            row.base_price
        ));
    }

    Ok(PlayerPoolEntry {
        code: row
            .code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from),
        name: name.to_string(),
        country: country.to_string(),
        skill,
        category,
        base_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, category: &str) -> ImportRow {
        ImportRow {
            code: Some(code.into()),
            name: name.into(),
            country: "India".into(),
            skill: "Batsman".into(),
            category: category.into(),
            base_price: 2.0,
        }
    }

    #[test]
    fn test_import_inserts_valid_rows() {
        let mut pool = PlayerPool::new();
        let report = pool.import_batch(&[row("P1", "A", "Gold"), row("P2", "B", "Legend")]);

        assert_eq!(report.total, 2);
        assert_eq!(report.inserted, 2);
        assert!(report.errors.is_empty());
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_bad_row_does_not_abort_batch() {
        // Row 2 (index 1) has an invalid category; rows 1 and 3 still commit.
        let mut pool = PlayerPool::new();
        let report = pool.import_batch(&[
            row("P1", "A", "Gold"),
            row("P2", "B", "Silver"),
            row("P3", "C", "Platinum"),
        ]);

        assert_eq!(report.inserted, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row, 1);
        assert!(report.errors[0].reason.contains("category"));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_reimport_identical_row_is_skipped() {
        let mut pool = PlayerPool::new();
        pool.import_batch(&[row("P1", "A", "Gold")]);
        let report = pool.import_batch(&[row("P1", "A", "Gold")]);

        assert_eq!(report.skipped, 1);
        assert_eq!(report.inserted, 0);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_reimport_changed_row_supersedes() {
        let mut pool = PlayerPool::new();
        pool.import_batch(&[row("P1", "A", "Gold")]);
        let report = pool.import_batch(&[row("P1", "A", "Platinum")]);

        assert_eq!(report.updated, 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get_by_code("P1").unwrap().category, Category::Platinum);
    }

    #[test]
    fn test_upsert_without_code_keys_on_name_country() {
        let mut pool = PlayerPool::new();
        let mut uncoded = row("", "A", "Gold");
        uncoded.code = None;

        pool.import_batch(&[uncoded.clone()]);
        let report = pool.import_batch(&[uncoded]);
        assert_eq!(report.skipped, 1);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_base_price_must_be_positive() {
        let mut pool = PlayerPool::new();
        let mut bad = row("P1", "A", "Gold");
        bad.base_price = 0.0;

        let report = pool.import_batch(&[bad]);
        assert_eq!(report.inserted, 0);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].reason.contains("base price"));
    }

    #[test]
    fn test_select_by_unknown_code_fails_loudly() {
        let mut pool = PlayerPool::new();
        pool.import_batch(&[row("P1", "A", "Gold")]);

        let err = pool.select(Some(&["P1".into(), "NOPE".into()])).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("NOPE"));
    }

    #[test]
    fn test_select_all() {
        let mut pool = PlayerPool::new();
        pool.import_batch(&[row("P1", "A", "Gold"), row("P2", "B", "Gold")]);
        assert_eq!(pool.select(None).unwrap().len(), 2);
    }
}
