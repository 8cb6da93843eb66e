//! Debit/credit ledger.
//!
//! Append-only entries, either typed in by hand or generated automatically
//! when a work entry is recorded. Totals are always recomputed from the
//! entry set at hand; there is no cached running balance to drift.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::collaborator::validate_name;
use crate::error::{Error, Result};
use crate::split::validate_amount;

/// Entry kind (debit or credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Debit,
    Credit,
}

impl EntryKind {
    /// String form used in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Debit => "debit",
            EntryKind::Credit => "credit",
        }
    }

    /// Parse the storage/CLI form.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debit" | "debe" => Ok(EntryKind::Debit),
            "credit" | "haber" => Ok(EntryKind::Credit),
            other => Err(Error::validation(format!(
                "unknown ledger entry kind '{other}' (expected debit or credit)"
            ))),
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Database ID (None for rows not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub description: String,
    pub kind: EntryKind,
    pub amount: f64,
}

impl LedgerEntry {
    /// Validate and build a manual entry.
    pub fn new(date: NaiveDate, description: &str, kind: EntryKind, amount: f64) -> Result<Self> {
        let description = validate_name(description)?;
        validate_amount(amount)?;
        Ok(LedgerEntry {
            id: None,
            date,
            description,
            kind,
            amount,
        })
    }
}

/// Ledger rollup: total debits, total credits, and their difference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total_debit: f64,
    pub total_credit: f64,
    /// `total_credit - total_debit`
    pub balance: f64,
}

/// Compute totals over the given entries.
pub fn totals(entries: &[LedgerEntry]) -> LedgerTotals {
    let mut t = LedgerTotals::default();
    for entry in entries {
        match entry.kind {
            EntryKind::Debit => t.total_debit += entry.amount,
            EntryKind::Credit => t.total_credit += entry.amount,
        }
    }
    t.balance = t.total_credit - t.total_debit;
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, amount: f64) -> LedgerEntry {
        LedgerEntry::new(
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            "test entry",
            kind,
            amount,
        )
        .unwrap()
    }

    #[test]
    fn totals_balance_is_credit_minus_debit() {
        let entries = vec![
            entry(EntryKind::Debit, 20.0),
            entry(EntryKind::Credit, 50.0),
            entry(EntryKind::Debit, 5.0),
        ];
        let t = totals(&entries);
        assert_eq!(t.total_debit, 25.0);
        assert_eq!(t.total_credit, 50.0);
        assert_eq!(t.balance, 25.0);
    }

    #[test]
    fn totals_of_empty_ledger_are_zero() {
        assert_eq!(totals(&[]), LedgerTotals::default());
    }

    #[test]
    fn rejects_non_positive_amount_and_blank_description() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert!(LedgerEntry::new(date, "rent", EntryKind::Debit, 0.0).is_err());
        assert!(LedgerEntry::new(date, "rent", EntryKind::Debit, -4.0).is_err());
        assert!(LedgerEntry::new(date, "  ", EntryKind::Debit, 4.0).is_err());
    }

    #[test]
    fn kind_parses_both_english_and_spanish_forms() {
        assert_eq!(EntryKind::parse("debit").unwrap(), EntryKind::Debit);
        assert_eq!(EntryKind::parse("haber").unwrap(), EntryKind::Credit);
        assert_eq!(EntryKind::parse("Debe").unwrap(), EntryKind::Debit);
        assert!(EntryKind::parse("transfer").is_err());
    }
}
