//! Work log entries.
//!
//! One row per performed service. Rows are append-only and snapshot the
//! percent and service name in effect at recording time, so later edits or
//! deletions of the collaborator/service never change historical splits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::split::Split;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkLogEntry {
    /// Database ID (None for rows not yet saved)
    #[serde(default)]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub collaborator_id: i64,
    pub service_id: i64,
    /// Service name at recording time.
    pub service_name: String,
    /// Percent applied at recording time.
    pub share_percent: f64,
    pub gross_amount: f64,
    pub collaborator_share: f64,
    pub owner_share: f64,
    /// Free-form note (client name etc.)
    #[serde(default)]
    pub notes: Option<String>,
}

impl WorkLogEntry {
    /// Assemble an entry from an already-validated split.
    pub fn from_split(
        date: NaiveDate,
        collaborator_id: i64,
        service_id: i64,
        service_name: String,
        share_percent: f64,
        gross_amount: f64,
        split: Split,
        notes: Option<String>,
    ) -> Self {
        WorkLogEntry {
            id: None,
            date,
            collaborator_id,
            service_id,
            service_name,
            share_percent,
            gross_amount,
            collaborator_share: split.collaborator_share,
            owner_share: split.owner_share,
            notes,
        }
    }

    /// Description for the ledger credit generated by this entry.
    pub fn ledger_description(&self, collaborator_name: &str) -> String {
        format!(
            "Service income: {} ({})",
            self.service_name, collaborator_name
        )
    }
}
