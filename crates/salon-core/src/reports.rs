//! Time-windowed per-collaborator share reports.
//!
//! The three canonical windows mirror the reporting views of the app:
//! daily (today only), weekly (Monday of the current week through today),
//! monthly (first of the current month through today). Aggregation groups
//! by collaborator id so renames do not fragment history, and resolves
//! names only for display.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::collaborator::DELETED_COLLABORATOR;
use crate::worklog::WorkLogEntry;

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Today only.
    pub fn daily(today: NaiveDate) -> Self {
        ReportWindow {
            start: today,
            end: today,
        }
    }

    /// Monday of the current week through today.
    pub fn weekly(today: NaiveDate) -> Self {
        let monday = today - chrono::Days::new(today.weekday().num_days_from_monday() as u64);
        ReportWindow {
            start: monday,
            end: today,
        }
    }

    /// First day of the current month through today.
    pub fn monthly(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        ReportWindow {
            start: first,
            end: today,
        }
    }

    /// Inclusive containment on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// One aggregated row: a collaborator's summed shares over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub collaborator_id: i64,
    pub collaborator_name: String,
    pub total_collaborator_share: f64,
    pub total_owner_share: f64,
}

/// Sum work-log shares per collaborator over a window.
///
/// `names` maps collaborator ids to current display names; missing ids
/// (deleted collaborators) get a placeholder. Rows come back sorted by
/// name ascending, and an empty window yields an empty vec.
pub fn aggregate(
    entries: &[WorkLogEntry],
    window: ReportWindow,
    names: &HashMap<i64, String>,
) -> Vec<ReportRow> {
    let mut sums: HashMap<i64, (f64, f64)> = HashMap::new();
    for entry in entries {
        if !window.contains(entry.date) {
            continue;
        }
        let slot = sums.entry(entry.collaborator_id).or_insert((0.0, 0.0));
        slot.0 += entry.collaborator_share;
        slot.1 += entry.owner_share;
    }

    let mut rows: Vec<ReportRow> = sums
        .into_iter()
        .map(|(id, (collab, owner))| ReportRow {
            collaborator_id: id,
            collaborator_name: names
                .get(&id)
                .cloned()
                .unwrap_or_else(|| DELETED_COLLABORATOR.to_string()),
            total_collaborator_share: collab,
            total_owner_share: owner,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.collaborator_name
            .cmp(&b.collaborator_name)
            .then(a.collaborator_id.cmp(&b.collaborator_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split;
    use crate::worklog::WorkLogEntry;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(date: NaiveDate, collaborator_id: i64, gross: f64, percent: f64) -> WorkLogEntry {
        let s = split::split(gross, percent).unwrap();
        WorkLogEntry::from_split(
            date,
            collaborator_id,
            1,
            "Corte de pelo".to_string(),
            percent,
            gross,
            s,
            None,
        )
    }

    #[test]
    fn weekly_window_starts_on_monday() {
        // 2026-03-14 is a Saturday
        let w = ReportWindow::weekly(ymd(2026, 3, 14));
        assert_eq!(w.start, ymd(2026, 3, 9));
        assert_eq!(w.end, ymd(2026, 3, 14));

        // A Monday is its own week start
        let w = ReportWindow::weekly(ymd(2026, 3, 9));
        assert_eq!(w.start, ymd(2026, 3, 9));
    }

    #[test]
    fn monthly_window_starts_on_the_first() {
        let w = ReportWindow::monthly(ymd(2026, 3, 14));
        assert_eq!(w.start, ymd(2026, 3, 1));
        assert_eq!(w.end, ymd(2026, 3, 14));
    }

    #[test]
    fn daily_window_is_a_single_day() {
        let w = ReportWindow::daily(ymd(2026, 3, 14));
        assert!(w.contains(ymd(2026, 3, 14)));
        assert!(!w.contains(ymd(2026, 3, 13)));
        assert!(!w.contains(ymd(2026, 3, 15)));
    }

    #[test]
    fn aggregates_per_collaborator_sorted_by_name() {
        let names: HashMap<i64, String> = [(1, "Zoe".to_string()), (2, "Ana".to_string())].into();
        let entries = vec![
            entry(ymd(2026, 3, 10), 1, 100.0, 40.0),
            entry(ymd(2026, 3, 11), 1, 50.0, 40.0),
            entry(ymd(2026, 3, 11), 2, 80.0, 25.0),
            // outside the window
            entry(ymd(2026, 2, 28), 1, 999.0, 40.0),
        ];
        let window = ReportWindow {
            start: ymd(2026, 3, 1),
            end: ymd(2026, 3, 31),
        };

        let rows = aggregate(&entries, window, &names);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].collaborator_name, "Ana");
        assert_eq!(rows[0].total_collaborator_share, 20.0);
        assert_eq!(rows[0].total_owner_share, 60.0);
        assert_eq!(rows[1].collaborator_name, "Zoe");
        assert_eq!(rows[1].total_collaborator_share, 60.0);
        assert_eq!(rows[1].total_owner_share, 90.0);
    }

    #[test]
    fn deleted_collaborator_gets_placeholder_name() {
        let names = HashMap::new();
        let entries = vec![entry(ymd(2026, 3, 10), 7, 100.0, 40.0)];
        let rows = aggregate(&entries, ReportWindow::monthly(ymd(2026, 3, 14)), &names);
        assert_eq!(rows[0].collaborator_name, DELETED_COLLABORATOR);
        assert_eq!(rows[0].total_collaborator_share, 40.0);
    }

    #[test]
    fn empty_window_yields_empty_result() {
        let rows = aggregate(&[], ReportWindow::daily(ymd(2026, 3, 14)), &HashMap::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let names: HashMap<i64, String> = [(1, "Ana".to_string())].into();
        let entries = vec![
            entry(ymd(2026, 3, 10), 1, 100.0, 40.0),
            entry(ymd(2026, 3, 12), 1, 60.0, 40.0),
        ];
        let window = ReportWindow::monthly(ymd(2026, 3, 14));
        let first = aggregate(&entries, window, &names);
        let second = aggregate(&entries, window, &names);
        assert_eq!(first, second);
    }
}
