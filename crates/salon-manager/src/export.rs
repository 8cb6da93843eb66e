//! CSV report generation.

use anyhow::Result;
use csv::Writer;
use std::path::Path;

use salon_core::ledger::{LedgerEntry, LedgerTotals};
use salon_core::reports::ReportRow;

pub const LEDGER_FILENAME: &str = "ledger.csv";
pub const DAILY_REPORT_FILENAME: &str = "report_daily.csv";
pub const WEEKLY_REPORT_FILENAME: &str = "report_weekly.csv";
pub const MONTHLY_REPORT_FILENAME: &str = "report_monthly.csv";

/// Write the ledger with a trailing totals row.
pub fn write_ledger_csv(
    output_dir: &Path,
    entries: &[LedgerEntry],
    totals: &LedgerTotals,
) -> Result<()> {
    let path = output_dir.join(LEDGER_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Date", "Description", "Kind", "Amount"])?;
    for entry in entries {
        wtr.write_record([
            entry.date.to_string(),
            entry.description.clone(),
            entry.kind.to_string(),
            format!("{:.2}", entry.amount),
        ])?;
    }
    wtr.write_record([
        "",
        "Totals (credit / debit / balance)",
        "",
        &format!(
            "{:.2} / {:.2} / {:.2}",
            totals.total_credit, totals.total_debit, totals.balance
        ),
    ])?;
    wtr.flush()?;
    Ok(())
}

/// Write one report window's per-collaborator rows.
pub fn write_report_csv(output_dir: &Path, filename: &str, rows: &[ReportRow]) -> Result<()> {
    let path = output_dir.join(filename);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Collaborator", "Collaborator_Share", "Owner_Share"])?;
    for row in rows {
        wtr.write_record([
            row.collaborator_name.clone(),
            format!("{:.2}", row.total_collaborator_share),
            format!("{:.2}", row.total_owner_share),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
