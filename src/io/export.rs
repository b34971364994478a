use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{DayReport, PayoutService};
use crate::domain::{WorkerEntry, format_amount};

/// Column order of exported CSV files.
pub const CSV_HEADER: [&str; 8] = [
    "ID",
    "Worker",
    "Total",
    "Due",
    "Withdrawn",
    "Remaining",
    "Note",
    "Type",
];

/// JSON snapshot of one report date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    #[serde(flatten)]
    pub report: DayReport,
}

/// Default export file name for a report date, e.g. `cleanfoam_20250314.csv`.
pub fn default_export_filename(report_date: NaiveDate) -> String {
    format!("cleanfoam_{}.csv", report_date.format("%Y%m%d"))
}

/// Report date encoded in an export file name such as
/// `exports/cleanfoam_20250314.csv`. Returns `None` for any other name.
pub fn date_from_export_filename(path: &str) -> Option<NaiveDate> {
    let file_name = std::path::Path::new(path).file_name()?.to_str()?;
    let stem = file_name.strip_prefix("cleanfoam_")?;
    let digits = stem
        .strip_suffix(".csv")
        .or_else(|| stem.strip_suffix(".json"))?;
    if digits.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(digits, "%Y%m%d").ok()
}

/// Exporter for converting entries to CSV or JSON
pub struct Exporter<'a> {
    service: &'a PayoutService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a PayoutService) -> Self {
        Self { service }
    }

    /// Export the entries of a report date to CSV
    pub async fn export_entries_csv<W: Write>(
        &self,
        report_date: NaiveDate,
        writer: W,
    ) -> Result<usize> {
        let entries = self.service.list_entries(report_date).await?;
        write_entries_csv(&entries, writer)
    }

    /// Export a report date with its summary as a JSON snapshot
    pub async fn export_day_json<W: Write>(
        &self,
        report_date: NaiveDate,
        include_cf: bool,
        mut writer: W,
    ) -> Result<DaySnapshot> {
        let report = self.service.day_report(report_date, include_cf).await?;

        let snapshot = DaySnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            report,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

/// Write entries as CSV rows. CF rows leave the payout columns empty.
pub fn write_entries_csv<W: Write>(entries: &[WorkerEntry], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;

    let optional = |value: Option<f64>| value.map(format_amount).unwrap_or_default();

    for entry in entries {
        csv_writer.write_record([
            entry.id.to_string(),
            entry.name.clone(),
            format_amount(entry.total),
            optional(entry.due()),
            optional(entry.withdrawn()),
            optional(entry.remaining()),
            entry.note.clone().unwrap_or_default(),
            entry.entry_type().as_str().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(entries.len())
}
