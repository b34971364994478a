use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::io::Read;
use uuid::Uuid;

use crate::application::PayoutService;
use crate::domain::{
    EntryType, Payout, WorkerEntry, compute_fee, parse_amount, parse_optional_amount, settle,
};
use crate::io::export::DaySnapshot;

/// Result of an import operation
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred during import
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub dry_run: bool,
}

/// Column positions found in a CSV header.
struct Columns {
    id: Option<usize>,
    worker: usize,
    total: usize,
    due: Option<usize>,
    withdrawn: Option<usize>,
    remaining: Option<usize>,
    note: Option<usize>,
    entry_type: Option<usize>,
}

impl Columns {
    fn from_header(header: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        Ok(Self {
            id: find("ID"),
            worker: find("Worker")
                .ok_or_else(|| anyhow::anyhow!("CSV header is missing the Worker column"))?,
            total: find("Total")
                .ok_or_else(|| anyhow::anyhow!("CSV header is missing the Total column"))?,
            due: find("Due"),
            withdrawn: find("Withdrawn"),
            remaining: find("Remaining"),
            note: find("Note"),
            entry_type: find("Type"),
        })
    }
}

/// Importer for loading exported entries back into the ledger
pub struct Importer<'a> {
    service: &'a PayoutService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a PayoutService) -> Self {
        Self { service }
    }

    /// Import entries from CSV into a report date.
    /// Values are stored as written; only missing payout cells are computed.
    pub async fn import_entries_csv<R: Read>(
        &self,
        reader: R,
        report_date: NaiveDate,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let columns = Columns::from_header(csv_reader.headers()?)?;
        let mut result = ImportResult::default();

        for (line_num, record) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    result.errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let entry = match parse_record(&record, &columns, report_date) {
                Ok(entry) => entry,
                Err(error) => {
                    result.errors.push(ImportError { line, ..error });
                    continue;
                }
            };

            self.store(entry, line, &options, &mut result).await;
        }

        Ok(result)
    }

    /// Import the entries of a JSON snapshot, keeping their report dates.
    pub async fn import_day_json<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let snapshot: DaySnapshot = serde_json::from_reader(reader)?;
        let mut result = ImportResult::default();

        for (index, entry) in snapshot.report.entries.into_iter().enumerate() {
            self.store(entry, index + 1, &options, &mut result).await;
        }

        Ok(result)
    }

    async fn store(
        &self,
        entry: WorkerEntry,
        line: usize,
        options: &ImportOptions,
        result: &mut ImportResult,
    ) {
        let outcome = if options.dry_run {
            self.service.check_import(&entry).await
        } else {
            self.service.import_entry(entry).await
        };

        match outcome {
            Ok(true) => result.imported += 1,
            Ok(false) => result.skipped += 1,
            Err(e) => result.errors.push(ImportError {
                line,
                field: None,
                error: format!("Entry creation failed: {}", e),
            }),
        }
    }
}

fn parse_record(
    record: &csv::StringRecord,
    columns: &Columns,
    report_date: NaiveDate,
) -> std::result::Result<WorkerEntry, ImportError> {
    let cell = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("");
    let field_error = |field: &str, error: String| ImportError {
        line: 0,
        field: Some(field.to_string()),
        error,
    };

    let amount = |field: &str, index: Option<usize>| {
        parse_optional_amount(cell(index))
            .map_err(|e| field_error(field, format!("Invalid amount: {}", e)))
    };

    let total = parse_amount(cell(Some(columns.total)))
        .map_err(|e| field_error("Total", format!("Invalid amount: {}", e)))?;
    let due = amount("Due", columns.due)?;
    let withdrawn = amount("Withdrawn", columns.withdrawn)?;
    let remaining = amount("Remaining", columns.remaining)?;

    let entry_type = match cell(columns.entry_type).trim() {
        "" if due.is_none() && remaining.is_none() => EntryType::Cf,
        "" => EntryType::Standard,
        other => EntryType::from_str(other)
            .ok_or_else(|| field_error("Type", format!("Unknown entry type: {}", other)))?,
    };

    let payout = match entry_type {
        EntryType::Cf => Payout::Cf,
        EntryType::Standard => {
            let withdrawn = withdrawn.unwrap_or(0.0);
            let due = due.unwrap_or_else(|| compute_fee(total, None));
            Payout::Standard {
                due,
                withdrawn,
                remaining: remaining.unwrap_or_else(|| settle(total, withdrawn, due)),
            }
        }
    };

    let id = match cell(columns.id).trim() {
        "" => Uuid::new_v4(),
        raw => Uuid::parse_str(raw).map_err(|e| field_error("ID", format!("Invalid ID: {}", e)))?,
    };

    let note = cell(columns.note);
    Ok(WorkerEntry {
        id,
        report_date,
        name: cell(Some(columns.worker)).trim().to_string(),
        total,
        payout,
        note: if note.trim().is_empty() {
            None
        } else {
            Some(note.to_string())
        },
        created_at: Utc::now(),
    })
}
