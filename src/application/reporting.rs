use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Summary, WorkerEntry};

/// Everything shown for one report date: the entry table and its figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayReport {
    pub report_date: NaiveDate,
    pub include_cf: bool,
    pub entries: Vec<WorkerEntry>,
    pub summary: Summary,
}

/// A report date with how many entries it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateOverview {
    pub report_date: NaiveDate,
    pub entry_count: i64,
}
