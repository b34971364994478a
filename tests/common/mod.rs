// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use cleanfoam::application::{NewEntry, PayoutService};
use cleanfoam::domain::{Amount, EntryType, WorkerEntry};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(PayoutService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = PayoutService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into a report date
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Builder-style input for a standard entry
pub fn standard(date: &str, name: &str, total: Amount, withdrawn: Amount) -> NewEntry {
    NewEntry {
        report_date: parse_date(date),
        name: name.to_string(),
        total,
        withdrawn,
        custom_due: None,
        note: None,
        entry_type: EntryType::Standard,
    }
}

/// Input for a CF entry
pub fn cf(date: &str, name: &str, total: Amount) -> NewEntry {
    NewEntry {
        entry_type: EntryType::Cf,
        ..standard(date, name, total, 0.0)
    }
}

/// Test fixture: a typical day with three workers and one CF sale
pub async fn seed_day(service: &PayoutService, date: &str) -> Result<Vec<WorkerEntry>> {
    let mut entries = Vec::new();
    entries.push(service.add_entry(standard(date, "Ana", 100.0, 10.0)).await?);
    entries.push(service.add_entry(standard(date, "Bruno", 95.0, 20.0)).await?);
    entries.push(service.add_entry(standard(date, "Carla", 42.0, 0.0)).await?);
    entries.push(service.add_entry(cf(date, "Foam sale", 60.0)).await?);
    Ok(entries)
}
