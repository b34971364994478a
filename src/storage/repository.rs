use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::{EntryId, EntryType, Payout, WorkerEntry};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

const ENTRY_COLUMNS: &str =
    "id, report_date, name, total, due, withdrawn, remaining, note, entry_type, created_at";

/// Number of entries recorded for a report date.
#[derive(Debug, Clone)]
pub struct DateCount {
    pub report_date: NaiveDate,
    pub entry_count: i64,
}

/// Repository for persisting and querying worker entries.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Create the workers table if it doesn't exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Entry operations
    // ========================

    /// Save a new entry.
    pub async fn save_entry(&self, entry: &WorkerEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workers (id, report_date, name, total, due, withdrawn, remaining, note, entry_type, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.report_date.format(DATE_FORMAT).to_string())
        .bind(&entry.name)
        .bind(entry.total)
        .bind(entry.due())
        .bind(entry.withdrawn())
        .bind(entry.remaining())
        .bind(&entry.note)
        .bind(entry.entry_type().as_str())
        .bind(entry.created_at.to_rfc3339_opts(SecondsFormat::Nanos, true))
        .execute(&self.pool)
        .await
        .context("Failed to save entry")?;
        Ok(())
    }

    /// Overwrite an existing entry. Returns false if no row matched.
    pub async fn update_entry(&self, entry: &WorkerEntry) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE workers
            SET name = ?, total = ?, due = ?, withdrawn = ?, remaining = ?, note = ?, entry_type = ?
            WHERE id = ?
            "#,
        )
        .bind(&entry.name)
        .bind(entry.total)
        .bind(entry.due())
        .bind(entry.withdrawn())
        .bind(entry.remaining())
        .bind(&entry.note)
        .bind(entry.entry_type().as_str())
        .bind(entry.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update entry")?;

        Ok(result.rows_affected() > 0)
    }

    /// Get an entry by ID.
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<WorkerEntry>> {
        let query = format!("SELECT {} FROM workers WHERE id = ?", ENTRY_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch entry")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    /// Find entries whose ID (hex digits, hyphens ignored) starts with `prefix`.
    pub async fn find_entries_by_prefix(&self, prefix: &str) -> Result<Vec<WorkerEntry>> {
        let pattern = format!("{}%", prefix.replace('-', "").to_lowercase());
        let query = format!(
            "SELECT {} FROM workers WHERE REPLACE(id, '-', '') LIKE ? ORDER BY created_at",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .context("Failed to search entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// List the entries of a report date in the order they were added.
    pub async fn list_entries(&self, report_date: NaiveDate) -> Result<Vec<WorkerEntry>> {
        let query = format!(
            "SELECT {} FROM workers WHERE report_date = ? ORDER BY created_at, rowid",
            ENTRY_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(report_date.format(DATE_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list entries")?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    /// Delete an entry. Returns false if no row matched.
    pub async fn delete_entry(&self, id: EntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workers WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete entry")?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every entry of a report date. Returns the number removed.
    pub async fn delete_entries_for_date(&self, report_date: NaiveDate) -> Result<u64> {
        let result = sqlx::query("DELETE FROM workers WHERE report_date = ?")
            .bind(report_date.format(DATE_FORMAT).to_string())
            .execute(&self.pool)
            .await
            .context("Failed to reset entries")?;
        Ok(result.rows_affected())
    }

    /// Report dates that have entries, newest first.
    pub async fn list_report_dates(&self) -> Result<Vec<DateCount>> {
        let rows = sqlx::query(
            r#"
            SELECT report_date, COUNT(*) as entry_count
            FROM workers
            GROUP BY report_date
            ORDER BY report_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list report dates")?;

        rows.iter()
            .map(|row| -> Result<DateCount> {
                let date_str: String = row.get("report_date");
                Ok(DateCount {
                    report_date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                        .context("Invalid report date")?,
                    entry_count: row.get("entry_count"),
                })
            })
            .collect()
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<WorkerEntry> {
        let id_str: String = row.get("id");
        let date_str: String = row.get("report_date");
        let entry_type_str: String = row.get("entry_type");
        let created_at_str: String = row.get("created_at");

        let entry_type = EntryType::from_str(&entry_type_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid entry type: {}", entry_type_str))?;

        let payout = match entry_type {
            EntryType::Standard => Payout::Standard {
                due: row.get::<Option<f64>, _>("due").unwrap_or(0.0),
                withdrawn: row.get::<Option<f64>, _>("withdrawn").unwrap_or(0.0),
                remaining: row.get::<Option<f64>, _>("remaining").unwrap_or(0.0),
            },
            EntryType::Cf => Payout::Cf,
        };

        Ok(WorkerEntry {
            id: Uuid::parse_str(&id_str).context("Invalid entry ID")?,
            report_date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Invalid report date")?,
            name: row.get("name"),
            total: row.get("total"),
            payout,
            note: row.get("note"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }
}
