use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Amount, EntryId, EntryType, Payout, Summary, WorkerEntry, aggregate};
use crate::storage::Repository;

use super::{AppError, DateOverview, DayReport};

/// Application service providing the operator's actions on worker entries.
/// This is the primary interface for any client (CLI, TUI, etc.).
pub struct PayoutService {
    repo: Repository,
}

/// Input for a new entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub report_date: NaiveDate,
    pub name: String,
    pub total: Amount,
    pub withdrawn: Amount,
    /// Operator override for the fee; zero or absent means no override
    pub custom_due: Option<Amount>,
    pub note: Option<String>,
    pub entry_type: EntryType,
}

/// Changes to an existing entry. Absent fields keep their current value,
/// except the fee, which is recomputed unless `custom_due` is given.
#[derive(Debug, Clone, Default)]
pub struct EntryChanges {
    pub name: Option<String>,
    pub total: Option<Amount>,
    pub withdrawn: Option<Amount>,
    pub custom_due: Option<Amount>,
    pub note: Option<String>,
    pub entry_type: Option<EntryType>,
}

impl PayoutService {
    /// Create a new payout service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a database at the given path, creating it if needed.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Entry operations
    // ========================

    /// Validate, compute and store a new entry.
    pub async fn add_entry(&self, input: NewEntry) -> Result<WorkerEntry, AppError> {
        let name = validate_name(&input.name)?;
        validate_amounts(input.total, input.withdrawn, input.custom_due)?;

        let payout = build_payout(
            input.entry_type,
            input.total,
            input.withdrawn,
            input.custom_due,
        );
        let mut entry = WorkerEntry::new(input.report_date, name, input.total, payout);
        if let Some(note) = input.note {
            entry = entry.with_note(note);
        }

        debug!(total = entry.total, due = ?entry.due(), "computed fee");
        self.repo.save_entry(&entry).await?;
        info!(id = %entry.id, name = %entry.name, date = %entry.report_date, "added entry");

        Ok(entry)
    }

    /// Look an entry up by full UUID or by a unique prefix of its hex digits.
    pub async fn resolve_entry(&self, id_or_prefix: &str) -> Result<Option<WorkerEntry>, AppError> {
        let id_or_prefix = id_or_prefix.trim();
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return Ok(self.repo.get_entry(id).await?);
        }
        let has_digits = id_or_prefix.chars().any(|c| c.is_ascii_hexdigit());
        if !has_digits
            || !id_or_prefix
                .chars()
                .all(|c| c.is_ascii_hexdigit() || c == '-')
        {
            return Ok(None);
        }

        let mut matches = self.repo.find_entries_by_prefix(id_or_prefix).await?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(AppError::AmbiguousId {
                prefix: id_or_prefix.to_string(),
                matches: n,
            }),
        }
    }

    /// Get an entry by ID.
    pub async fn get_entry(&self, id: EntryId) -> Result<Option<WorkerEntry>, AppError> {
        Ok(self.repo.get_entry(id).await?)
    }

    /// Apply changes to an entry and recompute its fee and remaining balance.
    /// Returns `None` when the entry doesn't exist.
    pub async fn edit_entry(
        &self,
        id: EntryId,
        changes: EntryChanges,
    ) -> Result<Option<WorkerEntry>, AppError> {
        let Some(mut entry) = self.repo.get_entry(id).await? else {
            debug!(%id, "edit skipped, entry not found");
            return Ok(None);
        };

        let name = match changes.name {
            Some(name) => validate_name(&name)?,
            None => entry.name.clone(),
        };
        let total = changes.total.unwrap_or(entry.total);
        let withdrawn = changes
            .withdrawn
            .unwrap_or_else(|| entry.withdrawn().unwrap_or(0.0));
        let entry_type = changes.entry_type.unwrap_or(entry.entry_type());
        validate_amounts(total, withdrawn, changes.custom_due)?;

        entry.name = name;
        entry.total = total;
        entry.payout = build_payout(entry_type, total, withdrawn, changes.custom_due);
        if let Some(note) = changes.note {
            entry = entry.with_note(note);
        }

        self.repo.update_entry(&entry).await?;
        info!(id = %entry.id, name = %entry.name, "edited entry");

        Ok(Some(entry))
    }

    /// Delete an entry. Returns the removed entry, or `None` if it didn't exist.
    pub async fn delete_entry(&self, id: EntryId) -> Result<Option<WorkerEntry>, AppError> {
        let Some(entry) = self.repo.get_entry(id).await? else {
            debug!(%id, "delete skipped, entry not found");
            return Ok(None);
        };

        if !self.repo.delete_entry(id).await? {
            return Ok(None);
        }
        info!(id = %entry.id, name = %entry.name, "deleted entry");
        Ok(Some(entry))
    }

    /// Remove every entry of a report date.
    pub async fn reset(&self, report_date: NaiveDate) -> Result<u64, AppError> {
        let removed = self.repo.delete_entries_for_date(report_date).await?;
        info!(date = %report_date, removed, "reset entries");
        Ok(removed)
    }

    /// Store an entry exactly as given (used by import).
    /// Returns false when an entry with the same ID already exists.
    pub async fn import_entry(&self, entry: WorkerEntry) -> Result<bool, AppError> {
        if !self.check_import(&entry).await? {
            debug!(id = %entry.id, "import skipped, entry exists");
            return Ok(false);
        }

        self.repo.save_entry(&entry).await?;
        info!(id = %entry.id, name = %entry.name, "imported entry");
        Ok(true)
    }

    /// Run the checks of [`Self::import_entry`] without writing anything.
    /// Returns false when an entry with the same ID already exists.
    pub async fn check_import(&self, entry: &WorkerEntry) -> Result<bool, AppError> {
        validate_name(&entry.name)?;
        if !(entry.total.is_finite() && entry.total > 0.0) {
            return Err(AppError::InvalidEntry(
                "Total must be greater than 0".to_string(),
            ));
        }
        Ok(self.repo.get_entry(entry.id).await?.is_none())
    }

    // ========================
    // Queries
    // ========================

    /// List the entries of a report date.
    pub async fn list_entries(&self, report_date: NaiveDate) -> Result<Vec<WorkerEntry>, AppError> {
        Ok(self.repo.list_entries(report_date).await?)
    }

    /// Summary figures for a report date.
    pub async fn summary(
        &self,
        report_date: NaiveDate,
        include_cf: bool,
    ) -> Result<Summary, AppError> {
        let entries = self.repo.list_entries(report_date).await?;
        Ok(aggregate(&entries, include_cf))
    }

    /// Entries and summary figures for a report date.
    pub async fn day_report(
        &self,
        report_date: NaiveDate,
        include_cf: bool,
    ) -> Result<DayReport, AppError> {
        let entries = self.repo.list_entries(report_date).await?;
        let summary = aggregate(&entries, include_cf);
        Ok(DayReport {
            report_date,
            include_cf,
            entries,
            summary,
        })
    }

    /// Report dates that have entries, newest first.
    pub async fn list_report_dates(&self) -> Result<Vec<DateOverview>, AppError> {
        let dates = self.repo.list_report_dates().await?;
        Ok(dates
            .into_iter()
            .map(|d| DateOverview {
                report_date: d.report_date,
                entry_count: d.entry_count,
            })
            .collect())
    }
}

fn build_payout(
    entry_type: EntryType,
    total: Amount,
    withdrawn: Amount,
    custom_due: Option<Amount>,
) -> Payout {
    match entry_type {
        EntryType::Standard => Payout::standard(total, withdrawn, custom_due),
        EntryType::Cf => Payout::Cf,
    }
}

fn validate_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidEntry("Please enter a name".to_string()));
    }
    Ok(name.to_string())
}

fn validate_amounts(
    total: Amount,
    withdrawn: Amount,
    custom_due: Option<Amount>,
) -> Result<(), AppError> {
    if !(total.is_finite() && total > 0.0) {
        return Err(AppError::InvalidEntry(
            "Total must be greater than 0".to_string(),
        ));
    }
    if !(withdrawn.is_finite() && withdrawn >= 0.0) {
        return Err(AppError::InvalidEntry(
            "Withdrawn must not be negative".to_string(),
        ));
    }
    if custom_due.is_some_and(|due| !(due.is_finite() && due >= 0.0)) {
        return Err(AppError::InvalidEntry(
            "Custom due must not be negative".to_string(),
        ));
    }
    Ok(())
}
