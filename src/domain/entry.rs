use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, compute_fee, settle};

pub type EntryId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Worker payout: fee, withdrawal and remaining balance apply
    Standard,
    /// CleanFoam-only revenue, no worker component
    Cf,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Standard => "standard",
            EntryType::Cf => "cf",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Some(EntryType::Standard),
            "cf" => Some(EntryType::Cf),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an entry's total is split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payout {
    Standard {
        due: Amount,
        withdrawn: Amount,
        remaining: Amount,
    },
    Cf,
}

impl Payout {
    /// Compute the payout of a standard entry.
    pub fn standard(total: Amount, withdrawn: Amount, custom_due: Option<Amount>) -> Self {
        let due = compute_fee(total, custom_due);
        Payout::Standard {
            due,
            withdrawn,
            remaining: settle(total, withdrawn, due),
        }
    }

    pub fn entry_type(&self) -> EntryType {
        match self {
            Payout::Standard { .. } => EntryType::Standard,
            Payout::Cf => EntryType::Cf,
        }
    }
}

/// One payout record for a named worker on a report date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerEntry {
    pub id: EntryId,
    pub report_date: NaiveDate,
    pub name: String,
    pub total: Amount,
    pub payout: Payout,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkerEntry {
    pub fn new(report_date: NaiveDate, name: String, total: Amount, payout: Payout) -> Self {
        Self {
            id: Uuid::new_v4(),
            report_date,
            name,
            total,
            payout,
            note: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() { None } else { Some(note) };
        self
    }

    pub fn entry_type(&self) -> EntryType {
        self.payout.entry_type()
    }

    pub fn is_cf(&self) -> bool {
        matches!(self.payout, Payout::Cf)
    }

    pub fn due(&self) -> Option<Amount> {
        match self.payout {
            Payout::Standard { due, .. } => Some(due),
            Payout::Cf => None,
        }
    }

    pub fn withdrawn(&self) -> Option<Amount> {
        match self.payout {
            Payout::Standard { withdrawn, .. } => Some(withdrawn),
            Payout::Cf => None,
        }
    }

    pub fn remaining(&self) -> Option<Amount> {
        match self.payout {
            Payout::Standard { remaining, .. } => Some(remaining),
            Payout::Cf => None,
        }
    }

    /// First 8 hex digits of the id, as shown in tables.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}
