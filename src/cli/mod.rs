use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::{EntryChanges, NewEntry, PayoutService};
use crate::domain::{Amount, EntryType, Summary, WorkerEntry, format_amount, parse_amount};
use crate::io::date_from_export_filename;

/// CleanFoam - worker payout ledger
#[derive(Parser)]
#[command(name = "cleanfoam")]
#[command(about = "Record worker payouts, compute fees and split the day's revenue")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "cleanfoam.db", global = true)]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Csv,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntryTypeArg {
    Standard,
    Cf,
}

impl From<EntryTypeArg> for EntryType {
    fn from(arg: EntryTypeArg) -> Self {
        match arg {
            EntryTypeArg::Standard => EntryType::Standard,
            EntryTypeArg::Cf => EntryType::Cf,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Add a worker entry
    Add {
        /// Worker name
        name: String,

        /// Total value (e.g., "100" or "52.5")
        total: String,

        /// Amount the worker already withdrew
        #[arg(short, long, default_value = "0")]
        withdrawn: String,

        /// Custom due overriding the fee table (0 means no override)
        #[arg(long)]
        due: Option<String>,

        /// Free-text note
        #[arg(short, long)]
        note: Option<String>,

        /// Record a CleanFoam-only entry (no fee, withdrawal or remaining)
        #[arg(long)]
        cf: bool,

        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Edit an entry; fee and remaining are recomputed
    Edit {
        /// Entry ID or unique ID prefix
        id: String,

        /// New worker name
        #[arg(long)]
        name: Option<String>,

        /// New total value
        #[arg(long)]
        total: Option<String>,

        /// New withdrawn amount
        #[arg(short, long)]
        withdrawn: Option<String>,

        /// Custom due (omit to recompute from the fee table; a previous override is not kept)
        #[arg(long)]
        due: Option<String>,

        /// New note (empty string clears it)
        #[arg(short, long)]
        note: Option<String>,

        /// Change the entry type
        #[arg(long = "type", value_enum)]
        entry_type: Option<EntryTypeArg>,
    },

    /// Delete an entry
    Delete {
        /// Entry ID or unique ID prefix
        id: String,
    },

    /// Delete every entry of a report date
    Reset {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the entries of a report date with their totals
    List {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Leave CF entries out of the total
        #[arg(long)]
        exclude_cf: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the summary figures of a report date
    Summary {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Leave CF entries out of the total
        #[arg(long)]
        exclude_cf: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List report dates that have entries
    Dates,

    /// Export a report date to CSV or JSON
    Export {
        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Output file ("-" for stdout; defaults to cleanfoam_YYYYMMDD.csv/.json)
        #[arg(short, long)]
        output: Option<String>,

        /// File format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FileFormat,

        /// Leave CF entries out of the JSON summary
        #[arg(long)]
        exclude_cf: bool,
    },

    /// Import entries from an exported CSV or JSON file
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Report date for CSV rows (YYYY-MM-DD; defaults to the date in a
        /// cleanfoam_YYYYMMDD.csv file name, else today)
        #[arg(long)]
        date: Option<String>,

        /// File format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: FileFormat,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                PayoutService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Add {
                name,
                total,
                withdrawn,
                due,
                note,
                cf,
                date,
            } => {
                let service = PayoutService::connect(&self.database).await?;
                let input = NewEntry {
                    report_date: report_date(date)?,
                    name,
                    total: parse_amount_arg("total", &total)?,
                    withdrawn: parse_amount_arg("withdrawn", &withdrawn)?,
                    custom_due: due.map(|d| parse_amount_arg("due", &d)).transpose()?,
                    note,
                    entry_type: if cf { EntryType::Cf } else { EntryType::Standard },
                };

                let entry = service.add_entry(input).await?;
                println!("Added {} ({})", entry.name, entry.short_id());
                print_entry_line(&entry);
            }

            Commands::Edit {
                id,
                name,
                total,
                withdrawn,
                due,
                note,
                entry_type,
            } => {
                let service = PayoutService::connect(&self.database).await?;
                let Some(existing) = service.resolve_entry(&id).await? else {
                    println!("No entry matches '{}'", id);
                    return Ok(());
                };

                let changes = EntryChanges {
                    name,
                    total: total.map(|t| parse_amount_arg("total", &t)).transpose()?,
                    withdrawn: withdrawn
                        .map(|w| parse_amount_arg("withdrawn", &w))
                        .transpose()?,
                    custom_due: due.map(|d| parse_amount_arg("due", &d)).transpose()?,
                    note,
                    entry_type: entry_type.map(EntryType::from),
                };

                match service.edit_entry(existing.id, changes).await? {
                    Some(entry) => {
                        println!("Updated {} ({})", entry.name, entry.short_id());
                        print_entry_line(&entry);
                    }
                    None => println!("No entry matches '{}'", id),
                }
            }

            Commands::Delete { id } => {
                let service = PayoutService::connect(&self.database).await?;
                let deleted = match service.resolve_entry(&id).await? {
                    Some(entry) => service.delete_entry(entry.id).await?,
                    None => None,
                };
                match deleted {
                    Some(entry) => println!("Deleted {} ({})", entry.name, entry.short_id()),
                    None => println!("No entry matches '{}'", id),
                }
            }

            Commands::Reset { date } => {
                let service = PayoutService::connect(&self.database).await?;
                let date = report_date(date)?;
                let removed = service.reset(date).await?;
                println!("All workers cleared for {} ({} removed)", date, removed);
            }

            Commands::List {
                date,
                exclude_cf,
                format,
            } => {
                let service = PayoutService::connect(&self.database).await?;
                run_list_command(&service, report_date(date)?, !exclude_cf, format).await?;
            }

            Commands::Summary {
                date,
                exclude_cf,
                format,
            } => {
                let service = PayoutService::connect(&self.database).await?;
                let summary = service.summary(report_date(date)?, !exclude_cf).await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                    OutputFormat::Table => print_summary(&summary),
                }
            }

            Commands::Dates => {
                let service = PayoutService::connect(&self.database).await?;
                let dates = service.list_report_dates().await?;
                if dates.is_empty() {
                    println!("No workers added yet.");
                } else {
                    println!("{:<12} {:>8}", "DATE", "ENTRIES");
                    println!("{}", "-".repeat(21));
                    for d in dates {
                        println!("{:<12} {:>8}", d.report_date, d.entry_count);
                    }
                }
            }

            Commands::Export {
                date,
                output,
                format,
                exclude_cf,
            } => {
                let service = PayoutService::connect(&self.database).await?;
                run_export_command(
                    &service,
                    report_date(date)?,
                    output.as_deref(),
                    format,
                    !exclude_cf,
                )
                .await?;
            }

            Commands::Import {
                input,
                date,
                format,
                dry_run,
            } => {
                let service = PayoutService::connect(&self.database).await?;
                let date = import_date(date, input.as_deref())?;
                run_import_command(&service, input.as_deref(), date, format, dry_run).await?;
            }
        }

        Ok(())
    }
}

async fn run_list_command(
    service: &PayoutService,
    date: NaiveDate,
    include_cf: bool,
    format: OutputFormat,
) -> Result<()> {
    let report = service.day_report(date, include_cf).await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.entries.is_empty() {
        println!("No workers added yet.");
        return Ok(());
    }

    println!("Date: {}", date.format("%Y-%m-%d"));
    println!(
        "{:<10} {:<18} {:>9} {:>9} {:>9} {:>10} NOTE",
        "ID", "WORKER", "TOTAL", "DUE", "WITHDRAWN", "REMAINING"
    );
    println!("{}", "-".repeat(80));
    for entry in &report.entries {
        print_entry_line(entry);
    }
    println!();
    print_summary(&report.summary);

    Ok(())
}

async fn run_export_command(
    service: &PayoutService,
    date: NaiveDate,
    output: Option<&str>,
    format: FileFormat,
    include_cf: bool,
) -> Result<()> {
    use crate::io::{Exporter, default_export_filename};
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let path = match output {
        Some("-") => None,
        Some(path) => Some(path.to_string()),
        None => Some(match format {
            FileFormat::Csv => default_export_filename(date),
            FileFormat::Json => default_export_filename(date).replace(".csv", ".json"),
        }),
    };

    let writer: Box<dyn Write> = match &path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match format {
        FileFormat::Csv => {
            let count = exporter.export_entries_csv(date, writer).await?;
            if let Some(path) = &path {
                eprintln!("Exported {} entries to {}", count, path);
            }
        }
        FileFormat::Json => {
            let snapshot = exporter.export_day_json(date, include_cf, writer).await?;
            if let Some(path) = &path {
                eprintln!(
                    "Exported {} entries to {}",
                    snapshot.report.entries.len(),
                    path
                );
            }
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &PayoutService,
    input: Option<&str>,
    date: NaiveDate,
    format: FileFormat,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{Read, stdin};

    let importer = Importer::new(service);

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let options = ImportOptions { dry_run };

    let result = match format {
        FileFormat::Csv => importer.import_entries_csv(reader, date, options).await?,
        FileFormat::Json => importer.import_day_json(reader, options).await?,
    };

    match (dry_run, result.errors.is_empty()) {
        (true, true) => println!("Validation successful"),
        (true, false) => println!("Validation found problems"),
        (false, true) => println!("Import complete"),
        (false, false) => println!("Import finished with errors"),
    }
    println!("  Imported: {}", result.imported);
    println!("  Skipped:  {}", result.skipped);
    println!("  Errors:   {}", result.errors.len());

    if !result.errors.is_empty() {
        println!("\nErrors:");
        for error in result.errors.iter().take(10) {
            println!(
                "  Line {}: {}",
                error.line,
                error
                    .field
                    .as_ref()
                    .map(|f| format!("{}: ", f))
                    .unwrap_or_default()
                    + &error.error
            );
        }
        if result.errors.len() > 10 {
            println!("  ... and {} more errors", result.errors.len() - 10);
        }
    }

    Ok(())
}

fn print_entry_line(entry: &WorkerEntry) {
    let optional = |value: Option<Amount>| value.map(format_amount).unwrap_or_default();
    println!(
        "{:<10} {:<18} {:>9} {:>9} {:>9} {:>10} {}",
        entry.short_id(),
        truncate(&entry.name, 18),
        format_amount(entry.total),
        optional(entry.due()),
        optional(entry.withdrawn()),
        optional(entry.remaining()),
        entry.note.as_deref().unwrap_or("")
    );
}

fn print_summary(summary: &Summary) {
    println!("  {:<16} {:>10}", "Total:", format_amount(summary.total));
    println!("  {:<16} {:>10}", "For workers:", format_amount(summary.for_workers));
    println!(
        "  {:<16} {:>10}",
        "For CleanFoam:",
        format_amount(summary.for_business)
    );
    println!(
        "  ({} entries, {} CF)",
        summary.entry_count, summary.cf_count
    );
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

fn parse_amount_arg(field: &str, value: &str) -> Result<Amount> {
    parse_amount(value)
        .with_context(|| format!("Invalid {} '{}'. Use '50' or '52.5'", field, value))
}

/// Parse a YYYY-MM-DD report date, defaulting to today's local date.
fn report_date(date: Option<String>) -> Result<NaiveDate> {
    match date {
        Some(date_str) => NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
            .with_context(|| format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)),
        None => Ok(Local::now().date_naive()),
    }
}

/// Report date for an import: `--date`, else the date in an exported
/// file name, else today.
fn import_date(date: Option<String>, input: Option<&str>) -> Result<NaiveDate> {
    match (date, input.and_then(date_from_export_filename)) {
        (None, Some(file_date)) => Ok(file_date),
        (date, _) => report_date(date),
    }
}
