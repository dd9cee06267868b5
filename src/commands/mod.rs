//! Command handlers for the betbook CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod backup;
mod delete;
mod history;
mod init;
mod list;
mod update;

use crate::model::{Amount, Fields, MatchNote, NormalNote, Profit, Record};
use crate::{summary, Result};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Debug;
use std::io::Write;
use tracing::{debug, info};

pub use add::{add, add_match, add_note, add_profit};
pub use backup::{backup, restore, BackupFile};
pub use delete::delete;
pub use history::{history, History, MonthReport};
pub use init::init;
pub use list::{list, Listing};
pub use update::{update, update_match, update_note, update_profit};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

/// How structured command output is written to stdout.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// A markdown table.
    #[default]
    Table,
    /// Pretty printed JSON.
    Json,
    /// Comma separated values with a header row.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }
}

impl<T> Out<T>
where
    T: Render + Clone + Debug,
{
    /// Print the message to `info!` and the structured data (if it exists) to stdout in `format`.
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        info!("{}", self.message);
        let Some(structure) = self.structure() else {
            return Ok(());
        };
        let text = structure.render(format)?;
        if text.is_empty() {
            debug!("Command produced no output for {format}");
            return Ok(());
        }
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", text.trim_end()).context("Unable to write to stdout")
    }
}

/// Structured output that can be shown as a table or CSV as well as JSON.
pub trait Render: Serialize {
    /// Column names.
    fn headers(&self) -> Vec<String>;

    /// One entry per row, each with as many cells as there are headers.
    fn rows(&self) -> Vec<Vec<String>>;

    /// A line printed under the table, e.g. a total. It is not part of CSV output.
    fn footer(&self) -> Option<String> {
        None
    }

    fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Unable to serialize the output")
            }
            OutputFormat::Csv => csv_table(&self.headers(), &self.rows()),
            OutputFormat::Table => {
                let mut out = markdown_table(&self.headers(), &self.rows());
                if let Some(footer) = self.footer() {
                    out.push('\n');
                    out.push_str(&footer);
                    out.push('\n');
                }
                Ok(out)
            }
        }
    }
}

impl Render for () {
    fn headers(&self) -> Vec<String> {
        Vec::new()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        Vec::new()
    }

    fn render(&self, _format: OutputFormat) -> Result<String> {
        Ok(String::new())
    }
}

/// How the fields of a collection are laid out in columns. The record id is always the first
/// column and is not included here.
pub trait Columns: Fields {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    /// A total shown under listings of the collection.
    fn total(_records: &[Record<Self>]) -> Option<Amount> {
        None
    }
}

impl Columns for Profit {
    const HEADERS: &'static [&'static str] = &["date", "type", "amount", "note"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.date().to_string(),
            self.kind().label().to_string(),
            self.amount().to_string(),
            self.note().unwrap_or_default().to_string(),
        ]
    }

    fn total(records: &[Record<Self>]) -> Option<Amount> {
        Some(summary::total_profit(records))
    }
}

impl Columns for MatchNote {
    const HEADERS: &'static [&'static str] = &["match date", "match", "handicap"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.match_date().to_string(),
            self.match_info().to_string(),
            self.handicap().unwrap_or_default().to_string(),
        ]
    }
}

impl Columns for NormalNote {
    const HEADERS: &'static [&'static str] = &["date", "notes"];

    fn cells(&self) -> Vec<String> {
        vec![self.note_date().to_string(), self.notes().to_string()]
    }
}

fn record_headers<F: Columns>() -> Vec<String> {
    std::iter::once("id")
        .chain(F::HEADERS.iter().copied())
        .map(String::from)
        .collect()
}

fn record_row<F: Columns>(record: &Record<F>) -> Vec<String> {
    let mut row = vec![record.id().to_string()];
    row.extend(record.fields().cells());
    row
}

impl<F: Columns> Render for Record<F> {
    fn headers(&self) -> Vec<String> {
        record_headers::<F>()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![record_row(self)]
    }
}

/// Formats `headers` and `rows` as a markdown table with padded columns.
fn markdown_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or_default()
                .max(3)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &width)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or_default();
                format!("{cell:<width$}")
            })
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    let mut out = line(headers);
    let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("| {} |\n", dashes.join(" | ")));
    for row in rows {
        out.push_str(&line(row));
    }
    out
}

fn csv_table(headers: &[String], rows: &[Vec<String>]) -> Result<String> {
    if headers.is_empty() {
        return Ok(String::new());
    }
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(headers)
        .context("Unable to write CSV header")?;
    for row in rows {
        writer.write_record(row).context("Unable to write CSV row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Unable to finish CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// The line shown under a table for a total, e.g. `Total profit: -50.00`.
fn total_line(total: Amount) -> String {
    format!("Total profit: {total}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use chrono::NaiveDate;

    fn profit_record() -> Record<Profit> {
        Record::new(
            "1704902400000",
            Profit::new(
                TransactionType::Deposit,
                Amount::from(1250),
                NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                Some("first, deposit".to_string()),
            ),
        )
    }

    #[test]
    fn test_markdown_table() {
        let table = profit_record().render(OutputFormat::Table).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("| id "));
        assert!(lines[1].starts_with("| ---"));
        assert!(lines[2].contains("DEPOSIT"));
        assert!(lines[2].contains("-1,250.00"));
        // every line has the same width
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_csv_quotes_commas() {
        let csv = profit_record().render(OutputFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("id,date,type,amount,note"));
        assert_eq!(
            lines.next(),
            Some("1704902400000,2024-01-10,DEPOSIT,\"-1,250.00\",\"first, deposit\"")
        );
    }

    #[test]
    fn test_json_is_the_stored_shape() {
        let json = profit_record().render(OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["amount"], serde_json::json!(-1250));
        assert_eq!(value["type"], "deposit");
    }

    #[test]
    fn test_unit_renders_nothing() {
        for format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Csv] {
            assert!(().render(format).unwrap().is_empty());
        }
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(
            "json".parse::<OutputFormat>().unwrap(),
            OutputFormat::Json
        );
    }
}
