//! These structs provide the CLI interface for betbook.

use crate::commands::OutputFormat;
use crate::model::{Collection, RecordId, TransactionType};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// betbook: A local ledger for betting deposits and withdrawals, plus notes about matches.
///
/// Everything is kept in a SQLite file under the betbook home directory. Run `betbook init` once
/// to create it, then add, update, delete and list records. `betbook history` shows deposits,
/// withdrawals and profit month by month.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory, the configuration file and an empty database.
    ///
    /// This is the first command you should run. By default the data lives in $HOME/betbook; pass
    /// --home or set BETBOOK_HOME to put it somewhere else.
    Init,
    /// Add a profit record, a match note or a note.
    Add(AddArgs),
    /// Replace every field of an existing record, keeping its id.
    Update(UpdateArgs),
    /// Delete a record by id. Deleting an id that does not exist does nothing.
    Delete(DeleteArgs),
    /// List the records of a collection.
    List(ListArgs),
    /// Show deposits, withdrawals and profit for each month.
    History(HistoryArgs),
    /// Save all collections to a JSON file in the backups directory.
    Backup,
    /// Replace all collections with the contents of a JSON backup file.
    ///
    /// The current data is backed up first.
    Restore(RestoreArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where betbook data and configuration is held. Defaults to ~/betbook
    #[arg(long, env = "BETBOOK_HOME", default_value_t = default_betbook_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// Args for the `betbook add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[command(subcommand)]
    entity: AddSubcommand,
}

impl AddArgs {
    pub fn entity(&self) -> &AddSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Add a deposit or a withdrawal.
    Profit(AddProfitArgs),
    /// Add a note about a match.
    Match(AddMatchArgs),
    /// Add a free-form note.
    Note(AddNoteArgs),
}

/// Args for the `betbook update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    #[command(subcommand)]
    entity: UpdateSubcommand,
}

impl UpdateArgs {
    pub fn entity(&self) -> &UpdateSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Replace a deposit or withdrawal.
    Profit(UpdateProfitArgs),
    /// Replace a match note.
    Match(UpdateMatchArgs),
    /// Replace a free-form note.
    Note(UpdateNoteArgs),
}

/// The fields of a profit record as typed on the command line.
#[derive(Debug, Parser, Clone)]
pub struct ProfitArgs {
    /// Whether money went in (deposit) or came out (withdraw).
    #[arg(long = "type", value_enum)]
    kind: TransactionType,

    /// The amount, e.g. 100 or 1,250.50. The sign is ignored; deposits are stored as negative
    /// amounts.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// An optional note.
    #[arg(long)]
    note: Option<String>,
}

impl ProfitArgs {
    pub fn new(kind: TransactionType, amount: impl Into<String>, note: Option<String>) -> Self {
        Self {
            kind,
            amount: amount.into(),
            note,
        }
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

/// Args for `betbook add profit`.
#[derive(Debug, Parser, Clone)]
pub struct AddProfitArgs {
    #[clap(flatten)]
    fields: ProfitArgs,

    /// The date of the transaction, YYYY-MM-DD. Defaults to today.
    #[arg(long, default_value_t = today())]
    date: NaiveDate,
}

impl AddProfitArgs {
    pub fn new(fields: ProfitArgs, date: NaiveDate) -> Self {
        Self { fields, date }
    }

    pub fn fields(&self) -> &ProfitArgs {
        &self.fields
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Args for `betbook update profit`. Every field is required because the record is replaced as a
/// whole.
#[derive(Debug, Parser, Clone)]
pub struct UpdateProfitArgs {
    /// The id of the record to replace.
    #[arg(long)]
    id: RecordId,

    #[clap(flatten)]
    fields: ProfitArgs,

    /// The date of the transaction, YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,
}

impl UpdateProfitArgs {
    pub fn new(id: impl Into<RecordId>, fields: ProfitArgs, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            fields,
            date,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn fields(&self) -> &ProfitArgs {
        &self.fields
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// The fields of a match note as typed on the command line.
#[derive(Debug, Parser, Clone)]
pub struct MatchArgs {
    /// What the match is, e.g. "Arsenal vs Chelsea".
    #[arg(long)]
    info: String,

    /// The handicap being considered, e.g. "-0.5".
    #[arg(long, allow_hyphen_values = true)]
    handicap: Option<String>,
}

impl MatchArgs {
    pub fn new(info: impl Into<String>, handicap: Option<String>) -> Self {
        Self {
            info: info.into(),
            handicap,
        }
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn handicap(&self) -> Option<&str> {
        self.handicap.as_deref()
    }
}

/// Args for `betbook add match`.
#[derive(Debug, Parser, Clone)]
pub struct AddMatchArgs {
    #[clap(flatten)]
    fields: MatchArgs,

    /// The date of the match, YYYY-MM-DD. Defaults to today.
    #[arg(long, default_value_t = today())]
    date: NaiveDate,
}

impl AddMatchArgs {
    pub fn new(fields: MatchArgs, date: NaiveDate) -> Self {
        Self { fields, date }
    }

    pub fn fields(&self) -> &MatchArgs {
        &self.fields
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Args for `betbook update match`.
#[derive(Debug, Parser, Clone)]
pub struct UpdateMatchArgs {
    /// The id of the match note to replace.
    #[arg(long)]
    id: RecordId,

    #[clap(flatten)]
    fields: MatchArgs,

    /// The date of the match, YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,
}

impl UpdateMatchArgs {
    pub fn new(id: impl Into<RecordId>, fields: MatchArgs, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            fields,
            date,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn fields(&self) -> &MatchArgs {
        &self.fields
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Args for `betbook add note`.
#[derive(Debug, Parser, Clone)]
pub struct AddNoteArgs {
    /// The text of the note.
    #[arg(long)]
    notes: String,

    /// The date of the note, YYYY-MM-DD. Defaults to today.
    #[arg(long, default_value_t = today())]
    date: NaiveDate,
}

impl AddNoteArgs {
    pub fn new(notes: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            notes: notes.into(),
            date,
        }
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Args for `betbook update note`.
#[derive(Debug, Parser, Clone)]
pub struct UpdateNoteArgs {
    /// The id of the note to replace.
    #[arg(long)]
    id: RecordId,

    /// The text of the note.
    #[arg(long)]
    notes: String,

    /// The date of the note, YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,
}

impl UpdateNoteArgs {
    pub fn new(id: impl Into<RecordId>, notes: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            notes: notes.into(),
            date,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Args for the `betbook delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The collection to delete from: profit, match or note.
    #[arg(value_enum)]
    collection: Collection,

    /// The id of the record to delete.
    #[arg(long)]
    id: RecordId,
}

impl DeleteArgs {
    pub fn new(collection: Collection, id: impl Into<RecordId>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }
}

/// Args for the `betbook list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The collection to list: profit, match or note.
    #[arg(value_enum)]
    collection: Collection,

    /// Only show this many records.
    #[arg(long)]
    limit: Option<usize>,

    /// How to print the records.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ListArgs {
    pub fn new(collection: Collection, limit: Option<usize>, format: OutputFormat) -> Self {
        Self {
            collection,
            limit,
            format,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `betbook history` command.
#[derive(Debug, Parser, Clone)]
pub struct HistoryArgs {
    /// Only show this month, YYYY-MM.
    #[arg(long)]
    month: Option<YearMonth>,

    /// How to print the months.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl HistoryArgs {
    pub fn new(month: Option<YearMonth>, format: OutputFormat) -> Self {
        Self { month, format }
    }

    pub fn month(&self) -> Option<YearMonth> {
        self.month
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// Args for the `betbook restore` command.
#[derive(Debug, Parser, Clone)]
pub struct RestoreArgs {
    /// The JSON file to restore from, usually one from the backups directory.
    #[arg(long)]
    file: PathBuf,
}

impl RestoreArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// A calendar month, written `YYYY-MM` on the command line.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.year == date.year() && self.month == date.month()
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl FromStr for YearMonth {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d").map(Self::from)
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn default_betbook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("betbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or BETBOOK_HOME instead of relying on the default \
                betbook home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("betbook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(
            std::iter::once("betbook")
                .chain(["--home", "/tmp/betbook"])
                .chain(args.iter().copied()),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_add_profit() {
        let args = parse(&[
            "add", "profit", "--type", "deposit", "--amount", "100", "--date", "2024-01-10",
        ]);
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        let AddSubcommand::Profit(profit) = add.entity() else {
            panic!("expected profit, got {:?}", add.entity());
        };
        assert_eq!(profit.fields().kind(), TransactionType::Deposit);
        assert_eq!(profit.fields().amount(), "100");
        assert_eq!(profit.date().to_string(), "2024-01-10");
        assert_eq!(args.common().home().path(), Path::new("/tmp/betbook"));
    }

    #[test]
    fn test_add_date_defaults_to_today() {
        let args = parse(&["add", "note", "--notes", "hello"]);
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        let AddSubcommand::Note(note) = add.entity() else {
            panic!("expected note");
        };
        assert_eq!(note.date(), today());
    }

    #[test]
    fn test_update_requires_date() {
        let result = Args::try_parse_from([
            "betbook", "update", "note", "--id", "1", "--notes", "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_handicap() {
        let args = parse(&["add", "match", "--info", "A vs B", "--handicap", "-0.5"]);
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        let AddSubcommand::Match(m) = add.entity() else {
            panic!("expected match");
        };
        assert_eq!(m.fields().handicap(), Some("-0.5"));
    }

    #[test]
    fn test_parse_list_and_delete() {
        let args = parse(&["list", "match", "--limit", "3", "--format", "csv"]);
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(list.collection(), Collection::MatchNotes);
        assert_eq!(list.limit(), Some(3));
        assert_eq!(list.format(), OutputFormat::Csv);

        let args = parse(&["delete", "note", "--id", "17"]);
        let Command::Delete(delete) = args.command() else {
            panic!("expected delete");
        };
        assert_eq!(delete.collection(), Collection::NormalNotes);
        assert_eq!(delete.id().as_str(), "17");
    }

    #[test]
    fn test_year_month() {
        let month = YearMonth::from_str("2024-02").unwrap();
        assert_eq!(month, YearMonth::from(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()));
        assert_eq!(month.to_string(), "2024-02");
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()));
        assert!(YearMonth::from_str("2024-13").is_err());
        assert!(YearMonth::from_str("February").is_err());
    }
}
