//! Types that represent the core data model: the three collections and their records.
mod amount;
mod id;
mod match_note;
mod normal_note;
mod note_date;
mod profit;

pub use amount::{Amount, AmountError};
pub use id::RecordId;
pub use match_note::MatchNote;
pub use normal_note::NormalNote;
pub use note_date::NoteDate;
pub use profit::{Profit, TransactionType};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A record of profit data, i.e. one deposit or withdrawal.
pub type ProfitTransaction = Record<Profit>;

/// The logical collections that are persisted. Each one is stored under its own key.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Deposits and withdrawals.
    Profit,
    /// Notes about matches.
    #[value(name = "match")]
    MatchNotes,
    /// Free-form notes.
    #[value(name = "note")]
    NormalNotes,
}

serde_plain::derive_display_from_serialize!(Collection);
serde_plain::derive_fromstr_from_deserialize!(Collection);

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Profit,
        Collection::MatchNotes,
        Collection::NormalNotes,
    ];

    /// The storage key that the collection is persisted under.
    pub const fn key(self) -> &'static str {
        match self {
            Collection::Profit => "PROFIT_DATA",
            Collection::MatchNotes => "MATCH_NOTES",
            Collection::NormalNotes => "NORMAL_NOTES",
        }
    }

    pub(crate) const fn index(self) -> usize {
        match self {
            Collection::Profit => 0,
            Collection::MatchNotes => 1,
            Collection::NormalNotes => 2,
        }
    }
}

/// The collection-specific part of a record, i.e. everything except its `id`.
///
/// Each implementation knows which collection it belongs to, so the store can find the storage
/// key from the type alone.
pub trait Fields:
    Debug + Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The collection that records with these fields are stored in.
    const COLLECTION: Collection;

    /// Whether listings of this collection are re-sorted by date, newest first. When false the
    /// stored order (newest insertion first) is kept.
    const NEWEST_DATE_FIRST: bool;

    /// The calendar date that the record is about.
    fn date(&self) -> NaiveDate;
}

/// A persisted record: a unique, immutable `id` plus the fields of its collection.
///
/// The fields are flattened on the wire, so a profit record looks like this:
/// ```json
/// { "id": "1704902400000", "amount": -100, "type": "deposit", "date": "2024-01-10" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<F> {
    id: RecordId,
    #[serde(flatten)]
    fields: F,
}

impl<F> Record<F>
where
    F: Fields,
{
    pub fn new(id: impl Into<RecordId>, fields: F) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn date(&self) -> NaiveDate {
        self.fields.date()
    }

    /// Keeps the `id` and replaces every field. There is no merging of individual fields.
    pub fn with_fields(self, fields: F) -> Self {
        Self {
            id: self.id,
            fields,
        }
    }
}

/// Sorts by date, newest first. Records on the same date are ordered by id, newest first, which
/// for ids issued by the store is the same as insertion order.
pub fn sort_by_date_desc<F: Fields>(records: &mut [Record<F>]) {
    records.sort_by(|a, b| {
        b.date()
            .cmp(&a.date())
            .then_with(|| b.id().cmp(a.id()))
    });
}

/// Applies the presentation order of the collection: date descending for profit and normal
/// notes, stored order for match notes.
pub fn presentation_order<F: Fields>(records: &mut [Record<F>]) {
    if F::NEWEST_DATE_FIRST {
        sort_by_date_desc(records)
    }
}

/// All three collections at once. This is the format of backup files: each collection is keyed by
/// its storage key.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "PROFIT_DATA", default)]
    pub profit: Vec<Record<Profit>>,
    #[serde(rename = "MATCH_NOTES", default)]
    pub match_notes: Vec<Record<MatchNote>>,
    #[serde(rename = "NORMAL_NOTES", default)]
    pub normal_notes: Vec<Record<NormalNote>>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.profit.len() + self.match_notes.len() + self.normal_notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
