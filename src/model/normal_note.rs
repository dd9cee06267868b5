use crate::model::{Collection, Fields, NoteDate};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A dated free-form note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalNote {
    date: NoteDate,
    notes: String,
}

impl NormalNote {
    pub fn new(date: NaiveDate, notes: impl Into<String>) -> Result<Self> {
        let notes = notes.into();
        anyhow::ensure!(!notes.trim().is_empty(), "A note cannot be empty");
        Ok(Self {
            date: NoteDate::from(date),
            notes,
        })
    }

    /// The date as it was written.
    pub fn note_date(&self) -> &NoteDate {
        &self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }
}

impl Fields for NormalNote {
    const COLLECTION: Collection = Collection::NormalNotes;
    const NEWEST_DATE_FIRST: bool = true;

    fn date(&self) -> NaiveDate {
        self.date.date()
    }
}
