use crate::model::{Collection, Fields, NoteDate};
use crate::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A note about a match: when it is played, what it is, and the handicap being considered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchNote {
    match_date: NoteDate,
    match_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    handicap: Option<String>,
}

impl MatchNote {
    /// The match description is required. A blank handicap is the same as no handicap.
    pub fn new(
        match_date: NaiveDate,
        match_info: impl Into<String>,
        handicap: Option<String>,
    ) -> Result<Self> {
        let match_info = match_info.into();
        anyhow::ensure!(
            !match_info.trim().is_empty(),
            "Match info is required for a match note"
        );
        Ok(Self {
            match_date: NoteDate::from(match_date),
            match_info,
            handicap: handicap.filter(|h| !h.trim().is_empty()),
        })
    }

    /// The match date as it was written, which may include a kick-off time.
    pub fn match_date(&self) -> &NoteDate {
        &self.match_date
    }

    pub fn match_info(&self) -> &str {
        &self.match_info
    }

    /// The handicap, treating a stored empty string as absent.
    pub fn handicap(&self) -> Option<&str> {
        self.handicap.as_deref().filter(|h| !h.is_empty())
    }
}

impl Fields for MatchNote {
    const COLLECTION: Collection = Collection::MatchNotes;
    const NEWEST_DATE_FIRST: bool = false;

    fn date(&self) -> NaiveDate {
        self.match_date.date()
    }
}
