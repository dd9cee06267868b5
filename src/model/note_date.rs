use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The date on a note. Notes are typed by hand, so stored values are not always plain
/// `YYYY-MM-DD` dates.
///
/// Only the leading `YYYY-MM-DD` or `YYYY/MM/DD` is interpreted, which lets values such as
/// `2024-05-01 19:30` or `2024-05-01T19:30:00Z` be read. Anything more than a plain date is kept
/// and written back exactly as it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDate {
    date: NaiveDate,
    text: Option<String>,
}

impl NoteDate {
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl From<NaiveDate> for NoteDate {
    fn from(date: NaiveDate) -> Self {
        Self { date, text: None }
    }
}

impl FromStr for NoteDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::from_str(trimmed) {
            return Ok(Self::from(date));
        }
        let prefix = trimmed.get(..10).unwrap_or(trimmed);
        let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(prefix, "%Y/%m/%d"))?;
        Ok(Self {
            date,
            text: Some(trimmed.to_string()),
        })
    }
}

impl Display for NoteDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.text {
            Some(text) => f.write_str(text),
            None => Display::fmt(&self.date, f),
        }
    }
}

impl Serialize for NoteDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NoteDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        NoteDate::from_str(&s)
            .map_err(|e| D::Error::custom(format!("unable to read '{s}' as a date: {e}")))
    }
}
