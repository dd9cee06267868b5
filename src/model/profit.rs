use crate::model::{Amount, Collection, Fields};
use crate::Result;
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The direction of a profit record.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money paid in. Stored with a negative amount.
    #[default]
    Deposit,
    /// Money taken out. Stored with a positive amount.
    Withdraw,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// Classifies an amount by its sign: `withdraw` if `amount >= 0`, `deposit` otherwise. This is
    /// how records without a stored `type` are read.
    pub fn infer(amount: Amount) -> Self {
        if amount.is_negative() {
            TransactionType::Deposit
        } else {
            TransactionType::Withdraw
        }
    }

    /// The upper case label used in listings, e.g. `DEPOSIT`.
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdraw => "WITHDRAW",
        }
    }

    /// Gives `magnitude` the sign of this direction, ignoring whatever sign it had.
    pub fn apply(self, magnitude: Amount) -> Amount {
        let abs = magnitude.abs();
        match self {
            TransactionType::Deposit if !abs.is_zero() => -abs,
            _ => abs,
        }
    }
}

/// The fields of a deposit or withdrawal.
///
/// Records written before the `type` field existed are still readable: `kind` falls back to the
/// sign of the amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profit {
    amount: Amount,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<TransactionType>,
    date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}

impl Profit {
    /// Creates profit fields from an unsigned magnitude. The stored amount is negative for a
    /// deposit and positive for a withdrawal. A blank note is dropped.
    pub fn new(
        kind: TransactionType,
        magnitude: Amount,
        date: NaiveDate,
        note: Option<String>,
    ) -> Self {
        Self {
            amount: kind.apply(magnitude),
            kind: Some(kind),
            date,
            note: note.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Like `new`, but takes the amount as the user typed it.
    pub fn parse(
        kind: TransactionType,
        amount: &str,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<Self> {
        anyhow::ensure!(!amount.trim().is_empty(), "An amount is required");
        let magnitude = Amount::from_str(amount)
            .with_context(|| format!("Unable to parse '{amount}' as an amount"))?;
        Ok(Self::new(kind, magnitude, date, note))
    }

    /// The signed amount: negative for deposits, positive for withdrawals.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// The stored `type`, or the one inferred from the amount's sign if it was never stored.
    pub fn kind(&self) -> TransactionType {
        self.kind
            .unwrap_or_else(|| TransactionType::infer(self.amount))
    }

    /// The `type` exactly as stored, which is `None` for legacy records.
    pub fn stored_kind(&self) -> Option<TransactionType> {
        self.kind
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }
}

impl Fields for Profit {
    const COLLECTION: Collection = Collection::Profit;
    const NEWEST_DATE_FIRST: bool = true;

    fn date(&self) -> NaiveDate {
        self.date
    }
}
