//! Figures derived from the profit collection: the running total, month groups and the
//! deposit/withdraw/profit breakdown of a month. Nothing here is persisted; callers recompute
//! from the snapshot that each store operation returns.

use crate::model::{sort_by_date_desc, Amount, ProfitTransaction};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// The signed sum of every amount.
///
/// Deposits are stored as negative amounts, so someone who has only deposited has a negative
/// total. That is the convention of the stored data and is kept as is.
pub fn total_profit(records: &[ProfitTransaction]) -> Amount {
    records.iter().map(|r| r.fields().amount()).sum()
}

/// Deposits, withdrawals and their difference for a set of records, usually one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyStats {
    /// The sum of the absolute values of the negative amounts.
    pub deposit: Amount,
    /// The sum of the amounts that are zero or positive.
    pub withdraw: Amount,
    /// `withdraw - deposit`, which is the same as the plain sum of the amounts.
    pub profit: Amount,
}

impl MonthlyStats {
    /// True when `profit == withdraw - deposit`.
    pub fn is_consistent(&self) -> bool {
        self.profit == self.withdraw - self.deposit
    }
}

pub fn monthly_stats(records: &[ProfitTransaction]) -> MonthlyStats {
    let (deposit, withdraw) =
        records
            .iter()
            .fold((Amount::ZERO, Amount::ZERO), |(deposit, withdraw), r| {
                let amount = r.fields().amount();
                if amount.is_negative() {
                    (deposit + amount.abs(), withdraw)
                } else {
                    (deposit, withdraw + amount)
                }
            });
    MonthlyStats {
        deposit,
        withdraw,
        profit: withdraw - deposit,
    }
}

/// The records of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGroup {
    year: i32,
    month: u32,
    label: String,
    records: Vec<ProfitTransaction>,
}

impl MonthGroup {
    fn new(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            label: month_label(date),
            records: Vec::new(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The month name and year, e.g. `February 2024`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn records(&self) -> &[ProfitTransaction] {
        &self.records
    }

    pub fn stats(&self) -> MonthlyStats {
        monthly_stats(&self.records)
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.year == date.year() && self.month == date.month()
    }
}

/// The English month name and year of `date`, e.g. `January 2024`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Partitions records by calendar month, most recent month first.
///
/// The input is sorted by date, newest first, before grouping, so the order of the input does
/// not matter. Within a month the records are newest first as well.
pub fn group_by_month(records: &[ProfitTransaction]) -> Vec<MonthGroup> {
    let mut sorted = records.to_vec();
    sort_by_date_desc(&mut sorted);

    let mut groups: Vec<MonthGroup> = Vec::new();
    for record in sorted {
        let date = record.date();
        match groups.last_mut() {
            Some(group) if group.contains(date) => group.records.push(record),
            _ => {
                let mut group = MonthGroup::new(date);
                group.records.push(record);
                groups.push(group);
            }
        }
    }
    groups
}

/// The `n` most recent records by date.
pub fn recent(records: &[ProfitTransaction], n: usize) -> Vec<ProfitTransaction> {
    let mut sorted = records.to_vec();
    sort_by_date_desc(&mut sorted);
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Profit, Record, TransactionType};
    use crate::store::Store;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::from_str(s).unwrap()
    }

    fn record(id: u64, amount: &str, d: &str) -> ProfitTransaction {
        let json = format!(r#"{{"id":"{id}","amount":{amount},"date":"{d}"}}"#);
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_total_is_signed_sum() {
        let records = vec![
            record(1, "-100", "2024-01-10"),
            record(2, "50", "2024-01-15"),
            record(3, "12.5", "2024-03-01"),
        ];
        assert_eq!(
            total_profit(&records).value(),
            Decimal::from_str("-37.5").unwrap()
        );
        assert_eq!(total_profit(&[]), Amount::ZERO);
    }

    #[test]
    fn test_monthly_stats_invariant() {
        let sets = vec![
            vec![],
            vec![record(1, "-100", "2024-01-10")],
            vec![record(1, "0", "2024-01-10"), record(2, "7.25", "2024-01-11")],
            vec![
                record(1, "-0.1", "2024-01-10"),
                record(2, "-0.2", "2024-01-11"),
                record(3, "0.3", "2024-01-12"),
            ],
        ];
        for records in sets {
            let stats = monthly_stats(&records);
            assert!(stats.is_consistent(), "{stats:?}");
            assert_eq!(stats.profit, total_profit(&records));
        }
    }

    #[test]
    fn test_zero_counts_as_withdraw() {
        let stats = monthly_stats(&[record(1, "0", "2024-01-10")]);
        assert_eq!(stats, MonthlyStats::default());
    }

    #[test]
    fn test_group_by_month() {
        let records = vec![
            record(3, "1", "2024-02-01"),
            record(2, "1", "2024-01-20"),
            record(1, "1", "2024-01-05"),
        ];
        let groups = group_by_month(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label(), "February 2024");
        assert_eq!(groups[0].records().len(), 1);
        assert_eq!(groups[1].label(), "January 2024");
        assert_eq!(groups[1].records().len(), 2);
        assert_eq!((groups[1].year(), groups[1].month()), (2024, 1));
    }

    #[test]
    fn test_group_by_month_sorts_unordered_input() {
        let records = vec![
            record(1, "1", "2024-01-05"),
            record(2, "1", "2023-12-31"),
            record(3, "1", "2024-02-01"),
            record(4, "1", "2024-01-20"),
        ];
        let labels: Vec<String> = group_by_month(&records)
            .iter()
            .map(|g| g.label().to_string())
            .collect();
        assert_eq!(
            labels,
            vec!["February 2024", "January 2024", "December 2023"]
        );
    }

    #[test]
    fn test_same_month_different_year_are_separate() {
        let records = vec![record(1, "1", "2024-01-05"), record(2, "1", "2023-01-05")];
        let groups = group_by_month(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].label(), "January 2023");
    }

    #[test]
    fn test_recent() {
        let records = vec![
            record(1, "1", "2024-01-05"),
            record(2, "1", "2024-03-01"),
            record(3, "1", "2024-02-01"),
        ];
        let ids: Vec<String> = recent(&records, 2)
            .iter()
            .map(|r| r.id().to_string())
            .collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_deposit_then_withdraw_scenario() {
        let store = Store::in_memory();
        store
            .add(Profit::new(
                TransactionType::Deposit,
                Amount::from(100),
                date("2024-01-10"),
                None,
            ))
            .await
            .unwrap();
        let records: Vec<Record<Profit>> = store
            .add(Profit::new(
                TransactionType::Withdraw,
                Amount::from(50),
                date("2024-01-15"),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(total_profit(&records), Amount::from(-50));

        let groups = group_by_month(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label(), "January 2024");
        assert_eq!(
            groups[0].stats(),
            MonthlyStats {
                deposit: Amount::from(100),
                withdraw: Amount::from(50),
                profit: Amount::from(-50),
            }
        );
    }
}
