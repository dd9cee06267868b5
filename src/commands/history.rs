use crate::args::YearMonth;
use crate::commands::{total_line, Out, Render};
use crate::model::{Amount, Profit};
use crate::summary::{group_by_month, total_profit, MonthGroup, MonthlyStats};
use crate::{Config, Result};
use serde::Serialize;

/// The profit history: the overall total and one report per month, most recent month first.
#[derive(Debug, Clone, Serialize)]
pub struct History {
    total: Amount,
    months: Vec<MonthReport>,
}

impl History {
    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn months(&self) -> &[MonthReport] {
        &self.months
    }
}

/// A month of profit records together with its deposit, withdraw and profit figures.
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    #[serde(flatten)]
    group: MonthGroup,
    #[serde(flatten)]
    stats: MonthlyStats,
}

impl MonthReport {
    fn new(group: MonthGroup) -> Self {
        let stats = group.stats();
        Self { group, stats }
    }

    pub fn group(&self) -> &MonthGroup {
        &self.group
    }

    pub fn stats(&self) -> MonthlyStats {
        self.stats
    }
}

impl Render for History {
    fn headers(&self) -> Vec<String> {
        ["month", "records", "deposit", "withdraw", "profit"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.months
            .iter()
            .map(|m| {
                vec![
                    m.group.label().to_string(),
                    m.group.records().len().to_string(),
                    m.stats.deposit.to_string(),
                    m.stats.withdraw.to_string(),
                    m.stats.profit.to_string(),
                ]
            })
            .collect()
    }

    fn footer(&self) -> Option<String> {
        Some(total_line(self.total))
    }
}

/// Groups the profit records by month. With `month`, only that month is reported; the total is
/// always over every record.
pub async fn history(config: Config, month: Option<YearMonth>) -> Result<Out<History>> {
    let records = config.store().read::<Profit>().await?;
    let total = total_profit(&records);
    let selected: Vec<_> = records
        .iter()
        .filter(|r| month.map_or(true, |m| m.contains(r.date())))
        .cloned()
        .collect();
    let months: Vec<MonthReport> = group_by_month(&selected)
        .into_iter()
        .map(MonthReport::new)
        .collect();

    let message = match (month, months.first()) {
        (Some(m), None) => format!("There are no profit records in {m}"),
        (Some(_), Some(report)) => format!(
            "{}: {} records, profit {}",
            report.group.label(),
            report.group.records().len(),
            report.stats.profit
        ),
        (None, _) => format!(
            "{} records in {} months, total profit {total}",
            records.len(),
            months.len()
        ),
    };
    Ok(Out::new(message, History { total, months }))
}
