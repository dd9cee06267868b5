use crate::commands::{record_headers, record_row, total_line, Columns, Out, Render};
use crate::model::{presentation_order, Amount, Record};
use crate::{Config, Result};
use serde::Serialize;

/// The records of one collection in presentation order, plus the collection total if it has one.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<F> {
    records: Vec<Record<F>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<Amount>,
}

impl<F: Columns> Listing<F> {
    pub fn records(&self) -> &[Record<F>] {
        &self.records
    }

    /// For profit, the signed sum of every record, including those cut off by a limit.
    pub fn total(&self) -> Option<Amount> {
        self.total
    }
}

impl<F: Columns> Render for Listing<F> {
    fn headers(&self) -> Vec<String> {
        record_headers::<F>()
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(record_row).collect()
    }

    fn footer(&self) -> Option<String> {
        self.total.map(total_line)
    }
}

/// Lists a collection. Profit and normal notes are ordered by date, newest first; match notes are
/// kept in the order they were added, newest first.
///
/// Unlike the store's lenient `get`, a collection that cannot be read is an error here so that
/// the user finds out about it.
pub async fn list<F: Columns>(config: Config, limit: Option<usize>) -> Result<Out<Listing<F>>> {
    let mut records = config.store().read::<F>().await?;
    presentation_order(&mut records);
    let total = F::total(&records);
    let count = records.len();
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    let message = if records.len() < count {
        format!("Showing {} of {count} records in {}", records.len(), F::COLLECTION)
    } else {
        format!("{count} records in {}", F::COLLECTION)
    };
    Ok(Out::new(message, Listing { records, total }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::OutputFormat;
    use crate::model::{MatchNote, NormalNote, Profit};
    use crate::store::KeyValue;
    use crate::test::{date, TestEnv};
    use crate::Db;

    #[tokio::test]
    async fn test_list_profit_newest_date_first_with_total() {
        let env = TestEnv::new().await;
        env.insert_test_profit().await;
        // added last but dated first
        env.config()
            .store()
            .add(Profit::new(
                crate::model::TransactionType::Withdraw,
                Amount::from(5),
                date("2023-12-31"),
                None,
            ))
            .await
            .unwrap();

        let out = list::<Profit>(env.config(), None).await.unwrap();
        let listing = out.structure().unwrap();
        let dates: Vec<String> = listing
            .records()
            .iter()
            .map(|r| r.date().to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-02-01", "2024-01-15", "2024-01-10", "2023-12-31"]
        );
        assert_eq!(listing.total(), Some(Amount::from(-15)));

        let table = listing.render(OutputFormat::Table).unwrap();
        assert!(table.trim_end().ends_with("Total profit: -15.00"));
    }

    #[tokio::test]
    async fn test_list_limit_keeps_full_total() {
        let env = TestEnv::new().await;
        env.insert_test_profit().await;
        let out = list::<Profit>(env.config(), Some(1)).await.unwrap();
        let listing = out.structure().unwrap();
        assert_eq!(listing.records().len(), 1);
        assert_eq!(listing.total(), Some(Amount::from(-20)));
        assert!(out.message().starts_with("Showing 1 of 3"));
    }

    #[tokio::test]
    async fn test_list_match_notes_keep_stored_order() {
        let env = TestEnv::new().await;
        env.insert_test_notes().await;
        let out = list::<MatchNote>(env.config(), None).await.unwrap();
        let listing = out.structure().unwrap();
        let infos: Vec<&str> = listing
            .records()
            .iter()
            .map(|r| r.fields().match_info())
            .collect();
        // the later match was added first, so it comes last
        assert_eq!(infos, vec!["Inter vs Milan", "Arsenal vs Chelsea"]);
        assert_eq!(listing.total(), None);

        let json: serde_json::Value =
            serde_json::from_str(&listing.render(OutputFormat::Json).unwrap()).unwrap();
        assert!(json.get("total").is_none());
        assert_eq!(json["records"][1]["matchInfo"], "Arsenal vs Chelsea");
    }

    #[tokio::test]
    async fn test_list_corrupt_collection_is_an_error() {
        let env = TestEnv::new().await;
        let db = Db::load(env.config().sqlite_path()).await.unwrap();
        db.set_item("NORMAL_NOTES", "{oops").await.unwrap();
        drop(db);

        let err = list::<NormalNote>(env.config(), None).await.unwrap_err();
        assert!(err.to_string().contains("NORMAL_NOTES"));
    }
}
