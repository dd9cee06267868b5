//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{Amount, Collection, MatchNote, NormalNote, Profit, TransactionType};
use crate::store::KeyValue;
use crate::{Config, Db};
use chrono::NaiveDate;
use std::str::FromStr;
use tempfile::TempDir;

/// Test environment that sets up a betbook home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("betbook");
        let config = Config::create(&root).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// The directory that holds the betbook home, for files that tests want to put next to it.
    pub fn temp_dir(&self) -> &std::path::Path {
        self._temp_dir.path()
    }

    /// Stores `value` under the collection key as is, bypassing the record store.
    pub async fn set_raw(&self, collection: Collection, value: &str) {
        let db = Db::load(self.config.sqlite_path()).await.unwrap();
        db.set_item(collection.key(), value).await.unwrap();
    }

    /// The value stored under the collection key.
    pub async fn raw(&self, collection: Collection) -> Option<String> {
        let db = Db::load(self.config.sqlite_path()).await.unwrap();
        db.get_item(collection.key()).await.unwrap()
    }

    /// Adds a deposit of 100 on 2024-01-10 and a withdrawal of 50 on 2024-01-15, then a
    /// withdrawal of 30 on 2024-02-01.
    pub async fn insert_test_profit(&self) {
        let store = self.config.store();
        for (kind, amount, d) in [
            (TransactionType::Deposit, 100_i64, "2024-01-10"),
            (TransactionType::Withdraw, 50, "2024-01-15"),
            (TransactionType::Withdraw, 30, "2024-02-01"),
        ] {
            store
                .add(Profit::new(kind, Amount::from(amount), date(d), None))
                .await
                .unwrap();
        }
    }

    /// Adds two match notes and one normal note.
    pub async fn insert_test_notes(&self) {
        let store = self.config.store();
        store
            .add(
                MatchNote::new(
                    date("2024-03-02"),
                    "Arsenal vs Chelsea",
                    Some("-0.5".into()),
                )
                .unwrap(),
            )
            .await
            .unwrap();
        store
            .add(MatchNote::new(date("2024-03-01"), "Inter vs Milan", None).unwrap())
            .await
            .unwrap();
        store
            .add(NormalNote::new(date("2024-03-01"), "Stick to the plan").unwrap())
            .await
            .unwrap();
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}
