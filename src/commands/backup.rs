use crate::backup::{self, Backup};
use crate::commands::{Out, Render};
use crate::{Config, Result};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

/// A backup file that was written.
#[derive(Debug, Clone, Serialize)]
pub struct BackupFile {
    path: String,
    records: usize,
}

impl BackupFile {
    pub fn path(&self) -> &Path {
        Path::new(&self.path)
    }

    pub fn records(&self) -> usize {
        self.records
    }
}

impl Render for BackupFile {
    fn headers(&self) -> Vec<String> {
        vec!["file".to_string(), "records".to_string()]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        vec![vec![self.path.clone(), self.records.to_string()]]
    }
}

/// Writes every collection to a new file in the backups directory. Fails, without writing a file,
/// if any collection cannot be read.
pub async fn backup(config: Config) -> Result<Out<BackupFile>> {
    let snapshot = config
        .store()
        .snapshot()
        .await
        .context("Unable to back up")?;
    let path = config.backup().save(backup::MANUAL, &snapshot).await?;
    let file = BackupFile {
        path: path.to_string_lossy().to_string(),
        records: snapshot.len(),
    };
    Ok(Out::new(
        format!("Backed up {} records to {}", file.records, file.path),
        file,
    ))
}

/// Replaces every collection with the contents of `file`. The current data is written to a
/// `restore-pre` backup first, so a restore can itself be undone. If any current collection cannot
/// be read, nothing is restored: it could not be saved and would be lost.
pub async fn restore(config: Config, file: &Path) -> Result<Out<BackupFile>> {
    let incoming = Backup::load(file)
        .await
        .with_context(|| format!("Unable to restore from {}", file.display()))?;

    let current = config
        .store()
        .snapshot()
        .await
        .context("Nothing was restored because the current data could not be read")?;
    let saved = config
        .backup()
        .save(backup::RESTORE_PRE, &current)
        .await
        .context("Unable to back up the current data before restoring")?;

    config.store().restore(&incoming).await?;
    let previous = BackupFile {
        path: saved.to_string_lossy().to_string(),
        records: current.len(),
    };
    Ok(Out::new(
        format!(
            "Restored {} records from {}. The previous {} records were saved to {}",
            incoming.len(),
            file.display(),
            previous.records,
            previous.path
        ),
        previous,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collection, MatchNote, NormalNote, Profit};
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_backup_then_restore() {
        let env = TestEnv::new().await;
        env.insert_test_profit().await;
        env.insert_test_notes().await;
        let original = env.config().store().snapshot().await.unwrap();

        let out = backup(env.config()).await.unwrap();
        let file = out.structure().unwrap().clone();
        assert_eq!(file.records(), 6);
        assert!(file.path().starts_with(env.config().backups()));

        // change everything, then go back
        let store = env.config().store().clone();
        for record in &original.profit {
            store.delete::<Profit>(record.id()).await.unwrap();
        }
        store
            .add(NormalNote::new(crate::test::date("2025-05-05"), "after the backup").unwrap())
            .await
            .unwrap();

        let out = restore(env.config(), file.path()).await.unwrap();
        assert_eq!(out.structure().unwrap().records(), 4);
        assert!(out.structure().unwrap().path().is_file());
        assert_eq!(env.config().store().snapshot().await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_restore_from_bad_file_changes_nothing() {
        let env = TestEnv::new().await;
        env.insert_test_notes().await;
        let before = env.config().store().get::<MatchNote>().await;

        let path = env.temp_dir().join("not-a-backup.json");
        tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();
        assert!(restore(env.config(), &path).await.is_err());
        assert!(restore(env.config(), &env.temp_dir().join("missing.json"))
            .await
            .is_err());
        assert_eq!(env.config().store().get::<MatchNote>().await, before);
    }

    #[tokio::test]
    async fn test_restore_accepts_partial_snapshot() {
        let env = TestEnv::new().await;
        env.insert_test_profit().await;
        let path = env.temp_dir().join("notes-only.json");
        tokio::fs::write(
            &path,
            r#"{"NORMAL_NOTES": [{"id": "1", "date": "2024-01-01", "notes": "hi"}]}"#,
        )
        .await
        .unwrap();

        restore(env.config(), &path).await.unwrap();
        let snapshot = env.config().store().snapshot().await.unwrap();
        assert!(snapshot.profit.is_empty());
        assert!(snapshot.match_notes.is_empty());
        assert_eq!(snapshot.normal_notes.len(), 1);
        assert_eq!(snapshot.normal_notes[0].fields().notes(), "hi");
    }

    #[tokio::test]
    async fn test_backup_refuses_corrupt_collection() {
        let env = TestEnv::new().await;
        env.insert_test_notes().await;
        env.set_raw(Collection::Profit, r#"[{"id":"1","amount":-100,"date":"2024-13-40"}]"#)
            .await;

        let err = backup(env.config()).await.unwrap_err();
        assert!(format!("{err:#}").contains("PROFIT_DATA"));
        let mut files = tokio::fs::read_dir(env.config().backups()).await.unwrap();
        assert!(files.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_over_corrupt_collection_changes_nothing() {
        let env = TestEnv::new().await;
        env.insert_test_notes().await;
        let raw = r#"[{"id":"1","amount":-100,"date":"2024-13-40"}]"#;
        env.set_raw(Collection::Profit, raw).await;
        let notes = env.config().store().get::<NormalNote>().await;

        let path = env.temp_dir().join("notes-only.json");
        tokio::fs::write(
            &path,
            r#"{"NORMAL_NOTES": [{"id": "1", "date": "2024-01-01", "notes": "hi"}]}"#,
        )
        .await
        .unwrap();

        let err = restore(env.config(), &path).await.unwrap_err();
        assert!(format!("{err:#}").contains("Nothing was restored"));
        assert_eq!(env.raw(Collection::Profit).await.as_deref(), Some(raw));
        assert_eq!(env.config().store().get::<NormalNote>().await, notes);
    }

    #[tokio::test]
    async fn test_restore_rejects_duplicate_ids() {
        let env = TestEnv::new().await;
        env.insert_test_profit().await;
        let before = env.config().store().snapshot().await.unwrap();

        let path = env.temp_dir().join("merged.json");
        tokio::fs::write(
            &path,
            r#"{"NORMAL_NOTES": [
                {"id": "5", "date": "2024-01-01", "notes": "one"},
                {"id": "5", "date": "2024-01-02", "notes": "two"}
            ]}"#,
        )
        .await
        .unwrap();

        assert!(restore(env.config(), &path).await.is_err());
        assert_eq!(env.config().store().snapshot().await.unwrap(), before);
    }
}
