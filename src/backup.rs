//! JSON snapshots of all collections, kept in `$BETBOOK_HOME/.backups` with rotation.

use crate::model::Snapshot;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix for backups requested by the user.
pub const MANUAL: &str = "backup";

/// Prefix for the snapshot taken before a restore overwrites everything.
pub const RESTORE_PRE: &str = "restore-pre";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// Saves `snapshot` as `{prefix}.YYYY-MM-DD-NNN.json`, where NNN counts the backups made with
    /// that prefix on that day, then deletes the oldest files so that at most `backup_copies`
    /// remain for the prefix.
    ///
    /// Returns the path to the created backup file.
    pub async fn save(&self, prefix: &str, snapshot: &Snapshot) -> Result<PathBuf> {
        let date = Local::now().format("%Y-%m-%d").to_string();
        let names = self.names(prefix).await?;
        let seq = names
            .iter()
            .filter_map(|name| sequence_number(name, prefix, &date))
            .max()
            .unwrap_or(0)
            + 1;
        let path = self
            .backups_dir
            .join(format!("{prefix}.{date}-{seq:03}.{EXTENSION}"));

        let json =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize the snapshot")?;
        utils::write(&path, json).await?;
        debug!("Wrote backup {}", path.display());

        self.rotate(prefix).await?;
        Ok(path)
    }

    /// Reads a snapshot from a backup file (or any file in the same format).
    pub async fn load(path: &Path) -> Result<Snapshot> {
        utils::deserialize(path)
            .await
            .context("The file is not a betbook backup")
    }

    /// Deletes the oldest backups with `prefix` beyond `backup_copies`. File names sort by date and
    /// sequence number, so the oldest come first.
    async fn rotate(&self, prefix: &str) -> Result<()> {
        let mut names = self.names(prefix).await?;
        names.sort();
        let excess = names.len().saturating_sub(self.backup_copies as usize);
        for name in names.into_iter().take(excess) {
            debug!("Rotating out old backup {name}");
            utils::remove(self.backups_dir.join(name)).await?;
        }
        Ok(())
    }

    /// The names of the backup files with `prefix`.
    async fn names(&self, prefix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut dir = utils::read_dir(&self.backups_dir).await?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .context("Failed to read directory entry")?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                names.push(name);
            }
        }
        Ok(names)
    }
}

/// Parses NNN out of `{prefix}.{date}-NNN.json`.
fn sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NormalNote, Record};
    use crate::test::TestEnv;

    #[test]
    fn test_sequence_number() {
        assert_eq!(
            sequence_number("backup.2025-12-14-001.json", "backup", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            sequence_number("backup.2025-12-14-042.json", "backup", "2025-12-14"),
            Some(42)
        );
        assert_eq!(
            sequence_number("restore-pre.2025-12-14-001.json", "backup", "2025-12-14"),
            None
        );
        assert_eq!(
            sequence_number("backup.2025-12-13-001.json", "backup", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("backup.2025-12-14-001.json", "backup"));
        assert!(!is_backup_file("backup.2025-12-14-001.json", "restore-pre"));
        assert!(!is_backup_file("backup.2025-12-14-001.txt", "backup"));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let env = TestEnv::new().await;
        let snapshot = Snapshot {
            normal_notes: vec![Record::new(
                "1",
                NormalNote::new(chrono::NaiveDate::MIN, "hello").unwrap(),
            )],
            ..Snapshot::default()
        };
        let path = env.config().backup().save(MANUAL, &snapshot).await.unwrap();
        assert!(path.is_file());
        assert_eq!(Backup::load(&path).await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_rotation_keeps_backup_copies() {
        let env = TestEnv::new().await;
        let backup = env.config().backup();
        let mut paths = Vec::new();
        for _ in 0..(env.config().backup_copies() + 2) {
            paths.push(backup.save(MANUAL, &Snapshot::default()).await.unwrap());
        }
        let remaining = backup.names(MANUAL).await.unwrap();
        assert_eq!(remaining.len(), env.config().backup_copies() as usize);
        assert!(!paths[0].exists());
        assert!(paths.last().unwrap().exists());
    }
}
