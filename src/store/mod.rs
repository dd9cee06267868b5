//! The record store: generic create, read, update and delete over a key-value medium.
//!
//! Every collection is a JSON array stored under one key. Each operation reads the whole array,
//! changes it, writes the whole array back and returns the new contents. Mutations of one
//! collection are serialized with a per-collection lock, so two concurrent writers cannot lose
//! each other's changes. Reads do not wait for the lock.

mod memory;

pub use memory::MemoryStore;

use crate::error::ReadError;
use crate::model::{Collection, Fields, MatchNote, NormalNote, Profit, Record, RecordId, Snapshot};
use crate::Result;
use anyhow::Context;
use chrono::Utc;
use std::collections::HashSet;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, trace, warn};

/// A persistent medium that maps string keys to string values.
#[async_trait::async_trait]
pub trait KeyValue: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing was ever stored there.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing anything that was there.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Key-scoped CRUD over a `KeyValue` medium. Cloning is cheap and clones share the same medium,
/// locks and id sequence.
#[derive(Clone)]
pub struct Store {
    kv: Arc<dyn KeyValue>,
    locks: Arc<[Mutex<()>; 3]>,
    ids: Arc<IdSequence>,
}

impl Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self {
            kv,
            locks: Arc::new([Mutex::new(()), Mutex::new(()), Mutex::new(())]),
            ids: Arc::new(IdSequence::default()),
        }
    }

    /// A store backed by a fresh, empty `MemoryStore`.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Reads the collection that `F` belongs to. A collection that was never written is empty.
    ///
    /// # Errors
    /// - `ReadError::Io` if the medium cannot be read.
    /// - `ReadError::Corrupt` if the stored value is not a list of `F` records.
    pub async fn read<F: Fields>(&self) -> std::result::Result<Vec<Record<F>>, ReadError> {
        let collection = F::COLLECTION;
        let raw = self
            .kv
            .get_item(collection.key())
            .await
            .map_err(|source| ReadError::Io { collection, source })?;
        let Some(raw) = raw else {
            trace!("Nothing stored under {}", collection.key());
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| ReadError::Corrupt { collection, source })
    }

    /// Reads the collection that `F` belongs to, treating any failure as an empty collection.
    /// The failure is logged.
    pub async fn get<F: Fields>(&self) -> Vec<Record<F>> {
        match self.read::<F>().await {
            Ok(records) => records,
            Err(e) => {
                warn!("{e}. Treating the collection as empty.");
                Vec::new()
            }
        }
    }

    /// Returns the record with `id`, if there is one.
    pub async fn find<F: Fields>(&self, id: &RecordId) -> Option<Record<F>> {
        self.get::<F>().await.into_iter().find(|r| r.id() == id)
    }

    /// Assigns a new id to `fields`, puts the new record at the front of its collection, saves
    /// the collection and returns it.
    ///
    /// # Errors
    /// - If the collection cannot be read. A corrupt collection is left as it is rather than
    ///   overwritten.
    /// - If the write fails. Nothing is changed in that case.
    pub async fn add<F: Fields>(&self, fields: F) -> Result<Vec<Record<F>>> {
        let _guard = self.lock(F::COLLECTION).await;
        let current = self.read_for_write::<F>().await?;
        let id = self.ids.next(current.iter().map(Record::id));
        debug!("Adding record {id} to {}", F::COLLECTION.key());

        let mut records = Vec::with_capacity(current.len() + 1);
        records.push(Record::new(id, fields));
        records.extend(current);
        self.write(&records).await?;
        Ok(records)
    }

    /// Replaces the record that has the same id as `record`. All fields are replaced. If no
    /// record has that id the collection is returned unchanged; this is not an error.
    pub async fn update<F: Fields>(&self, record: Record<F>) -> Result<Vec<Record<F>>> {
        let _guard = self.lock(F::COLLECTION).await;
        let mut records = self.read_for_write::<F>().await?;
        let Some(existing) = records.iter_mut().find(|r| r.id() == record.id()) else {
            debug!(
                "No record {} in {}, nothing to update",
                record.id(),
                F::COLLECTION.key()
            );
            return Ok(records);
        };
        debug!("Updating record {} in {}", record.id(), F::COLLECTION.key());
        *existing = record;
        self.write(&records).await?;
        Ok(records)
    }

    /// Removes the record with `id`. If there is no such record the collection is returned
    /// unchanged; this is not an error.
    pub async fn delete<F: Fields>(&self, id: &RecordId) -> Result<Vec<Record<F>>> {
        let (_, records) = self.remove::<F>(id).await?;
        Ok(records)
    }

    /// Same as `delete`, but also returns the record that was removed, or `None` when there was
    /// no record with `id`.
    pub async fn remove<F: Fields>(
        &self,
        id: &RecordId,
    ) -> Result<(Option<Record<F>>, Vec<Record<F>>)> {
        let _guard = self.lock(F::COLLECTION).await;
        let mut records = self.read_for_write::<F>().await?;
        let Some(position) = records.iter().position(|r| r.id() == id) else {
            debug!("No record {id} in {}, nothing to delete", F::COLLECTION.key());
            return Ok((None, records));
        };
        debug!("Deleting record {id} from {}", F::COLLECTION.key());
        let removed = records.remove(position);
        self.write(&records).await?;
        Ok((Some(removed), records))
    }

    /// Reads all three collections.
    ///
    /// # Errors
    /// The first collection that cannot be read. A corrupt collection is never reported as empty
    /// here, so a snapshot can always stand in for the stored data.
    pub async fn snapshot(&self) -> std::result::Result<Snapshot, ReadError> {
        Ok(Snapshot {
            profit: self.read::<Profit>().await?,
            match_notes: self.read::<MatchNote>().await?,
            normal_notes: self.read::<NormalNote>().await?,
        })
    }

    /// Replaces the contents of all three collections with `snapshot`.
    ///
    /// Every collection in `snapshot` must have unique, non-blank ids, otherwise nothing is
    /// written. If one of the writes fails, the collections already written are put back the way
    /// they were.
    pub async fn restore(&self, snapshot: &Snapshot) -> Result<()> {
        check_ids(&snapshot.profit)?;
        check_ids(&snapshot.match_notes)?;
        check_ids(&snapshot.normal_notes)?;
        let incoming = [
            (Collection::Profit, to_json(&snapshot.profit)?),
            (Collection::MatchNotes, to_json(&snapshot.match_notes)?),
            (Collection::NormalNotes, to_json(&snapshot.normal_notes)?),
        ];

        // Always taken in the same order. Everything else holds at most one of these.
        let _profit = self.lock(Collection::Profit).await;
        let _match_notes = self.lock(Collection::MatchNotes).await;
        let _normal_notes = self.lock(Collection::NormalNotes).await;

        let mut previous = Vec::with_capacity(incoming.len());
        for (collection, _) in &incoming {
            let raw = self
                .kv
                .get_item(collection.key())
                .await
                .with_context(|| format!("Unable to read {} before restoring", collection.key()))?;
            previous.push((*collection, raw));
        }

        for (written, (collection, json)) in incoming.iter().enumerate() {
            debug!("Restoring {}", collection.key());
            if let Err(e) = self.kv.set_item(collection.key(), json).await {
                self.roll_back(&previous[..written]).await;
                return Err(e).with_context(|| {
                    format!("Unable to restore {}, nothing was changed", collection.key())
                });
            }
        }
        Ok(())
    }

    /// Puts back raw values saved by `restore`. A collection that had never been written goes
    /// back to being empty.
    async fn roll_back(&self, previous: &[(Collection, Option<String>)]) {
        for (collection, raw) in previous.iter().rev() {
            let key = collection.key();
            let value = raw.as_deref().unwrap_or("[]");
            match self.kv.set_item(key, value).await {
                Ok(()) => debug!("Rolled back {key}"),
                Err(e) => error!("Unable to roll back {key}: {e:#}"),
            }
        }
    }

    async fn read_for_write<F: Fields>(&self) -> Result<Vec<Record<F>>> {
        self.read::<F>()
            .await
            .context("The collection was not changed because it could not be read")
    }

    async fn write<F: Fields>(&self, records: &[Record<F>]) -> Result<()> {
        let key = F::COLLECTION.key();
        let json = to_json(records)?;
        self.kv
            .set_item(key, &json)
            .await
            .with_context(|| format!("Unable to save {key}"))
    }

    async fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        self.locks[collection.index()].lock().await
    }
}

fn to_json<F: Fields>(records: &[Record<F>]) -> Result<String> {
    serde_json::to_string(records)
        .with_context(|| format!("Unable to serialize the records for {}", F::COLLECTION.key()))
}

/// Ids must be non-blank and unique within a collection.
fn check_ids<F: Fields>(records: &[Record<F>]) -> Result<()> {
    let key = F::COLLECTION.key();
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        let id = record.id();
        anyhow::ensure!(
            !id.as_str().trim().is_empty(),
            "A record in {key} has a blank id"
        );
        anyhow::ensure!(seen.insert(id), "The id {id} appears more than once in {key}");
    }
    Ok(())
}

/// Issues record ids: the current time in milliseconds, bumped when necessary so that every id is
/// larger than any numeric id already in the collection and larger than the last id issued.
#[derive(Debug, Default)]
struct IdSequence {
    last: AtomicU64,
}

impl IdSequence {
    fn next<'a>(&self, existing: impl Iterator<Item = &'a RecordId>) -> RecordId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let floor = existing
            .filter_map(RecordId::as_number)
            .max()
            .map_or(0, |max| max.saturating_add(1));
        let candidate = now.max(floor);
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(candidate.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        RecordId::from(candidate.max(previous.saturating_add(1)))
    }
}
