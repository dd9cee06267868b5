use crate::model::Collection;
use thiserror::Error;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The ways reading a collection from storage can fail.
///
/// `Store::get` treats both of these as an empty collection. `Store::read` hands them to the
/// caller so that a corrupt collection can be told apart from an empty one.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The storage medium could not be read.
    #[error("Unable to read '{}': {source}", .collection.key())]
    Io {
        collection: Collection,
        #[source]
        source: anyhow::Error,
    },

    /// A value exists under the collection key but it is not a valid list of records.
    #[error("The stored value under '{}' is not a valid collection: {source}", .collection.key())]
    Corrupt {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
}

impl ReadError {
    pub fn collection(&self) -> Collection {
        match self {
            ReadError::Io { collection, .. } | ReadError::Corrupt { collection, .. } => *collection,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, ReadError::Corrupt { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_read_error_message_and_source() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = ReadError::Corrupt {
            collection: Collection::MatchNotes,
            source,
        };
        assert!(err
            .to_string()
            .starts_with("The stored value under 'MATCH_NOTES' is not a valid collection"));
        assert!(err.source().is_some());
        assert!(err.is_corrupt());

        let err = ReadError::Io {
            collection: Collection::Profit,
            source: anyhow::anyhow!("disk on fire"),
        };
        assert_eq!(err.to_string(), "Unable to read 'PROFIT_DATA': disk on fire");
        assert_eq!(err.source().map(|e| e.to_string()).as_deref(), Some("disk on fire"));
        assert_eq!(err.collection(), Collection::Profit);
    }
}
