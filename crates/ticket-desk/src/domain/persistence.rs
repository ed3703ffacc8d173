//! Persisted document keys and fail-open JSON helpers shared by the stores.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::Error;
use super::ports::{KeyValueStore, StorageError};

/// Storage keys for the persisted documents.
pub mod keys {
    /// User registry: JSON array of user records.
    pub const USERS: &str = "ticketapp_users";
    /// Active session document, absent when signed out.
    pub const SESSION: &str = "ticketapp_session";
    /// Ticket collection: JSON array of ticket records.
    pub const TICKETS: &str = "ticketapp_tickets_v1";
}

/// Outcome of reading a persisted document.
#[derive(Debug)]
pub(crate) enum Document<T> {
    /// Nothing stored under the key.
    Absent,
    /// Stored and parsed.
    Present(T),
    /// Stored but unparsable; already logged.
    Corrupt,
    /// The medium failed to return the value; already logged.
    Unreadable(StorageError),
}

impl<T> Document<T>
where
    T: Default,
{
    /// Parsed value, or empty for anything else.
    pub(crate) fn unwrap_or_default(self) -> T {
        match self {
            Self::Present(value) => value,
            Self::Absent | Self::Corrupt | Self::Unreadable(_) => T::default(),
        }
    }

    /// Value to modify and write back.
    ///
    /// A corrupt document is replaced, but one that could not be read may
    /// still hold data and must not be overwritten.
    pub(crate) fn into_writable(self) -> Result<T, Error> {
        match self {
            Self::Present(value) => Ok(value),
            Self::Absent | Self::Corrupt => Ok(T::default()),
            Self::Unreadable(error) => Err(map_storage_error(error)),
        }
    }
}

/// A JSON array decoded record by record.
///
/// Records that fail to decode are kept verbatim in `skipped` and written
/// back after the decoded ones, so one bad entry never erases the rest.
#[derive(Debug)]
pub(crate) struct Records<T> {
    pub(crate) valid: Vec<T>,
    pub(crate) skipped: Vec<Value>,
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self {
            valid: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Read and parse the document under `key`, logging failures.
pub(crate) fn read_document<S, T>(storage: &S, key: &str) -> Document<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Document::Absent,
        Err(error) => {
            warn!(key, error = %error, "failed to read persisted document");
            return Document::Unreadable(error);
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Document::Present(value),
        Err(error) => {
            warn!(key, error = %error, "persisted document is corrupt; treating as empty");
            Document::Corrupt
        }
    }
}

/// Read the JSON array under `key`, decoding each element on its own.
pub(crate) fn read_records<S, T>(storage: &S, key: &str) -> Document<Records<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let elements = match read_document::<_, Vec<Value>>(storage, key) {
        Document::Present(elements) => elements,
        Document::Absent => return Document::Absent,
        Document::Corrupt => return Document::Corrupt,
        Document::Unreadable(error) => return Document::Unreadable(error),
    };

    let mut records = Records::default();
    for (index, element) in elements.into_iter().enumerate() {
        match T::deserialize(&element) {
            Ok(record) => records.valid.push(record),
            Err(error) => {
                warn!(key, index, error = %error, "skipping undecodable record");
                records.skipped.push(element);
            }
        }
    }
    Document::Present(records)
}

/// Write `valid` followed by the untouched `skipped` records under `key`.
pub(crate) fn write_records<S, T>(
    storage: &S,
    key: &str,
    valid: &[T],
    skipped: &[Value],
) -> Result<(), Error>
where
    S: KeyValueStore + ?Sized,
    T: Serialize,
{
    let mut encoded = valid
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()
        .map_err(|err| Error::internal(format!("failed to serialise {key}: {err}")))?;
    encoded.extend(skipped.iter().cloned());
    write_document(storage, key, &encoded)
}

/// Serialise `value` and write it under `key`.
pub(crate) fn write_document<S, T>(storage: &S, key: &str, value: &T) -> Result<(), Error>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value)
        .map_err(|err| Error::internal(format!("failed to serialise {key}: {err}")))?;
    storage.set(key, &encoded).map_err(map_storage_error)
}

/// Remove the document under `key`.
pub(crate) fn remove_document<S>(storage: &S, key: &str) -> Result<(), Error>
where
    S: KeyValueStore + ?Sized,
{
    storage.remove(key).map_err(map_storage_error)
}

/// Map a port failure to a domain error.
pub(crate) fn map_storage_error(error: StorageError) -> Error {
    Error::storage(error.to_string())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the document helpers.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockKeyValueStore;
    use crate::outbound::MemoryKeyValueStore;
    use serde_json::json;

    #[test]
    fn missing_documents_are_absent() {
        let mut storage = MockKeyValueStore::new();
        storage.expect_get().returning(|_| Ok(None));
        let doc: Document<Vec<u32>> = read_document(&storage, keys::TICKETS);
        assert!(matches!(doc, Document::Absent));
    }

    #[test]
    fn unparsable_documents_are_corrupt() {
        let mut storage = MockKeyValueStore::new();
        storage
            .expect_get()
            .returning(|_| Ok(Some("{not json".to_owned())));
        let doc: Document<Vec<u32>> = read_document(&storage, keys::TICKETS);
        assert!(matches!(doc, Document::Corrupt));
        assert!(doc.unwrap_or_default().is_empty());
    }

    #[test]
    fn read_failures_are_unreadable_not_empty() {
        let mut storage = MockKeyValueStore::new();
        storage
            .expect_get()
            .returning(|key| Err(StorageError::read(key, "medium offline")));
        let doc: Document<Vec<u32>> = read_document(&storage, keys::USERS);
        assert!(matches!(doc, Document::Unreadable(_)));
        let err = doc.into_writable().expect_err("must not be overwritten");
        assert_eq!(err.code(), ErrorCode::StorageFailure);
    }

    #[test]
    fn corrupt_documents_are_writable_as_empty() {
        let doc: Document<Vec<u32>> = Document::Corrupt;
        assert_eq!(doc.into_writable().expect("writable"), Vec::<u32>::new());
    }

    #[test]
    fn bad_records_are_skipped_and_written_back() {
        let storage = MemoryKeyValueStore::with_entries([(
            keys::TICKETS,
            r#"[1, "two", 3]"#,
        )]);
        let Document::Present(mut records) = read_records::<_, u32>(&storage, keys::TICKETS)
        else {
            panic!("expected a parsed array");
        };
        assert_eq!(records.valid, vec![1, 3]);
        assert_eq!(records.skipped, vec![json!("two")]);

        records.valid.insert(0, 0);
        write_records(&storage, keys::TICKETS, &records.valid, &records.skipped)
            .expect("write back");
        assert_eq!(
            storage.get(keys::TICKETS).expect("read"),
            Some(r#"[0,1,3,"two"]"#.to_owned())
        );
    }

    #[test]
    fn write_failures_map_to_storage_errors() {
        let mut storage = MockKeyValueStore::new();
        storage
            .expect_set()
            .returning(|key, _| Err(StorageError::write(key, "quota exceeded")));
        let err = write_document(&storage, keys::TICKETS, &[1_u32, 2])
            .expect_err("write should fail");
        assert_eq!(err.code(), ErrorCode::StorageFailure);
        assert!(err.message().contains("quota exceeded"));
    }
}
