//! Directory-backed key-value medium.
//!
//! Each key maps to `<key>.json` inside one directory opened through
//! `cap-std`, so the adapter cannot reach outside it.

mod atomic_io;

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use crate::domain::ports::{KeyValueStore, StorageError};

const FILE_EXTENSION: &str = "json";

/// [`KeyValueStore`] persisting one JSON file per key.
///
/// # Examples
/// ```
/// use camino::Utf8Path;
/// use ticket_desk::domain::ports::KeyValueStore;
/// use ticket_desk::outbound::FileKeyValueStore;
///
/// let tmp = tempfile::tempdir()?;
/// let root = Utf8Path::from_path(tmp.path()).ok_or("non UTF-8 temp dir")?;
/// let store = FileKeyValueStore::open(root)?;
/// store.set("ticketapp_session", "{}")?;
/// assert_eq!(store.get("ticketapp_session")?, Some("{}".to_owned()));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct FileKeyValueStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl FileKeyValueStore {
    /// Open `root`, creating it and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the directory cannot be
    /// created or opened.
    pub fn open(root: &Utf8Path) -> Result<Self, StorageError> {
        let unavailable =
            |err: io::Error| StorageError::unavailable(format!("{root}: {err}"));
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(unavailable)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(unavailable)?;
        debug!(root = %root, "opened file store");
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Map a key to its file name, rejecting anything but a plain name.
fn file_name(key: &str) -> Result<String, StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(format!("{key}.{FILE_EXTENSION}"))
    } else {
        Err(StorageError::invalid_key(key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let name = file_name(key)?;
        match self.dir.read_to_string(&name) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::read(key, err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let name = file_name(key)?;
        atomic_io::replace_file(&self.dir, &name, value)
            .map_err(|err| StorageError::write(key, err.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let name = file_name(key)?;
        match self.dir.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::write(key, err.to_string())),
        }
    }
}
