//! Persisted parameters
//!
//! Storage layout:
//! ```text
//! <params_dir>/
//! ├── DongleId
//! ├── AccessToken
//! ├── Version
//! └── ...            # one file per key, raw UTF-8 value
//! ```
//!
//! Every write goes through a `.tmp_<key>` file followed by a rename, so a
//! reader sees either the old value or the new one.

use crate::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Well-known parameter names
pub mod keys {
    pub const DONGLE_ID: &str = "DongleId";
    pub const ACCESS_TOKEN: &str = "AccessToken";
    pub const VERSION: &str = "Version";
    pub const TERMS_VERSION: &str = "TermsVersion";
    pub const TRAINING_VERSION: &str = "TrainingVersion";
    pub const GIT_COMMIT: &str = "GitCommit";
    pub const GIT_BRANCH: &str = "GitBranch";
    pub const GIT_REMOTE: &str = "GitRemote";
    pub const SUBSCRIBER_INFO: &str = "SubscriberInfo";
}

/// Key/value parameter storage
pub trait ParamsStore {
    /// Read a parameter, `None` when it was never written
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a single parameter
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Write several parameters together
    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        for (key, value) in entries {
            self.put(key, value)?;
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidKey(key.to_string()))
    }
}

/// Directory backed parameter store
#[derive(Debug, Clone)]
pub struct FileParams {
    dir: PathBuf,
}

impl FileParams {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn tmp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".tmp_{}", key))
    }

    fn stage(&self, key: &str, value: &[u8]) -> Result<PathBuf> {
        validate_key(key)?;
        let tmp = self.tmp_path_for(key);
        let mut file = fs::File::create(&tmp)?;
        file.write_all(value)?;
        file.sync_all()?;
        Ok(tmp)
    }

    /// Put back the values `applied` keys held before a failed `put_all`
    fn restore(&self, applied: &[(&str, PathBuf)], previous: &[Option<Vec<u8>>]) {
        for ((key, _), old) in applied.iter().zip(previous) {
            let path = self.path_for(key);
            let restored = match old {
                Some(bytes) => self
                    .stage(key, bytes)
                    .and_then(|tmp| fs::rename(tmp, &path).map_err(Error::from)),
                None => fs::remove_file(&path).map_err(Error::from),
            };
            if let Err(e) = restored {
                tracing::error!(key = *key, error = %e, "failed to restore param");
            }
        }
    }
}

fn discard(staged: &[(&str, PathBuf)]) {
    for (_, tmp) in staged {
        let _ = fs::remove_file(tmp);
    }
}

impl ParamsStore for FileParams {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        match fs::read(self.path_for(key)) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| Error::NotUtf8(key.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let tmp = self.stage(key, value.as_bytes())?;
        fs::rename(tmp, self.path_for(key))?;
        tracing::debug!(key, "param written");
        Ok(())
    }

    /// All values are staged before any of them is renamed into place. A
    /// failed stage or rename leaves the previous values in place.
    fn put_all(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut staged = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match self.stage(key, value.as_bytes()) {
                Ok(tmp) => staged.push((*key, tmp)),
                Err(e) => {
                    discard(&staged);
                    return Err(e);
                }
            }
        }

        let mut previous = Vec::with_capacity(staged.len());
        for (key, _) in &staged {
            match fs::read(self.path_for(key)) {
                Ok(bytes) => previous.push(Some(bytes)),
                Err(e) if e.kind() == ErrorKind::NotFound => previous.push(None),
                Err(e) => {
                    discard(&staged);
                    return Err(e.into());
                }
            }
        }

        for (i, (key, tmp)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(tmp, self.path_for(key)) {
                discard(&staged[i..]);
                self.restore(&staged[..i], &previous[..i]);
                return Err(e.into());
            }
        }
        Ok(())
    }
}

/// In-memory parameter store
#[derive(Debug, Default)]
pub struct MemoryParams {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with initial values
    pub fn with(entries: &[(&str, &str)]) -> Self {
        let values = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            values: Mutex::new(values),
        }
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> HashMap<String, String> {
        match self.values.lock() {
            Ok(values) => values.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ParamsStore for MemoryParams {
    fn get(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Io(std::io::Error::other("params lock poisoned")))?;
        Ok(values.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Io(std::io::Error::other("params lock poisoned")))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
