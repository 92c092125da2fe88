//! File-backed persistence for the option store, user meta and host
//! documents, plus in-memory twins for tests and embedding.

mod documents;
mod options;

pub use documents::{
    DocumentId, DocumentStore, FileDocumentStore, HostDocument, MemoryDocumentStore,
    KIT_TEMPLATE_TYPE,
};
pub use options::{
    FileOptionStore, FileUserMetaStore, MemoryOptionStore, MemoryUserMetaStore, OptionStore,
    UserId, UserMetaStore,
};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

const APP_DIR: &str = "design-tokens";
const OPTIONS_FILE: &str = "options.json";
const USER_META_FILE: &str = "user_meta.json";
const DOCUMENTS_SUBDIR: &str = "documents";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("expected a JSON object in {path}")]
    NotAnObject { path: PathBuf },
    #[error("failed to encode value")]
    Encode(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Resolves where every store lives under one data directory.
#[derive(Debug, Clone)]
pub struct StorageService {
    data_dir: PathBuf,
}

impl StorageService {
    pub const fn with_paths(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn with_default_paths() -> StorageResult<Self> {
        let (xdg_data_home, home) = data_env_dirs();
        let data_dir = default_data_dir(xdg_data_home.as_deref(), home.as_deref())?;
        Ok(Self::with_paths(data_dir))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn options(&self) -> FileOptionStore {
        FileOptionStore::new(self.data_dir.join(OPTIONS_FILE))
    }

    pub fn user_meta(&self) -> FileUserMetaStore {
        FileUserMetaStore::new(self.data_dir.join(USER_META_FILE))
    }

    pub fn documents(&self) -> FileDocumentStore {
        FileDocumentStore::new(self.data_dir.join(DOCUMENTS_SUBDIR))
    }
}

fn data_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn default_data_dir(
    xdg_data_home: Option<&Path>,
    home: Option<&Path>,
) -> StorageResult<PathBuf> {
    if let Some(xdg) = xdg_data_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.join(APP_DIR));
    }
    let home = home.ok_or(StorageError::MissingHomeDirectory)?;
    Ok(home.join(".local").join("share").join(APP_DIR))
}

/// Reads a JSON object file. A missing or blank file reads as empty.
fn read_object(path: &Path) -> StorageResult<Map<String, Value>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(StorageError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Pretty-prints `value` to a sibling temp file and renames it into place.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let write_err = |source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let serialized = serde_json::to_string_pretty(value)?;
    let staging = path.with_extension("json.tmp");
    fs::write(&staging, serialized).map_err(write_err)?;
    fs::rename(&staging, path).map_err(write_err)?;
    Ok(())
}
