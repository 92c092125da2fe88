use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{read_object, write_json, StorageError, StorageResult};

pub type DocumentId = u64;

/// Template type the host assigns to its site-settings kit documents.
pub const KIT_TEMPLATE_TYPE: &str = "kit";

/// A host document's metadata: its template type and page settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostDocument {
    #[serde(default)]
    pub template_type: String,
    #[serde(default)]
    pub page_settings: Map<String, Value>,
}

impl HostDocument {
    pub fn kit() -> Self {
        Self {
            template_type: KIT_TEMPLATE_TYPE.to_string(),
            page_settings: Map::new(),
        }
    }

    pub fn is_kit(&self) -> bool {
        self.template_type == KIT_TEMPLATE_TYPE
    }
}

/// Low-level document metadata, keyed by numeric document id.
pub trait DocumentStore {
    fn load(&self, id: DocumentId) -> StorageResult<Option<HostDocument>>;
    fn store(&self, id: DocumentId, document: &HostDocument) -> StorageResult<()>;
    /// Every known id, ascending.
    fn ids(&self) -> StorageResult<Vec<DocumentId>>;
}

/// `documents/<id>.json`, one file per document.
#[derive(Debug, Clone)]
pub struct FileDocumentStore {
    dir: PathBuf,
}

impl FileDocumentStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: DocumentId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl DocumentStore for FileDocumentStore {
    fn load(&self, id: DocumentId) -> StorageResult<Option<HostDocument>> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let object = read_object(&path)?;
        let document = serde_json::from_value(Value::Object(object))
            .map_err(|source| StorageError::Parse { path, source })?;
        Ok(Some(document))
    }

    fn store(&self, id: DocumentId, document: &HostDocument) -> StorageResult<()> {
        let path = self.path_for(id);
        write_json(&path, document)?;
        tracing::debug!(id, path = %path.display(), "document written");
        Ok(())
    }

    fn ids(&self) -> StorageResult<Vec<DocumentId>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Read {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(|stem| stem.parse::<DocumentId>().ok())
            {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RefCell<BTreeMap<DocumentId, HostDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, id: DocumentId, document: HostDocument) -> Self {
        self.documents.borrow_mut().insert(id, document);
        self
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, id: DocumentId) -> StorageResult<Option<HostDocument>> {
        Ok(self.documents.borrow().get(&id).cloned())
    }

    fn store(&self, id: DocumentId, document: &HostDocument) -> StorageResult<()> {
        self.documents.borrow_mut().insert(id, document.clone());
        Ok(())
    }

    fn ids(&self) -> StorageResult<Vec<DocumentId>> {
        Ok(self.documents.borrow().keys().copied().collect())
    }
}
