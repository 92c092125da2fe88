//! Access to the host's active kit document.
//!
//! Two adapters exist: the host's rich kit API, when it is offered, and a
//! low-level adapter that edits the document's page-settings metadata
//! directly. One is picked per operation; when an API call fails the whole
//! operation is re-run on the metadata adapter.

mod adapter;
mod api;

pub use adapter::{ApiAdapter, KitAdapter, MetaAdapter};
pub use api::{KitApi, StoreKitApi};

use serde_json::Value;
use thiserror::Error;

use crate::kit::KitCollections;
use crate::storage::{DocumentId, DocumentStore, OptionStore, StorageError};

/// Option naming the active kit document.
pub const ACTIVE_KIT_OPTION: &str = "elementor_active_kit";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("kit api call failed: {0}")]
    Api(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Result of a write attempt that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Success,
    /// No active kit document could be identified.
    Queued,
}

impl SyncStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Queued => "queued",
        }
    }
}

/// Entry point for kit reads and writes.
pub struct KitHost<'a> {
    api: Option<&'a dyn KitApi>,
    documents: &'a dyn DocumentStore,
    options: &'a dyn OptionStore,
}

impl<'a> KitHost<'a> {
    pub fn new(
        api: Option<&'a dyn KitApi>,
        documents: &'a dyn DocumentStore,
        options: &'a dyn OptionStore,
    ) -> Self {
        Self {
            api,
            documents,
            options,
        }
    }

    /// Active kit id: API, then the active-kit option, then the first
    /// document whose template type is `kit`.
    pub fn active_kit_id(&self) -> HostResult<Option<DocumentId>> {
        if let Some(api) = self.api {
            match api.active_kit() {
                Ok(Some(id)) if id > 0 => return Ok(Some(id)),
                Ok(_) => {}
                Err(err) => tracing::warn!(%err, "kit api could not resolve the active kit"),
            }
        }

        if let Some(id) = self.options.get(ACTIVE_KIT_OPTION)?.as_ref().and_then(positive_id) {
            return Ok(Some(id));
        }

        for id in self.documents.ids()? {
            if self.documents.load(id)?.is_some_and(|document| document.is_kit()) {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }

    fn meta_adapter(&self) -> MetaAdapter<'a> {
        MetaAdapter::new(self.documents)
    }

    /// The API adapter and the kit it names, when the API is present and
    /// reports an active kit.
    fn api_adapter(&self) -> Option<(ApiAdapter<'a>, DocumentId)> {
        let api = self.api?;
        match api.active_kit() {
            Ok(Some(id)) if id > 0 => Some((ApiAdapter::new(api), id)),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(%err, "kit api unavailable; using document metadata");
                None
            }
        }
    }

    /// Both collections of the active kit, or `None` when there is none.
    pub fn read(&self) -> HostResult<Option<KitCollections>> {
        if let Some((adapter, id)) = self.api_adapter() {
            match adapter.read(id) {
                Ok(collections) => return Ok(Some(collections)),
                Err(err) => tracing::warn!(%err, "kit api read failed; using document metadata"),
            }
        }
        match self.active_kit_id()? {
            Some(id) => Ok(Some(self.meta_adapter().read(id)?)),
            None => Ok(None),
        }
    }

    /// Read-modify-write of both collections. `update` receives the current
    /// collections and returns the replacement; it may run twice when the
    /// API attempt fails.
    pub fn apply<F>(&self, mut update: F) -> HostResult<SyncStatus>
    where
        F: FnMut(&KitCollections) -> KitCollections,
    {
        if let Some((adapter, id)) = self.api_adapter() {
            match run(&adapter, id, &mut update) {
                Ok(()) => return Ok(SyncStatus::Success),
                Err(err) => {
                    tracing::warn!(%err, adapter = adapter.label(), "kit write failed; retrying on document metadata");
                }
            }
        }

        let Some(id) = self.active_kit_id()? else {
            tracing::info!("no active kit document; write queued");
            return Ok(SyncStatus::Queued);
        };
        let adapter = self.meta_adapter();
        run(&adapter, id, &mut update)?;
        Ok(SyncStatus::Success)
    }
}

fn run<A, F>(adapter: &A, id: DocumentId, update: &mut F) -> HostResult<()>
where
    A: KitAdapter,
    F: FnMut(&KitCollections) -> KitCollections,
{
    let current = adapter.read(id)?;
    let next = update(&current);
    let (colors, fonts) = (next.colors.len(), next.fonts.len());
    adapter.write(id, next)?;
    tracing::info!(adapter = adapter.label(), kit = id, colors, fonts, "kit settings written");
    Ok(())
}

fn positive_id(value: &Value) -> Option<DocumentId> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}
