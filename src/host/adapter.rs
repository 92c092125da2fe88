use crate::kit::{KitCollections, SettingKind};
use crate::storage::{DocumentId, DocumentStore, HostDocument};

use super::{HostResult, KitApi};

/// One way of reading and writing a kit document's collections.
pub trait KitAdapter {
    fn label(&self) -> &'static str;
    fn read(&self, kit: DocumentId) -> HostResult<KitCollections>;
    /// Replaces both collections in a single document write.
    fn write(&self, kit: DocumentId, collections: KitCollections) -> HostResult<()>;
}

pub struct ApiAdapter<'a> {
    api: &'a dyn KitApi,
}

impl<'a> ApiAdapter<'a> {
    pub fn new(api: &'a dyn KitApi) -> Self {
        Self { api }
    }
}

impl KitAdapter for ApiAdapter<'_> {
    fn label(&self) -> &'static str {
        "api"
    }

    fn read(&self, kit: DocumentId) -> HostResult<KitCollections> {
        Ok(KitCollections {
            colors: self.api.get_settings(kit, SettingKind::CustomColors)?,
            fonts: self.api.get_settings(kit, SettingKind::CustomTypography)?,
        })
    }

    fn write(&self, kit: DocumentId, collections: KitCollections) -> HostResult<()> {
        self.api
            .set_settings(kit, SettingKind::CustomColors, collections.colors)?;
        self.api
            .set_settings(kit, SettingKind::CustomTypography, collections.fonts)?;
        self.api.save(kit)
    }
}

/// Edits `page_settings` on the stored document directly.
pub struct MetaAdapter<'a> {
    documents: &'a dyn DocumentStore,
}

impl<'a> MetaAdapter<'a> {
    pub fn new(documents: &'a dyn DocumentStore) -> Self {
        Self { documents }
    }
}

impl KitAdapter for MetaAdapter<'_> {
    fn label(&self) -> &'static str {
        "meta"
    }

    fn read(&self, kit: DocumentId) -> HostResult<KitCollections> {
        Ok(self
            .documents
            .load(kit)?
            .map(|document| KitCollections::from_page_settings(&document.page_settings))
            .unwrap_or_default())
    }

    fn write(&self, kit: DocumentId, collections: KitCollections) -> HostResult<()> {
        let mut document = self.documents.load(kit)?.unwrap_or_else(HostDocument::kit);
        collections.write_into(&mut document.page_settings);
        self.documents.store(kit, &document)?;
        Ok(())
    }
}
