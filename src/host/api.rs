use std::cell::RefCell;

use crate::kit::{records_from_value, records_to_value, KitRecord, SettingKind};
use crate::storage::{DocumentId, DocumentStore, HostDocument, OptionStore};

use super::{positive_id, HostError, HostResult, ACTIVE_KIT_OPTION};

/// The host's own kit API. Setting changes are staged until `save`.
pub trait KitApi {
    fn active_kit(&self) -> HostResult<Option<DocumentId>>;
    fn get_settings(&self, kit: DocumentId, kind: SettingKind) -> HostResult<Vec<KitRecord>>;
    fn set_settings(
        &self,
        kit: DocumentId,
        kind: SettingKind,
        records: Vec<KitRecord>,
    ) -> HostResult<()>;
    fn save(&self, kit: DocumentId) -> HostResult<()>;
}

/// Kit API over the same stores the host persists to. The active kit is the
/// one the active-kit option names, provided that document exists.
pub struct StoreKitApi<'a> {
    documents: &'a dyn DocumentStore,
    options: &'a dyn OptionStore,
    staged: RefCell<Option<(DocumentId, HostDocument)>>,
}

impl<'a> StoreKitApi<'a> {
    pub fn new(documents: &'a dyn DocumentStore, options: &'a dyn OptionStore) -> Self {
        Self {
            documents,
            options,
            staged: RefCell::new(None),
        }
    }

    fn document(&self, kit: DocumentId) -> HostResult<HostDocument> {
        if let Some((id, document)) = self.staged.borrow().as_ref() {
            if *id == kit {
                return Ok(document.clone());
            }
        }
        self.documents
            .load(kit)?
            .ok_or_else(|| HostError::Api(format!("kit document {kit} does not exist")))
    }
}

impl KitApi for StoreKitApi<'_> {
    fn active_kit(&self) -> HostResult<Option<DocumentId>> {
        let Some(id) = self
            .options
            .get(ACTIVE_KIT_OPTION)?
            .as_ref()
            .and_then(positive_id)
        else {
            return Ok(None);
        };
        Ok(self.documents.load(id)?.map(|_| id))
    }

    fn get_settings(&self, kit: DocumentId, kind: SettingKind) -> HostResult<Vec<KitRecord>> {
        let document = self.document(kit)?;
        Ok(document
            .page_settings
            .get(kind.key())
            .cloned()
            .map(records_from_value)
            .unwrap_or_default())
    }

    fn set_settings(
        &self,
        kit: DocumentId,
        kind: SettingKind,
        records: Vec<KitRecord>,
    ) -> HostResult<()> {
        let mut document = self.document(kit)?;
        document
            .page_settings
            .insert(kind.key().to_string(), records_to_value(records));
        *self.staged.borrow_mut() = Some((kit, document));
        Ok(())
    }

    fn save(&self, kit: DocumentId) -> HostResult<()> {
        let staged = self.staged.borrow_mut().take();
        match staged {
            Some((id, document)) if id == kit => {
                self.documents.store(id, &document)?;
                Ok(())
            }
            Some((id, _)) => Err(HostError::Api(format!(
                "staged changes belong to kit {id}, not {kit}"
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryDocumentStore, MemoryOptionStore};
    use serde_json::json;

    #[test]
    fn active_kit_requires_an_existing_document() {
        let documents = MemoryDocumentStore::new().with_document(2, HostDocument::kit());
        let options = MemoryOptionStore::new();
        let api = StoreKitApi::new(&documents, &options);
        assert_eq!(api.active_kit().unwrap(), None);

        options.set(ACTIVE_KIT_OPTION, json!(7)).unwrap();
        assert_eq!(api.active_kit().unwrap(), None);

        options.set(ACTIVE_KIT_OPTION, json!(2)).unwrap();
        assert_eq!(api.active_kit().unwrap(), Some(2));
    }

    #[test]
    fn settings_are_staged_until_save() {
        let documents = MemoryDocumentStore::new().with_document(2, HostDocument::kit());
        let options = MemoryOptionStore::new();
        let api = StoreKitApi::new(&documents, &options);
        let record = json!({"_id": "c1", "title": "Primary", "color": "#111"})
            .as_object()
            .cloned()
            .unwrap();

        api.set_settings(2, SettingKind::CustomColors, vec![record.clone()])
            .unwrap();
        assert_eq!(api.get_settings(2, SettingKind::CustomColors).unwrap(), vec![record]);
        assert!(documents.load(2).unwrap().unwrap().page_settings.is_empty());

        api.save(2).unwrap();
        let stored = documents.load(2).unwrap().unwrap();
        assert_eq!(stored.page_settings["custom_colors"][0]["title"], json!("Primary"));
    }

    #[test]
    fn missing_kit_is_an_api_error() {
        let documents = MemoryDocumentStore::new();
        let options = MemoryOptionStore::new();
        let api = StoreKitApi::new(&documents, &options);
        assert!(matches!(
            api.get_settings(4, SettingKind::CustomTypography),
            Err(HostError::Api(_))
        ));
    }
}
