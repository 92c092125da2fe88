use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{read_object, write_json, StorageResult};

pub type UserId = u64;

/// Process-wide key/value settings.
pub trait OptionStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> StorageResult<()>;
    fn delete(&self, key: &str) -> StorageResult<()>;
}

/// Per-user key/value settings.
pub trait UserMetaStore {
    fn get(&self, user: UserId, key: &str) -> StorageResult<Option<Value>>;
    fn set(&self, user: UserId, key: &str, value: Value) -> StorageResult<()>;
}

/// One JSON object file holding every option.
#[derive(Debug, Clone)]
pub struct FileOptionStore {
    path: PathBuf,
}

impl FileOptionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OptionStore for FileOptionStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(read_object(&self.path)?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        let mut options = read_object(&self.path)?;
        options.insert(key.to_string(), value);
        write_json(&self.path, &options)?;
        tracing::debug!(key, path = %self.path.display(), "option written");
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        let mut options = read_object(&self.path)?;
        if options.shift_remove(key).is_some() {
            write_json(&self.path, &options)?;
            tracing::debug!(key, path = %self.path.display(), "option deleted");
        }
        Ok(())
    }
}

/// `{ "<user id>": { key: value } }` in one JSON file.
#[derive(Debug, Clone)]
pub struct FileUserMetaStore {
    path: PathBuf,
}

impl FileUserMetaStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl UserMetaStore for FileUserMetaStore {
    fn get(&self, user: UserId, key: &str) -> StorageResult<Option<Value>> {
        let users = read_object(&self.path)?;
        Ok(users
            .get(&user.to_string())
            .and_then(|meta| meta.get(key))
            .cloned())
    }

    fn set(&self, user: UserId, key: &str, value: Value) -> StorageResult<()> {
        let mut users = read_object(&self.path)?;
        let entry = users
            .entry(user.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(meta) = entry {
            meta.insert(key.to_string(), value);
        }
        write_json(&self.path, &users)
    }
}

#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    values: RefCell<Map<String, Value>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionStore for MemoryOptionStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        self.values.borrow_mut().shift_remove(key);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserMetaStore {
    values: RefCell<HashMap<(UserId, String), Value>>,
}

impl MemoryUserMetaStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserMetaStore for MemoryUserMetaStore {
    fn get(&self, user: UserId, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.values.borrow().get(&(user, key.to_string())).cloned())
    }

    fn set(&self, user: UserId, key: &str, value: Value) -> StorageResult<()> {
        self.values.borrow_mut().insert((user, key.to_string()), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::with_temp_root;
    use super::*;
    use serde_json::json;

    #[test]
    fn file_option_store_round_trips_and_deletes() {
        with_temp_root("options", |root| {
            let store = FileOptionStore::new(root.join("options.json"));
            assert_eq!(store.get("missing").unwrap(), None);

            store.set("elementor_scheme_color", json!({"Primary": "#1e73be"})).unwrap();
            store.set("other", json!(1)).unwrap();
            assert_eq!(
                store.get("elementor_scheme_color").unwrap(),
                Some(json!({"Primary": "#1e73be"}))
            );

            store.delete("elementor_scheme_color").unwrap();
            store.delete("never-set").unwrap();
            assert_eq!(store.get("elementor_scheme_color").unwrap(), None);
            assert_eq!(store.get("other").unwrap(), Some(json!(1)));
        });
    }

    #[test]
    fn file_user_meta_is_scoped_per_user() {
        with_temp_root("user-meta", |root| {
            let store = FileUserMetaStore::new(root.join("user_meta.json"));
            store.set(1, "edtm_last_active_section", json!("colors")).unwrap();
            store.set(2, "edtm_last_active_section", json!("fonts")).unwrap();

            assert_eq!(
                store.get(1, "edtm_last_active_section").unwrap(),
                Some(json!("colors"))
            );
            assert_eq!(store.get(3, "edtm_last_active_section").unwrap(), None);
        });
    }

    #[test]
    fn memory_stores_behave_like_file_stores() {
        let options = MemoryOptionStore::new();
        options.set("k", json!("v")).unwrap();
        assert_eq!(options.get("k").unwrap(), Some(json!("v")));
        options.delete("k").unwrap();
        assert_eq!(options.get("k").unwrap(), None);

        let meta = MemoryUserMetaStore::new();
        meta.set(7, "k", json!(true)).unwrap();
        assert_eq!(meta.get(7, "k").unwrap(), Some(json!(true)));
        assert_eq!(meta.get(8, "k").unwrap(), None);
    }
}
