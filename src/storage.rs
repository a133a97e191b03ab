use crate::models::Cart;
use log::warn;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

/// Keys every mirrored cart line must carry.
const CART_ITEM_KEYS: [&str; 6] = ["name", "quantity", "price", "imageUrl", "sku_id", "slug"];

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to access storage file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode storage entry: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key/value store with the semantics of the browser's `localStorage`.
pub trait Storage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Change notification delivered when another tab writes the same storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object file.
///
/// The whole file is read on every access and rewritten on every change.
/// A missing file or one holding invalid JSON behaves as empty storage;
/// any other read failure is returned by the writes, which leave the file
/// untouched.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileStorage {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!("ignoring corrupt storage file {}: {}", self.path.display(), e);
                Ok(HashMap::new())
            }
        }
    }

    fn write_all(&self, items: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(items)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut items) => items.remove(key),
            Err(e) => {
                warn!("failed to read storage file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Last-known cart kept in storage under a fixed key, so the floating cart
/// can render before the first fetch completes.
#[derive(Clone)]
pub struct CartMirror {
    storage: Rc<dyn Storage>,
    key: String,
}

impl CartMirror {
    pub fn new(storage: Rc<dyn Storage>, key: impl Into<String>) -> Self {
        CartMirror {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        self.storage.set_item(&self.key, &json)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)
    }

    /// The mirrored cart, or `None` if absent or not shaped like a cart.
    pub fn load(&self) -> Option<Cart> {
        let raw = self.storage.get_item(&self.key)?;
        Self::decode(&raw)
    }

    /// Checks the mirror's shape before trusting it: an object with a numeric
    /// `order_price` and an `items` array whose entries carry every cart line
    /// key.
    pub fn decode(raw: &str) -> Option<Cart> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("discarding unparsable cart mirror: {}", e);
                return None;
            }
        };

        let shaped = value.get("order_price").is_some_and(Value::is_number)
            && value
                .get("items")
                .and_then(Value::as_array)
                .is_some_and(|items| {
                    items.iter().all(|item| {
                        item.as_object()
                            .is_some_and(|obj| CART_ITEM_KEYS.iter().all(|k| obj.contains_key(*k)))
                    })
                });

        if !shaped {
            warn!("discarding cart mirror with unexpected shape");
            return None;
        }

        serde_json::from_value(value)
            .map_err(|e| warn!("discarding cart mirror: {}", e))
            .ok()
    }
}
