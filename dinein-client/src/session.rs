//! Dining session persistence
//!
//! The guest's dining session and cart survive restarts through a
//! [`SessionStore`]. Older clients wrote the session under `tableSession`
//! with a smaller shape; [`SessionResolver`] still reads it and migrates it
//! to the unified key.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared::models::{Customization, OrderItemInput};
use shared::money::{OrderTotals, TaxConfig, order_totals};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Unified storage key of the dining session
pub const SESSION_KEY: &str = "dining_session";
/// Key written by older clients
pub const LEGACY_SESSION_KEY: &str = "tableSession";
pub const CART_KEY: &str = "cart";

/// String key/value storage
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> ClientResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> ClientResult<()>;
    fn remove(&self, key: &str) -> ClientResult<()>;
}

/// Read and decode a JSON value; malformed content counts as absent
pub fn load_json<T: DeserializeOwned>(store: &dyn SessionStore, key: &str) -> ClientResult<Option<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored value");
            Ok(None)
        }
    }
}

pub fn save_json<T: Serialize>(store: &dyn SessionStore, key: &str, value: &T) -> ClientResult<()> {
    store.set(key, &serde_json::to_string(value)?)
}

// ============================================================================
// Stores
// ============================================================================

/// Process-local store
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ClientResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| ClientError::Storage(std::io::Error::other("session store poisoned")))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Store kept as one JSON object file
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FileSessionStore {
    /// Store named `name` under `dir` (`{dir}/{name}.json`)
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", name)),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Store named `name` under the configured session directory
    pub fn from_config(config: &ClientConfig, name: &str) -> Self {
        Self::new(&config.session_dir, name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> ClientResult<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Corrupt session file, starting empty");
                HashMap::new()
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, values: &HashMap<String, String>) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> ClientResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ClientError::Storage(std::io::Error::other("session file lock poisoned")))?;
        let mut values = self.read_all()?;
        f(&mut values);
        self.write_all(&values)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

// ============================================================================
// Session and cart
// ============================================================================

/// The guest's seat at a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningSession {
    pub session_id: String,
    pub table_id: String,
    pub restaurant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_name: Option<String>,
}

/// Shape written under [`LEGACY_SESSION_KEY`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTableSession {
    id: String,
    table_id: String,
    restaurant_id: String,
}

impl From<LegacyTableSession> for DiningSession {
    fn from(legacy: LegacyTableSession) -> Self {
        Self {
            session_id: legacy.id,
            table_id: legacy.table_id,
            restaurant_id: legacy.restaurant_id,
            session_code: None,
            guest_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub menu_item_id: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<Customization>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl CartItem {
    fn effective_unit_price(&self) -> f64 {
        self.unit_price
            + self
                .customizations
                .iter()
                .map(|c| c.price_modifier)
                .sum::<f64>()
    }

    fn same_line(&self, other: &CartItem) -> bool {
        self.menu_item_id == other.menu_item_id
            && self.customizations == other.customizations
            && self.note == other.note
    }
}

/// Items picked but not yet ordered
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn load(store: &dyn SessionStore) -> ClientResult<Self> {
        Ok(load_json(store, CART_KEY)?.unwrap_or_default())
    }

    pub fn save(&self, store: &dyn SessionStore) -> ClientResult<()> {
        save_json(store, CART_KEY, self)
    }

    /// Add an item, merging with an identical line
    pub fn add(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|i| i.same_line(&item)) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(item.quantity),
            None => self.items.push(item),
        }
    }

    /// Set the quantity of line `index`; zero removes it
    pub fn set_quantity(&mut self, index: usize, quantity: u32) {
        if quantity == 0 {
            if index < self.items.len() {
                self.items.remove(index);
            }
        } else if let Some(item) = self.items.get_mut(index) {
            item.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |count, i| count.saturating_add(i.quantity))
    }

    pub fn totals(&self, tax: &TaxConfig) -> OrderTotals {
        order_totals(
            self.items
                .iter()
                .map(|i| (i.effective_unit_price(), i.quantity)),
            tax,
        )
    }

    /// Line items for an order placement request
    pub fn to_order_items(&self) -> Vec<OrderItemInput> {
        self.items
            .iter()
            .map(|i| OrderItemInput {
                menu_item_id: i.menu_item_id.clone(),
                quantity: i.quantity,
                customizations: i.customizations.clone(),
                note: i.note.clone(),
            })
            .collect()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Finds the current dining session across storage tiers
///
/// Lookup order: in-memory, unified key, legacy key.
pub struct SessionResolver {
    store: Arc<dyn SessionStore>,
    current: Option<DiningSession>,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self {
            store,
            current: None,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn resolve(&mut self) -> ClientResult<DiningSession> {
        if let Some(session) = &self.current {
            return Ok(session.clone());
        }

        if let Some(session) = load_json::<DiningSession>(self.store.as_ref(), SESSION_KEY)? {
            self.current = Some(session.clone());
            return Ok(session);
        }

        if let Some(legacy) = load_json::<LegacyTableSession>(self.store.as_ref(), LEGACY_SESSION_KEY)? {
            let session = DiningSession::from(legacy);
            tracing::info!(session_id = %session.session_id, "Migrating legacy table session");
            save_json(self.store.as_ref(), SESSION_KEY, &session)?;
            self.current = Some(session.clone());
            return Ok(session);
        }

        Err(ClientError::SessionMissing)
    }

    /// Remember a newly joined session
    pub fn set(&mut self, session: DiningSession) -> ClientResult<()> {
        save_json(self.store.as_ref(), SESSION_KEY, &session)?;
        self.current = Some(session);
        Ok(())
    }

    /// Forget the session in every tier, including its cart
    pub fn clear(&mut self) -> ClientResult<()> {
        self.current = None;
        self.store.remove(SESSION_KEY)?;
        self.store.remove(LEGACY_SESSION_KEY)?;
        self.store.remove(CART_KEY)?;
        Ok(())
    }
}
