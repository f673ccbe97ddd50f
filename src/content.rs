//! Content Module
//!
//! In-process document store holding the site's collections. Route handlers
//! read through the cache and invalidate it after every write.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{AppError, Result};

// == Collection ==
/// Content collections managed by the admin panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Pages,
    Projects,
    Services,
    Team,
    Customers,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Pages,
        Collection::Projects,
        Collection::Services,
        Collection::Team,
        Collection::Customers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Pages => "pages",
            Collection::Projects => "projects",
            Collection::Services => "services",
            Collection::Team => "team",
            Collection::Customers => "customers",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown collection: {s}")))
    }
}

// == Content Store ==
/// Documents per collection, ordered by id.
#[derive(Debug, Default)]
pub struct ContentStore {
    documents: RwLock<HashMap<Collection, BTreeMap<String, Value>>>,
}

impl ContentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from a seed object of `collection -> [documents]`.
    pub fn from_seed(seed: HashMap<Collection, Vec<Value>>) -> Result<Self> {
        let mut documents: HashMap<Collection, BTreeMap<String, Value>> = HashMap::new();
        for (collection, docs) in seed {
            let entries = documents.entry(collection).or_default();
            for doc in docs {
                let id = document_id(&doc)?;
                entries.insert(id, doc);
            }
        }
        Ok(Self {
            documents: RwLock::new(documents),
        })
    }

    /// Loads a seed file written as a JSON object keyed by collection name.
    pub fn load_seed_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let seed: HashMap<Collection, Vec<Value>> = serde_json::from_str(&raw)?;
        let store = Self::from_seed(seed)?;
        info!("Content seeded from {}", path.display());
        Ok(store)
    }

    /// Returns every document of `collection`, ordered by id.
    pub async fn list(&self, collection: Collection) -> Vec<Value> {
        let documents = self.documents.read().await;
        documents
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns one document.
    pub async fn get(&self, collection: Collection, id: &str) -> Result<Value> {
        let documents = self.documents.read().await;
        documents
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("{collection}/{id}")))
    }

    /// Inserts or replaces a document. Returns its id.
    pub async fn upsert(&self, collection: Collection, doc: Value) -> Result<String> {
        let id = document_id(&doc)?;
        let mut documents = self.documents.write().await;
        documents
            .entry(collection)
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    /// Removes a document.
    pub async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents
            .get_mut(&collection)
            .and_then(|docs| docs.remove(id))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("{collection}/{id}")))
    }

    /// Number of documents per collection.
    pub async fn counts(&self) -> BTreeMap<Collection, usize> {
        let documents = self.documents.read().await;
        Collection::ALL
            .into_iter()
            .map(|c| (c, documents.get(&c).map_or(0, BTreeMap::len)))
            .collect()
    }
}

/// Documents must be JSON objects with a non-empty string `id`.
fn document_id(doc: &Value) -> Result<String> {
    if !doc.is_object() {
        return Err(AppError::InvalidRequest(
            "Document must be a JSON object".to_string(),
        ));
    }
    match doc.get("id").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => Ok(id.to_string()),
        _ => Err(AppError::InvalidRequest(
            "Document requires a non-empty string 'id'".to_string(),
        )),
    }
}
