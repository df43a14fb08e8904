//! In-memory provider
//!
//! Backs offline runs (`--fixtures`) and tests. Updates are shallow-merged
//! into the stored record and every update call is recorded.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::debug;

use super::{ListPage, Pagination, ResourceProvider};
use crate::error::{Error, Result};

/// A recorded update request
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCall {
    pub resource: String,
    pub id: i64,
    pub patch: Value,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: BTreeMap<String, BTreeMap<i64, Value>>,
    updates: Vec<UpdateCall>,
    fetches: usize,
    update_failures: VecDeque<String>,
    fetch_failures: VecDeque<String>,
}

/// Resource provider over an in-memory record store
#[derive(Debug, Default)]
pub struct MemoryProvider {
    state: Mutex<MemoryState>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a resource with records; each needs an integer `id`
    pub fn with_records(self, resource: &str, records: Vec<Value>) -> Result<Self> {
        let mut state = self.state.into_inner();
        let table = state.records.entry(resource.to_string()).or_default();
        for record in records {
            let id = record_id(&record)?;
            table.insert(id, record);
        }
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Parse fixtures shaped as `{"<resource>": [<record>, ...], ...}`
    pub fn from_fixtures_str(json: &str) -> Result<Self> {
        let fixtures: Map<String, Value> = serde_json::from_str(json)?;
        let mut provider = Self::new();
        for (resource, records) in fixtures {
            let Value::Array(records) = records else {
                return Err(Error::InvalidInput(format!(
                    "fixtures for '{}' must be an array",
                    resource
                )));
            };
            provider = provider.with_records(&resource, records)?;
        }
        Ok(provider)
    }

    /// Load fixtures from a JSON file
    pub fn from_fixtures_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading fixtures");
        let contents = fs::read_to_string(path)?;
        Self::from_fixtures_str(&contents)
    }

    /// Make the next update fail with a rejection carrying `message`
    pub async fn fail_next_update(&self, message: impl Into<String>) {
        self.state
            .lock()
            .await
            .update_failures
            .push_back(message.into());
    }

    /// Make the next fetch fail with a server error carrying `message`
    pub async fn fail_next_fetch(&self, message: impl Into<String>) {
        self.state
            .lock()
            .await
            .fetch_failures
            .push_back(message.into());
    }

    /// Every update request received so far, in order
    pub async fn update_calls(&self) -> Vec<UpdateCall> {
        self.state.lock().await.updates.clone()
    }

    /// Number of single-record fetches received so far
    pub async fn fetch_count(&self) -> usize {
        self.state.lock().await.fetches
    }

    /// Current stored record
    pub async fn record(&self, resource: &str, id: i64) -> Option<Value> {
        self.state
            .lock()
            .await
            .records
            .get(resource)
            .and_then(|table| table.get(&id))
            .cloned()
    }
}

fn record_id(record: &Value) -> Result<i64> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::InvalidInput("record has no integer id".to_string()))
}

fn not_found(resource: &str, id: i64) -> Error {
    Error::RecordNotFound {
        resource: resource.to_string(),
        id,
    }
}

#[async_trait]
impl ResourceProvider for MemoryProvider {
    async fn get_one(&self, resource: &str, id: i64) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.fetches += 1;
        if let Some(message) = state.fetch_failures.pop_front() {
            return Err(Error::Api {
                status: 500,
                message,
            });
        }

        state
            .records
            .get(resource)
            .and_then(|table| table.get(&id))
            .cloned()
            .ok_or_else(|| not_found(resource, id))
    }

    async fn update(&self, resource: &str, id: i64, patch: Value) -> Result<Value> {
        let mut state = self.state.lock().await;
        state.updates.push(UpdateCall {
            resource: resource.to_string(),
            id,
            patch: patch.clone(),
        });
        if let Some(message) = state.update_failures.pop_front() {
            return Err(Error::Rejected(message));
        }

        let Value::Object(patch) = patch else {
            return Err(Error::InvalidInput("update patch must be an object".to_string()));
        };
        let record = state
            .records
            .get_mut(resource)
            .and_then(|table| table.get_mut(&id))
            .ok_or_else(|| not_found(resource, id))?;
        let Value::Object(stored) = &mut *record else {
            return Err(Error::InvalidInput("stored record is not an object".to_string()));
        };
        for (key, value) in patch {
            if key != "id" {
                stored.insert(key, value);
            }
        }
        debug!(resource, id, "Record updated");
        Ok(record.clone())
    }

    async fn get_list(&self, resource: &str, pagination: Pagination) -> Result<ListPage> {
        let state = self.state.lock().await;
        let Some(table) = state.records.get(resource) else {
            return Ok(ListPage {
                items: Vec::new(),
                total: 0,
            });
        };

        let (start, end) = pagination.range();
        let items = table
            .values()
            .skip(start)
            .take(end.saturating_sub(start))
            .cloned()
            .collect();
        Ok(ListPage {
            items,
            total: table.len(),
        })
    }
}
