//! Resource providers
//!
//! The CRUD transport the edit view talks to. Records travel as JSON
//! objects; the view decides how to bind them.

mod http;
mod memory;

pub use http::{HttpProvider, HttpProviderBuilder};
pub use memory::{MemoryProvider, UpdateCall};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Page selection for list requests (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: usize,
    pub page_size: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: 10,
        }
    }
}

impl Pagination {
    pub fn new(current: usize, page_size: usize) -> Self {
        Self {
            current: current.max(1),
            page_size,
        }
    }

    /// Half-open `[start, end)` offsets of the page
    pub fn range(&self) -> (usize, usize) {
        let start = self.current.saturating_sub(1).saturating_mul(self.page_size);
        (start, start.saturating_add(self.page_size))
    }
}

/// One page of a list request
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage {
    pub items: Vec<Value>,
    /// Total number of records in the resource
    pub total: usize,
}

/// CRUD operations on named resources
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Fetch one record by id
    async fn get_one(&self, resource: &str, id: i64) -> Result<Value>;

    /// Apply a partial record and return the stored result
    async fn update(&self, resource: &str, id: i64, patch: Value) -> Result<Value>;

    /// Fetch one page of records
    async fn get_list(&self, resource: &str, pagination: Pagination) -> Result<ListPage>;
}
