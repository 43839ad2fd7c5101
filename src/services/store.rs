use async_trait::async_trait;

use crate::errors::TrackerResult;
use crate::services::hierarchy::EntityKind;

pub const DEFAULT_PAGE_LIMIT: u64 = 100;
pub const MAX_PAGE_LIMIT: u64 = 1000;

/// Offset/limit window over a list result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    /// Builds a page from the optional `skip`/`limit` query parameters
    pub fn new(skip: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            offset: skip.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// CRUD over one kind of row
///
/// Implementations open one transaction per mutating call and hand it to the
/// ordering and hierarchy helpers, so a call either fully applies or not at all.
#[async_trait]
pub trait EntityStore: Send + Sync {
    type Model: Send;
    type New: Send;
    type Patch: Send;
    type Filter: Send + Default;

    const KIND: EntityKind;

    async fn create(&self, input: Self::New) -> TrackerResult<Self::Model>;

    /// Fails with `NotFound` when `id` does not exist
    async fn get(&self, id: i32) -> TrackerResult<Self::Model>;

    /// Ascending by `order` then id for ordered kinds, by id otherwise
    async fn list(&self, filter: Self::Filter, page: Page) -> TrackerResult<Vec<Self::Model>>;

    async fn update(&self, id: i32, patch: Self::Patch) -> TrackerResult<Self::Model>;

    async fn delete(&self, id: i32) -> TrackerResult<()>;
}
