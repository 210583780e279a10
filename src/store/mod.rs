//! Bulletin persistence behind a trait seam
//!
//! Production talks to the managed datastore's REST interface; tests and
//! local runs use the in-memory store. Both distinguish "no such row"
//! from generic failure so the HTTP surface can answer 404.

pub mod memory;
pub mod rest;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Boletin, BoletinChanges, NewBoletin};

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Persistence operations for bulletins
#[async_trait]
pub trait BoletinStore: Send + Sync {
    /// All bulletins, newest registration first
    async fn list(&self) -> StoreResult<Vec<Boletin>>;

    /// One bulletin by id; `StoreError::RowNotFound` when absent
    async fn get(&self, id: i64) -> StoreResult<Boletin>;

    /// Persist a new bulletin with the initial status and registration time
    async fn insert(&self, nuevo: NewBoletin) -> StoreResult<Boletin>;

    /// Apply the populated fields of `changes`; absent fields untouched
    async fn update(&self, id: i64, changes: BoletinChanges) -> StoreResult<Boletin>;

    /// Remove a bulletin; `StoreError::RowNotFound` when absent
    async fn delete(&self, id: i64) -> StoreResult<()>;
}

pub use memory::MemoryStore;
pub use rest::RestStore;
