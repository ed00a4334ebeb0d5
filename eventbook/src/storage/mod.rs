//! Storage layer
//!
//! This module contains:
//! - The backend-agnostic [`Storage`] trait the resolver and mutations run on
//! - An in-process implementation ([`MemoryStorage`])
//! - The MongoDB implementation ([`MongoStorage`], feature `mongodb`)

mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

pub use memory::MemoryStorage;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStorage;

use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::error::StorageError;
use crate::model::{EventRecord, NewEvent, NewUser, UserRecord};

/// Document store operations used by eventbook
///
/// There is no uniqueness constraint on user email at this layer and no
/// transaction spanning two calls.
#[async_trait]
pub trait Storage: Send + Sync {
    /// All stored events, in natural order
    async fn list_events(&self) -> Result<Vec<EventRecord>, StorageError>;

    /// Events whose id is in `ids`, in natural order; unknown ids are skipped
    async fn find_events(&self, ids: &[ObjectId]) -> Result<Vec<EventRecord>, StorageError>;

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserRecord>, StorageError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError>;

    /// Persist a new event and return it with its assigned id
    async fn insert_event(&self, event: NewEvent) -> Result<EventRecord, StorageError>;

    /// Persist a new user with no created events
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StorageError>;

    /// Overwrite a stored user with `user`
    async fn save_user(&self, user: &UserRecord) -> Result<(), StorageError>;
}
