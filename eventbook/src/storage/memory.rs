//! In-process storage
//!
//! Keeps records in insertion order behind a tokio `RwLock`. Read counters and
//! failure switches let callers observe which lookups a query triggered and
//! exercise partial-failure paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::Storage;
use crate::error::StorageError;
use crate::model::{EventRecord, NewEvent, NewUser, UserRecord};

#[derive(Default)]
struct Collections {
    events: Vec<EventRecord>,
    users: Vec<UserRecord>,
}

/// Storage kept in memory for the lifetime of the value
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<Collections>,
    event_reads: AtomicUsize,
    user_reads: AtomicUsize,
    fail_event_reads: AtomicBool,
    fail_user_reads: AtomicBool,
    fail_user_saves: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of event read operations served so far
    pub fn event_reads(&self) -> usize {
        self.event_reads.load(Ordering::SeqCst)
    }

    /// Number of user read operations served so far
    pub fn user_reads(&self) -> usize {
        self.user_reads.load(Ordering::SeqCst)
    }

    /// Make every later event lookup fail with a database error
    pub fn fail_event_reads(&self, fail: bool) {
        self.fail_event_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every later user lookup fail with a database error
    pub fn fail_user_reads(&self, fail: bool) {
        self.fail_user_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every later [`Storage::save_user`] fail with a database error
    pub fn fail_user_saves(&self, fail: bool) {
        self.fail_user_saves.store(fail, Ordering::SeqCst);
    }

    fn event_read(&self) -> Result<(), StorageError> {
        self.event_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_event_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Database("event collection unavailable".into()));
        }
        Ok(())
    }

    fn user_read(&self) -> Result<(), StorageError> {
        self.user_reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_user_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Database("user collection unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn list_events(&self) -> Result<Vec<EventRecord>, StorageError> {
        self.event_read()?;
        Ok(self.data.read().await.events.clone())
    }

    async fn find_events(&self, ids: &[ObjectId]) -> Result<Vec<EventRecord>, StorageError> {
        self.event_read()?;
        let data = self.data.read().await;
        Ok(data
            .events
            .iter()
            .filter(|event| ids.contains(&event.id))
            .cloned()
            .collect())
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserRecord>, StorageError> {
        self.user_read()?;
        let data = self.data.read().await;
        Ok(data.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        self.user_read()?;
        let data = self.data.read().await;
        Ok(data.users.iter().find(|user| user.email == email).cloned())
    }

    async fn insert_event(&self, event: NewEvent) -> Result<EventRecord, StorageError> {
        let record = EventRecord {
            id: ObjectId::new(),
            title: event.title,
            description: event.description,
            price: event.price,
            date: event.date,
            creator: event.creator,
        };
        self.data.write().await.events.push(record.clone());
        Ok(record)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StorageError> {
        let record = UserRecord {
            id: ObjectId::new(),
            email: user.email,
            password: user.password,
            created_events: Vec::new(),
        };
        self.data.write().await.users.push(record.clone());
        Ok(record)
    }

    async fn save_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        if self.fail_user_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Database("write conflict on users".into()));
        }
        let mut data = self.data.write().await;
        let slot = data
            .users
            .iter_mut()
            .find(|stored| stored.id == user.id)
            .ok_or_else(|| StorageError::NotFound(format!("user {}", user.id)))?;
        *slot = user.clone();
        Ok(())
    }
}
