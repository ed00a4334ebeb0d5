//! Lazy cross-entity resolution
//!
//! Shaped entities carry their relations as [`Deferred`] values: a fetch of
//! the related records, bound to the foreign keys already on the stored
//! record, that runs only when someone asks for it. An event's `creator`
//! resolves to a user whose `created_events` resolve to events, and so on, as
//! deep as the caller keeps asking and no deeper than the resolver's
//! traversal limit.

use std::fmt;
use std::sync::Arc;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::ServiceError;
use crate::model::{EventRecord, UserRecord};
use crate::storage::Storage;

type Thunk<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ServiceError>> + Send + Sync>;

/// A zero-argument fetch, constructed eagerly and run on demand
///
/// Every call to [`Deferred::resolve`] performs the fetch again; nothing is
/// cached.
pub struct Deferred<T> {
    thunk: Thunk<T>,
}

impl<T> Deferred<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ServiceError>> + Send + Sync + 'static,
    {
        Self { thunk: Arc::new(f) }
    }

    /// Run the fetch
    pub async fn resolve(&self) -> Result<T, ServiceError> {
        (self.thunk)().await
    }
}

impl<T> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            thunk: Arc::clone(&self.thunk),
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

/// Client-facing event
#[derive(Debug, Clone)]
pub struct ShapedEvent {
    pub id: ObjectId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub date: DateTime<Utc>,
    pub creator_id: ObjectId,
    /// The creating user, fetched on demand
    pub creator: Deferred<ShapedUser>,
}

/// Client-facing user; the password never leaves storage
#[derive(Debug, Clone)]
pub struct ShapedUser {
    pub id: ObjectId,
    pub email: String,
    pub created_event_ids: Vec<ObjectId>,
    /// Events this user created, fetched on demand
    pub created_events: Deferred<Vec<ShapedEvent>>,
}

/// Fetches entities and wires their relations as deferred fetches
#[derive(Clone)]
pub struct Resolver {
    storage: Arc<dyn Storage>,
    max_depth: usize,
}

impl Resolver {
    /// `max_depth` is the number of relation hops a deferred chain may take
    /// from its root.
    pub fn new(storage: Arc<dyn Storage>, max_depth: usize) -> Self {
        Self { storage, max_depth }
    }

    /// Every stored event, shaped
    pub async fn all_events(&self) -> Result<Vec<ShapedEvent>, ServiceError> {
        let records = self.storage.list_events().await?;
        tracing::debug!(count = records.len(), "listed events");
        Ok(records
            .into_iter()
            .map(|record| self.shape_event(record, 0))
            .collect())
    }

    /// Events with the given ids, shaped; one storage read
    pub async fn resolve_events(&self, ids: &[ObjectId]) -> Result<Vec<ShapedEvent>, ServiceError> {
        self.load_events(ids.to_vec(), 0).await
    }

    /// The user with the given id, shaped; one storage read
    pub async fn resolve_user(&self, id: ObjectId) -> Result<ShapedUser, ServiceError> {
        self.load_user(id, 0).await
    }

    /// Shape a record fetched at relation depth `depth`
    pub fn shape_event(&self, record: EventRecord, depth: usize) -> ShapedEvent {
        let resolver = self.clone();
        let creator_id = record.creator;
        ShapedEvent {
            id: record.id,
            title: record.title,
            description: record.description,
            price: record.price,
            date: record.date,
            creator_id,
            creator: Deferred::new(move || resolver.load_user(creator_id, depth + 1)),
        }
    }

    /// Shape a record fetched at relation depth `depth`
    pub fn shape_user(&self, record: UserRecord, depth: usize) -> ShapedUser {
        let resolver = self.clone();
        let event_ids = record.created_events.clone();
        ShapedUser {
            id: record.id,
            email: record.email,
            created_event_ids: record.created_events,
            created_events: Deferred::new(move || {
                resolver.load_events(event_ids.clone(), depth + 1)
            }),
        }
    }

    fn ensure_depth(&self, depth: usize) -> Result<(), ServiceError> {
        if depth > self.max_depth {
            return Err(ServiceError::DepthExceeded(self.max_depth));
        }
        Ok(())
    }

    fn load_user(&self, id: ObjectId, depth: usize) -> BoxFuture<'static, Result<ShapedUser, ServiceError>> {
        let resolver = self.clone();
        async move {
            resolver.ensure_depth(depth)?;
            tracing::debug!(%id, depth, "resolving user");
            let record = resolver
                .storage
                .find_user(id)
                .await?
                .ok_or(ServiceError::UserNotFound)?;
            Ok(resolver.shape_user(record, depth))
        }
        .boxed()
    }

    fn load_events(
        &self,
        ids: Vec<ObjectId>,
        depth: usize,
    ) -> BoxFuture<'static, Result<Vec<ShapedEvent>, ServiceError>> {
        let resolver = self.clone();
        async move {
            resolver.ensure_depth(depth)?;
            tracing::debug!(count = ids.len(), depth, "resolving events");
            let records = resolver.storage.find_events(&ids).await?;
            Ok(records
                .into_iter()
                .map(|record| resolver.shape_event(record, depth))
                .collect())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewEvent, NewUser, parse_date};
    use crate::storage::MemoryStorage;

    async fn seed(storage: &MemoryStorage) -> (UserRecord, EventRecord) {
        let mut user = storage
            .insert_user(NewUser {
                email: "host@example.com".into(),
                password: "$2b$04$hash".into(),
            })
            .await
            .unwrap();
        let event = storage
            .insert_event(NewEvent {
                title: "Launch".into(),
                description: "Product launch".into(),
                price: 19.99,
                date: parse_date("2021-06-01T00:00:00.000Z").unwrap(),
                creator: user.id,
            })
            .await
            .unwrap();
        user.created_events.push(event.id);
        storage.save_user(&user).await.unwrap();
        (user, event)
    }

    #[tokio::test]
    async fn test_relations_are_not_fetched_until_resolved() {
        let storage = Arc::new(MemoryStorage::new());
        let (user, event) = seed(&storage).await;
        let resolver = Resolver::new(storage.clone(), 10);

        let events = resolver.all_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].creator_id, user.id);
        assert_eq!(storage.user_reads(), 0);

        let creator = events[0].creator.resolve().await.unwrap();
        assert_eq!(creator.id, user.id);
        assert_eq!(creator.created_event_ids, vec![event.id]);
        assert_eq!(storage.user_reads(), 1);
    }

    #[tokio::test]
    async fn test_mutual_recursion_round_trips() {
        let storage = Arc::new(MemoryStorage::new());
        let (user, event) = seed(&storage).await;
        let resolver = Resolver::new(storage.clone(), 10);

        let shaped = resolver.resolve_user(user.id).await.unwrap();
        let created = shaped.created_events.resolve().await.unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, event.id);

        let again = created[0].creator.resolve().await.unwrap();
        assert_eq!(again.id, user.id);
        assert_eq!(storage.user_reads(), 2);
        assert_eq!(storage.event_reads(), 1);
    }

    #[tokio::test]
    async fn test_resolve_events_reads_once_for_the_whole_set() {
        let storage = Arc::new(MemoryStorage::new());
        let (user, first) = seed(&storage).await;
        let second = storage
            .insert_event(NewEvent {
                title: "Retro".into(),
                description: "Looking back".into(),
                price: 5.0,
                date: Utc::now(),
                creator: user.id,
            })
            .await
            .unwrap();
        let resolver = Resolver::new(storage.clone(), 10);

        let events = resolver.resolve_events(&[second.id, first.id]).await.unwrap();
        let ids: Vec<_> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(storage.event_reads(), 1);
        assert_eq!(storage.user_reads(), 0);
    }

    #[tokio::test]
    async fn test_each_resolve_fetches_again() {
        let storage = Arc::new(MemoryStorage::new());
        let (_, _) = seed(&storage).await;
        let resolver = Resolver::new(storage.clone(), 10);

        let events = resolver.all_events().await.unwrap();
        events[0].creator.resolve().await.unwrap();
        events[0].creator.clone().resolve().await.unwrap();
        assert_eq!(storage.user_reads(), 2);
    }

    #[tokio::test]
    async fn test_depth_limit_fails_only_the_deep_fetch() {
        let storage = Arc::new(MemoryStorage::new());
        let (user, _) = seed(&storage).await;
        let resolver = Resolver::new(storage.clone(), 1);

        let events = resolver.all_events().await.unwrap();
        let creator = events[0].creator.resolve().await.unwrap();
        assert_eq!(creator.id, user.id);

        let err = creator.created_events.resolve().await.unwrap_err();
        assert!(matches!(err, ServiceError::DepthExceeded(1)));
        assert_eq!(storage.event_reads(), 1);
    }

    #[tokio::test]
    async fn test_missing_creator_is_user_not_found() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .insert_event(NewEvent {
                title: "Orphan".into(),
                description: "No host".into(),
                price: 0.0,
                date: Utc::now(),
                creator: ObjectId::new(),
            })
            .await
            .unwrap();
        let resolver = Resolver::new(storage, 10);

        let events = resolver.all_events().await.unwrap();
        let err = events[0].creator.resolve().await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound));
    }

    #[tokio::test]
    async fn test_storage_failure_in_deferred_fetch() {
        let storage = Arc::new(MemoryStorage::new());
        seed(&storage).await;
        let resolver = Resolver::new(storage.clone(), 10);

        let events = resolver.all_events().await.unwrap();
        storage.fail_user_reads(true);
        let err = events[0].creator.resolve().await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(events[0].title, "Launch");
    }

    #[tokio::test]
    async fn test_failed_created_events_fetch_fails_only_that_call() {
        let storage = Arc::new(MemoryStorage::new());
        let (user, event) = seed(&storage).await;
        let resolver = Resolver::new(storage.clone(), 10);

        let shaped = resolver.resolve_user(user.id).await.unwrap();
        storage.fail_event_reads(true);
        let err = shaped.created_events.resolve().await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(shaped.email, "host@example.com");
        assert_eq!(shaped.created_event_ids, vec![event.id]);

        storage.fail_event_reads(false);
        let created = shaped.created_events.resolve().await.unwrap();
        assert_eq!(created[0].id, event.id);
    }

    #[tokio::test]
    async fn test_root_read_failure_fails_the_operation() {
        let storage = Arc::new(MemoryStorage::new());
        seed(&storage).await;
        let resolver = Resolver::new(storage.clone(), 10);

        storage.fail_event_reads(true);
        let err = resolver.all_events().await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        assert_eq!(storage.user_reads(), 0);
    }
}
