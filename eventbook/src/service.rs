//! Root operations
//!
//! The list query and the two creation flows. Both flows write more than one
//! document without a transaction and stop at the first failing step; earlier
//! writes stay in place.

use std::sync::Arc;

use bson::oid::ObjectId;

use crate::error::ServiceError;
use crate::hashing::PasswordHasher;
use crate::model::{EventDraft, NewEvent, NewUser, UserDraft, parse_date};
use crate::resolver::{Resolver, ShapedEvent, ShapedUser};
use crate::storage::Storage;

/// Entry point for every operation the API exposes
#[derive(Clone)]
pub struct BookingService {
    storage: Arc<dyn Storage>,
    hasher: PasswordHasher,
    resolver: Resolver,
}

impl BookingService {
    pub fn new(storage: Arc<dyn Storage>, hasher: PasswordHasher, max_depth: usize) -> Self {
        Self {
            resolver: Resolver::new(Arc::clone(&storage), max_depth),
            storage,
            hasher,
        }
    }

    /// All events, creators deferred
    pub async fn events(&self) -> Result<Vec<ShapedEvent>, ServiceError> {
        self.resolver.all_events().await
    }

    /// Create an event owned by `creator` and record it on the creator
    ///
    /// The event is written before the creator is looked up. When the creator
    /// does not exist the call fails with [`ServiceError::UserNotFound`] and
    /// the event stays stored. When saving the creator fails the event is
    /// stored but missing from the creator's `created_events`.
    pub async fn create_event(
        &self,
        draft: EventDraft,
        creator: ObjectId,
    ) -> Result<ShapedEvent, ServiceError> {
        let date = parse_date(&draft.date)?;
        let record = self
            .storage
            .insert_event(NewEvent {
                title: draft.title,
                description: draft.description,
                price: draft.price,
                date,
                creator,
            })
            .await?;

        let Some(mut user) = self.storage.find_user(creator).await? else {
            tracing::warn!(event = %record.id, %creator, "creator not found, event left in place");
            return Err(ServiceError::UserNotFound);
        };

        user.created_events.push(record.id);
        if let Err(e) = self.storage.save_user(&user).await {
            tracing::warn!(event = %record.id, %creator, error = %e, "event stored but creator not updated");
            return Err(e.into());
        }

        tracing::info!(event = %record.id, %creator, "event created");
        Ok(self.resolver.shape_event(record, 0))
    }

    /// Create a user with a hashed password
    ///
    /// The email check and the insert are separate storage calls, so two
    /// concurrent creations with the same email can both succeed.
    pub async fn create_user(&self, draft: UserDraft) -> Result<ShapedUser, ServiceError> {
        if self.storage.find_user_by_email(&draft.email).await?.is_some() {
            tracing::warn!("rejected duplicate user email");
            return Err(ServiceError::UserAlreadyExists);
        }

        let password = self.hasher.hash(&draft.password).await?;
        let record = self
            .storage
            .insert_user(NewUser {
                email: draft.email,
                password,
            })
            .await?;

        tracing::info!(user = %record.id, "user created");
        Ok(self.resolver.shape_user(record, 0))
    }
}
