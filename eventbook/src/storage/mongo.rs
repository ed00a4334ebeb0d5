//! MongoDB storage
//!
//! Events and users live in the `events` and `users` collections. Field names
//! follow the documents the API has always written (`createdEvents` in camel
//! case, `_id` as an ObjectId).

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};

use super::Storage;
use crate::error::StorageError;
use crate::model::{EventRecord, NewEvent, NewUser, UserRecord};

const EVENTS: &str = "events";
const USERS: &str = "users";

#[derive(Debug, Serialize, Deserialize)]
struct EventDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    description: String,
    price: f64,
    date: bson::DateTime,
    creator: ObjectId,
}

impl EventDocument {
    fn into_record(self) -> Result<EventRecord, StorageError> {
        let date = chrono::DateTime::from_timestamp_millis(self.date.timestamp_millis())
            .ok_or_else(|| {
                StorageError::InvalidArgument(format!("event {} has an out of range date", self.id))
            })?;
        Ok(EventRecord {
            id: self.id,
            title: self.title,
            description: self.description,
            price: self.price,
            date,
            creator: self.creator,
        })
    }
}

impl From<&EventRecord> for EventDocument {
    fn from(record: &EventRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            price: record.price,
            date: bson::DateTime::from_millis(record.date.timestamp_millis()),
            creator: record.creator,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    email: String,
    password: String,
    #[serde(rename = "createdEvents", default)]
    created_events: Vec<ObjectId>,
}

impl From<UserDocument> for UserRecord {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id,
            email: doc.email,
            password: doc.password,
            created_events: doc.created_events,
        }
    }
}

impl From<&UserRecord> for UserDocument {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            password: record.password.clone(),
            created_events: record.created_events.clone(),
        }
    }
}

/// Storage backed by a MongoDB database
#[derive(Clone)]
pub struct MongoStorage {
    db: Database,
    events: Collection<EventDocument>,
    users: Collection<UserDocument>,
}

impl MongoStorage {
    pub fn new(db: Database) -> Self {
        Self {
            events: db.collection(EVENTS),
            users: db.collection(USERS),
            db,
        }
    }

    /// Connect to `uri` and use the database called `database`
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(client.database(database)))
    }

    /// Round-trip a `ping` command to verify the deployment is reachable
    pub async fn ping(&self) -> Result<(), StorageError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for MongoStorage {
    async fn list_events(&self) -> Result<Vec<EventRecord>, StorageError> {
        tracing::debug!(collection = EVENTS, "listing events");
        let cursor = self.events.find(doc! {}, None).await?;
        let docs: Vec<EventDocument> = cursor.try_collect().await?;
        docs.into_iter().map(EventDocument::into_record).collect()
    }

    async fn find_events(&self, ids: &[ObjectId]) -> Result<Vec<EventRecord>, StorageError> {
        tracing::debug!(collection = EVENTS, count = ids.len(), "finding events by id");
        let cursor = self
            .events
            .find(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await?;
        let docs: Vec<EventDocument> = cursor.try_collect().await?;
        docs.into_iter().map(EventDocument::into_record).collect()
    }

    async fn find_user(&self, id: ObjectId) -> Result<Option<UserRecord>, StorageError> {
        tracing::debug!(collection = USERS, %id, "finding user");
        let user = self.users.find_one(doc! { "_id": id }, None).await?;
        Ok(user.map(UserRecord::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        tracing::debug!(collection = USERS, "finding user by email");
        let user = self.users.find_one(doc! { "email": email }, None).await?;
        Ok(user.map(UserRecord::from))
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
        self.events
            .insert_one(EventDocument::from(&record), None)
            .await?;
        Ok(record)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StorageError> {
        let record = UserRecord {
            id: ObjectId::new(),
            email: user.email,
            password: user.password,
            created_events: Vec::new(),
        };
        self.users.insert_one(UserDocument::from(&record), None).await?;
        Ok(record)
    }

    async fn save_user(&self, user: &UserRecord) -> Result<(), StorageError> {
        let result = self
            .users
            .replace_one(doc! { "_id": user.id }, UserDocument::from(user), None)
            .await?;
        if result.matched_count == 0 {
            return Err(StorageError::NotFound(format!("user {}", user.id)));
        }
        Ok(())
    }
}
