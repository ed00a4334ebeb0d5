//! GraphQL object types
//!
//! Plain attributes resolve from the shaped entity. Relation fields run the
//! entity's deferred fetch, so the engine touches storage for them only when
//! a query selects them.

use async_graphql::{ID, Object, Result};

use super::to_graphql_error;
use crate::model::format_date;
use crate::resolver::{ShapedEvent, ShapedUser};

/// An event
pub struct Event(ShapedEvent);

#[Object]
impl Event {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.to_hex())
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn price(&self) -> f64 {
        self.0.price
    }

    /// ISO-8601 timestamp
    async fn date(&self) -> String {
        format_date(&self.0.date)
    }

    /// Resolve the user who created the event
    async fn creator(&self) -> Result<User> {
        let user = self.0.creator.resolve().await.map_err(to_graphql_error)?;
        Ok(User::from(user))
    }
}

impl From<ShapedEvent> for Event {
    fn from(event: ShapedEvent) -> Self {
        Self(event)
    }
}

/// A user
pub struct User(ShapedUser);

#[Object]
impl User {
    #[graphql(name = "_id")]
    async fn id(&self) -> ID {
        ID(self.0.id.to_hex())
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    /// Always null
    async fn password(&self) -> Option<String> {
        None
    }

    /// Resolve the events this user created
    async fn created_events(&self) -> Result<Option<Vec<Event>>> {
        let events = self
            .0
            .created_events
            .resolve()
            .await
            .map_err(to_graphql_error)?;
        Ok(Some(events.into_iter().map(Event::from).collect()))
    }
}

impl From<ShapedUser> for User {
    fn from(user: ShapedUser) -> Self {
        Self(user)
    }
}
