//! GraphQL input types

use async_graphql::InputObject;

use crate::model::{EventDraft, UserDraft};

/// Attributes of a new event; the creator is the caller
#[derive(InputObject)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Date string, RFC 3339 preferred
    pub date: String,
}

impl From<EventInput> for EventDraft {
    fn from(input: EventInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
            price: input.price,
            date: input.date,
        }
    }
}

#[derive(InputObject)]
pub struct UserInput {
    pub email: String,
    pub password: String,
}

impl From<UserInput> for UserDraft {
    fn from(input: UserInput) -> Self {
        Self {
            email: input.email,
            password: input.password,
        }
    }
}
