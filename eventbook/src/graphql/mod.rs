//! GraphQL schema using async-graphql
//!
//! Exposes:
//! - query `events`
//! - mutations `createEvent(eventInput:)` and `createUser(userInput:)`
//!
//! The [`BookingService`] is stored as schema data; `createEvent` also needs a
//! [`CurrentUser`](crate::context::CurrentUser) on the request.

mod input;
mod object;
mod resolver;

pub use input::{EventInput, UserInput};
pub use object::{Event, User};
pub use resolver::{EventServiceMutation, EventServiceQuery, UserServiceMutation};

use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::error::ServiceError;
use crate::service::BookingService;

/// Combined Query type
#[derive(MergedObject, Default)]
pub struct Query(EventServiceQuery);

/// Combined Mutation type
#[derive(MergedObject, Default)]
pub struct Mutation(EventServiceMutation, UserServiceMutation);

/// The eventbook GraphQL schema
pub type AppSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the schema over `service`
pub fn build_schema(service: BookingService) -> AppSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(service)
        .finish()
}

pub(crate) fn to_graphql_error(e: ServiceError) -> async_graphql::Error {
    match &e {
        ServiceError::Storage(_) | ServiceError::Hashing(_) => {
            tracing::error!(error = %e, "request failed");
        }
        _ => tracing::debug!(error = %e, "request rejected"),
    }
    async_graphql::Error::new(e.to_string())
}
