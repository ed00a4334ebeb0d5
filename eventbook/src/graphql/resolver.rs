//! Root query and mutation resolvers

use async_graphql::{Context, Object, Result};

use super::input::{EventInput, UserInput};
use super::object::{Event, User};
use super::to_graphql_error;
use crate::context::CurrentUser;
use crate::error::ServiceError;
use crate::service::BookingService;

/// Event queries
#[derive(Default)]
pub struct EventServiceQuery;

#[Object]
impl EventServiceQuery {
    /// List every event
    async fn events(&self, ctx: &Context<'_>) -> Result<Vec<Event>> {
        let service = ctx.data::<BookingService>()?;
        let events = service.events().await.map_err(to_graphql_error)?;
        Ok(events.into_iter().map(Event::from).collect())
    }
}

/// Event mutations
#[derive(Default)]
pub struct EventServiceMutation;

#[Object]
impl EventServiceMutation {
    /// Create an event owned by the calling user
    async fn create_event(&self, ctx: &Context<'_>, event_input: EventInput) -> Result<Event> {
        let service = ctx.data::<BookingService>()?;
        let caller = ctx
            .data_opt::<CurrentUser>()
            .ok_or_else(|| to_graphql_error(ServiceError::Unauthenticated))?;
        let event = service
            .create_event(event_input.into(), caller.id)
            .await
            .map_err(to_graphql_error)?;
        Ok(Event::from(event))
    }
}

/// User mutations
#[derive(Default)]
pub struct UserServiceMutation;

#[Object]
impl UserServiceMutation {
    /// Register a user
    async fn create_user(&self, ctx: &Context<'_>, user_input: UserInput) -> Result<User> {
        let service = ctx.data::<BookingService>()?;
        let user = service
            .create_user(user_input.into())
            .await
            .map_err(to_graphql_error)?;
        Ok(User::from(user))
    }
}
