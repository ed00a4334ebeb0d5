//! eventbook
//!
//! A GraphQL API over two document collections, events and users:
//! - query `events`
//! - mutations `createEvent` and `createUser`
//!
//! An event's `creator` and a user's `createdEvents` are not joined when the
//! record is read. They are deferred fetches ([`resolver::Deferred`]) that the
//! GraphQL engine runs only for fields a query actually selects.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB storage implementation

pub mod config;
pub mod context;
pub mod error;
pub mod graphql;
pub mod hashing;
pub mod model;
pub mod resolver;
pub mod server;
pub mod service;
pub mod storage;

pub use config::Config;
pub use context::CurrentUser;
pub use error::{ServiceError, StorageError};
pub use graphql::{AppSchema, build_schema};
pub use hashing::PasswordHasher;
pub use resolver::{Deferred, Resolver, ShapedEvent, ShapedUser};
pub use server::router;
pub use service::BookingService;
