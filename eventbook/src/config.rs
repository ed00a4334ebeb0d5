//! Runtime configuration
//!
//! Read from environment variables. Every setting has a default except the
//! database credentials, which fall back to a local MongoDB.

use std::net::SocketAddr;

use crate::hashing::DEFAULT_COST;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DATABASE_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE_NAME: &str = "eventbook";
const DEFAULT_MAX_TRAVERSAL_DEPTH: usize = 10;

/// Error raised while reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("invalid value for {name}: {message}")]
    Invalid {
        /// The offending variable
        name: &'static str,
        /// Why the value was rejected
        message: String,
    },
}

/// Where the document store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub uri: String,
    pub name: String,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP server binds
    pub listen_addr: SocketAddr,
    pub database: DatabaseConfig,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
    /// Relation hops a single query may traverse
    pub max_traversal_depth: usize,
    /// Serve the GraphiQL IDE on `GET /graphql`
    pub graphiql: bool,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its
    /// value
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_addr: SocketAddr = lookup("GRAPHQL_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.into())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "GRAPHQL_ADDR",
                message: e.to_string(),
            })?;

        // An empty variable counts as unset
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let name = non_empty("MONGO_DB").unwrap_or_else(|| DEFAULT_DATABASE_NAME.into());
        let uri = match (
            non_empty("DATABASE_URL"),
            non_empty("MONGO_USER"),
            non_empty("MONGO_PASSWORD"),
            non_empty("MONGO_HOST"),
        ) {
            (Some(url), _, _, _) => url,
            (None, Some(user), Some(password), Some(host)) => {
                let user = urlencoding::encode(&user);
                let password = urlencoding::encode(&password);
                format!("mongodb+srv://{user}:{password}@{host}/{name}?retryWrites=true&w=majority")
            }
            _ => DEFAULT_DATABASE_URI.into(),
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => {
                let cost: u32 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    message: format!("'{raw}' is not an integer"),
                })?;
                if !(4..=31).contains(&cost) {
                    return Err(ConfigError::Invalid {
                        name: "BCRYPT_COST",
                        message: format!("{cost} is outside 4..=31"),
                    });
                }
                cost
            }
            None => DEFAULT_COST,
        };

        let max_traversal_depth = match lookup("MAX_TRAVERSAL_DEPTH") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(depth) if depth >= 1 => depth,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_TRAVERSAL_DEPTH",
                        message: format!("'{raw}' is not a positive integer"),
                    });
                }
            },
            None => DEFAULT_MAX_TRAVERSAL_DEPTH,
        };

        let graphiql = match lookup("GRAPHIQL").as_deref().map(str::to_ascii_lowercase) {
            None => true,
            Some(raw) => match raw.as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "GRAPHIQL",
                        message: format!("'{raw}' is not a boolean"),
                    });
                }
            },
        };

        Ok(Self {
            listen_addr,
            database: DatabaseConfig { uri, name },
            bcrypt_cost,
            max_traversal_depth,
            graphiql,
        })
    }
}
