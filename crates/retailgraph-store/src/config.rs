//! Store connection configuration.
//!
//! Settings come from environment variables with defaults suitable for a
//! local Neo4j (Desktop or docker) instance. They are resolved once, into a
//! plain value, so tests and embedders can construct a [`StoreConfig`]
//! directly instead of mutating the process environment.

/// Bolt endpoint, e.g. `bolt://127.0.0.1:7687`.
pub const NEO4J_URI_ENV: &str = "NEO4J_URI";
/// Database user.
pub const NEO4J_USER_ENV: &str = "NEO4J_USER";
/// Database password. An empty value means authentication is disabled.
pub const NEO4J_PASSWORD_ENV: &str = "NEO4J_PASSWORD";
/// Logical database name inside the server.
pub const NEO4J_DATABASE_ENV: &str = "NEO4J_DATABASE";

const DEFAULT_URI: &str = "bolt://127.0.0.1:7687";
const DEFAULT_USER: &str = "neo4j";
const DEFAULT_PASSWORD: &str = "mynewpassword";
const DEFAULT_DATABASE: &str = "retail-graph";

/// Connection settings for the graph store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_URI.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            database: DEFAULT_DATABASE.to_string(),
        }
    }
}

impl StoreConfig {
    /// Resolve the configuration from the environment.
    ///
    /// Precedence per field: env var, then the local-development default.
    pub fn from_env() -> Self {
        Self {
            uri: env_or(NEO4J_URI_ENV, DEFAULT_URI),
            user: env_or(NEO4J_USER_ENV, DEFAULT_USER),
            password: env_or(NEO4J_PASSWORD_ENV, DEFAULT_PASSWORD),
            database: env_or(NEO4J_DATABASE_ENV, DEFAULT_DATABASE),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_dev_instance() {
        let config = StoreConfig::default();
        assert_eq!(config.uri, "bolt://127.0.0.1:7687");
        assert_eq!(config.user, "neo4j");
        assert_eq!(config.database, "retail-graph");
    }

    #[test]
    fn env_overrides_win_and_blank_values_fall_back() {
        // Single test so the env mutations don't race a parallel sibling.
        std::env::set_var(NEO4J_URI_ENV, "bolt://graph.internal:7687");
        std::env::set_var(NEO4J_DATABASE_ENV, "   ");
        let config = StoreConfig::from_env();
        assert_eq!(config.uri, "bolt://graph.internal:7687");
        assert_eq!(config.database, "retail-graph", "blank env value falls back");
        std::env::remove_var(NEO4J_URI_ENV);
        std::env::remove_var(NEO4J_DATABASE_ENV);
    }
}
