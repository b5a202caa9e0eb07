//! Bolt client wrapper.
//!
//! [`GraphStore`] owns one lazy driver handle for the lifetime of a run.
//! Driver errors are folded into [`StoreError`] so callers can tell "the
//! server is not there" apart from "the credentials are wrong" without
//! matching on `neo4rs` internals.

use neo4rs::{ConfigBuilder, DetachedRowStream, Graph, Query};

use crate::config::StoreConfig;

/// Failures surfaced by the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("graph store unavailable at {uri}: {detail}. Is the database running?")]
    Unavailable { uri: String, detail: String },
    #[error("authentication failed for user '{user}': {detail}. Check NEO4J_USER/NEO4J_PASSWORD.")]
    Auth { user: String, detail: String },
    #[error("invalid store configuration: {0}")]
    Config(String),
    #[error("query failed: {0}")]
    Query(String),
}

/// Handle to the graph store.
///
/// Cloning is cheap (the underlying driver is reference counted); the
/// connection itself is established lazily on first use, so a `connect` that
/// succeeds does not yet prove the server is reachable; use [`verify`] for
/// that.
///
/// [`verify`]: GraphStore::verify
#[derive(Clone)]
pub struct GraphStore {
    graph: Graph,
    config: StoreConfig,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("uri", &self.config.uri)
            .field("database", &self.config.database)
            .finish()
    }
}

impl GraphStore {
    /// Build a store handle from explicit configuration.
    pub fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let bolt = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        let graph = Graph::connect(bolt).map_err(|e| classify(e, config))?;
        Ok(Self {
            graph,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Round-trip a trivial query to prove connectivity and credentials.
    pub async fn verify(&self) -> Result<String, StoreError> {
        let mut rows = self
            .execute(neo4rs::query("RETURN 'Hello Neo4j' AS message"))
            .await?;
        let row = rows
            .next()
            .await
            .map_err(|e| classify(e, &self.config))?
            .ok_or_else(|| StoreError::Query("connectivity probe returned no rows".to_string()))?;
        row.get::<String>("message")
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    /// Submit a mutation, discarding any result rows.
    pub async fn run(&self, q: Query) -> Result<(), StoreError> {
        self.graph
            .run(q)
            .await
            .map(|_| ())
            .map_err(|e| classify(e, &self.config))
    }

    /// Submit a read query and stream the result rows.
    pub async fn execute(&self, q: Query) -> Result<DetachedRowStream, StoreError> {
        self.graph
            .execute(q)
            .await
            .map_err(|e| classify(e, &self.config))
    }
}

fn classify(err: neo4rs::Error, config: &StoreConfig) -> StoreError {
    match err {
        neo4rs::Error::AuthenticationError(detail) => StoreError::Auth {
            user: config.user.clone(),
            detail,
        },
        neo4rs::Error::ConnectionError => StoreError::Unavailable {
            uri: config.uri.clone(),
            detail: "connection refused or dropped".to_string(),
        },
        other => {
            let detail = other.to_string();
            let lowered = detail.to_ascii_lowercase();
            if lowered.contains("connection refused")
                || lowered.contains("io error")
                || lowered.contains("timed out")
            {
                StoreError::Unavailable {
                    uri: config.uri.clone(),
                    detail,
                }
            } else {
                StoreError::Query(detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_unavailable_render_distinct_diagnostics() {
        let config = StoreConfig::default();
        let auth = classify(
            neo4rs::Error::AuthenticationError("unauthorized".to_string()),
            &config,
        );
        let down = classify(neo4rs::Error::ConnectionError, &config);
        assert!(auth.to_string().contains("authentication failed"));
        assert!(auth.to_string().contains("neo4j"));
        assert!(down.to_string().contains("unavailable"));
        assert!(down.to_string().contains("bolt://127.0.0.1:7687"));
    }

    #[test]
    fn connect_is_lazy_and_accepts_unreachable_endpoints() {
        // No server is listening in the test environment; building the
        // handle must still succeed because the driver connects lazily.
        let config = StoreConfig {
            uri: "bolt://127.0.0.1:1".to_string(),
            ..StoreConfig::default()
        };
        let store = GraphStore::connect(&config).expect("lazy connect");
        assert_eq!(store.config().database, "retail-graph");
    }
}
