//! Executor traits implemented by the driver adapters.

use async_trait::async_trait;

use crate::error::AppError;
use crate::store::row::{Params, RowStream};

/// Executes Cypher queries against a graph database.
#[async_trait]
pub trait CypherExecutor: Send + Sync {
    /// Executes a Cypher query and returns a stream of result rows.
    ///
    /// Use this for queries that return data (MATCH, RETURN).
    ///
    /// # Arguments
    ///
    /// * `cypher` - The Cypher query string
    /// * `params` - Parameters to bind to the query
    async fn execute_cypher(&self, cypher: &str, params: Params)
        -> Result<RowStream<'_>, AppError>;

    /// Executes a Cypher query without returning results.
    ///
    /// Use this for mutations (CREATE, DELETE) and schema statements.
    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError>;
}

/// Executes literal SQL statements.
///
/// Statements carry their values inline; callers are responsible for
/// escaping string literals.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Executes a statement and discards any result (DDL, DML).
    async fn execute_sql(&self, sql: &str) -> Result<(), AppError>;

    /// Executes a query and returns a stream of result rows.
    async fn query_sql(&self, sql: &str) -> Result<RowStream<'_>, AppError>;
}
