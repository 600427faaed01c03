//! Application error types.

use thiserror::Error;

/// Message shown when a MongoDB connection string cannot be used.
pub const INVALID_URI_MESSAGE: &str =
    "An Invalid URI host error was received. Is your Atlas host name correct in your connection string?";

/// Application-level errors for the classmates demo.
#[derive(Error, Debug)]
pub enum AppError {
    // Backend client errors
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),

    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("BigQuery error: {0}")]
    BigQuery(#[from] gcp_bigquery_client::error::BQError),

    #[error("Query failed: {message}")]
    Query { message: String, query: String },

    // Credential errors
    #[error("{msg} ({0})", msg = INVALID_URI_MESSAGE)]
    InvalidConnectionString(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    // Seed data errors
    #[error("Enrollment references unknown {kind} id {id}")]
    DanglingEnrollment { kind: &'static str, id: i64 },

    #[error("Duplicate {kind} id {id} in seed data")]
    DuplicateId { kind: &'static str, id: i64 },

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
