//! Backend implementations for the school demo.
//!
//! Each backend stores the same [`Dataset`] in its own physical shape and
//! answers the same two relationship queries.
//!
//! # Available Backends
//!
//! | Backend | Module | Enrollment encoding |
//! |---------|--------|---------------------|
//! | BigQuery | [`bigquery`] | `enrollments` join table |
//! | MongoDB | [`mongo`] | `courses` array on the student document |
//! | Neo4j | [`neo4j`] | `(:Student)-[:ENROLLED_IN]->(:Class)` edge |
//! | In-process | [`memory`] | `Vec<Enrollment>` |

pub mod bigquery;
pub mod memory;
pub mod mongo;
pub mod neo4j;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Classmate, Dataset};

pub use bigquery::WarehouseBackend;
pub use memory::MemoryBackend;
pub use mongo::DocumentBackend;
pub use neo4j::GraphBackend;

/// A store that can hold the demo dataset and answer the two queries.
///
/// Results come back in whatever order the store produces them.
#[async_trait]
pub trait SchoolBackend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Removes any previous demo data and recreates the empty schema.
    ///
    /// Safe to call on a store that has never been seeded.
    async fn reset(&self) -> Result<(), AppError>;

    /// Inserts every student, class and enrollment of `dataset`.
    async fn load(&self, dataset: &Dataset) -> Result<(), AppError>;

    /// Names of the students enrolled in the class titled `title`.
    ///
    /// An unknown title yields an empty list.
    async fn students_in_class(&self, title: &str) -> Result<Vec<String>, AppError>;

    /// Students other than `name` sharing at least one class with them.
    ///
    /// An unknown student yields an empty list.
    async fn classmates_of(&self, name: &str) -> Result<Vec<Classmate>, AppError>;

    /// Releases the connection, consuming the backend.
    ///
    /// Backends holding nothing beyond their client have nothing to do
    /// here; the client goes away with `self`.
    async fn close(self) -> Result<(), AppError>
    where
        Self: Sized,
    {
        Ok(())
    }
}
