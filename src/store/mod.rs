//! Statement execution layer shared by the remote backends.
//!
//! The backends never talk to a driver directly when building statements.
//! They go through two small traits so the statement text can be checked
//! against a mock executor in tests:
//!
//! - [`CypherExecutor`] - parameterized Cypher (Neo4j)
//! - [`SqlExecutor`] - literal SQL text (BigQuery)
//!
//! Results come back as [`Row`]s of JSON values regardless of the driver.
//!
//! # Usage
//!
//! ```ignore
//! use classmates::store::QueryExt;
//!
//! let rows = client
//!     .query("MATCH (s:Student {name: $name}) RETURN s.id AS id")
//!     .param("name", "Alice")
//!     .fetch_all()
//!     .await?;
//! let id: i64 = rows[0].get("id")?;
//! ```

mod macros;
mod query;
mod row;
mod traits;

pub use query::{Query, QueryExt};
pub use row::{Params, Row, RowStream};
pub use traits::{CypherExecutor, SqlExecutor};

// Re-export macro (defined at crate root via #[macro_export])
#[doc(inline)]
pub use crate::cypher;
