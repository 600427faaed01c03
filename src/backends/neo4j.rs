//! Neo4j backend: `Student` and `Class` nodes joined by `ENROLLED_IN` edges.
//!
//! # Example
//!
//! ```ignore
//! use classmates::backends::neo4j::{GraphBackend, Neo4jClient};
//!
//! let client = Neo4jClient::connect(&config.neo4j).await?;
//! let backend = GraphBackend::new(client);
//! backend.reset().await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use neo4rs::{BoltMap, BoltNull, BoltString, BoltType};
use serde_json::Value as JsonValue;

use super::SchoolBackend;
use crate::config::Neo4jConfig;
use crate::cypher;
use crate::error::AppError;
use crate::models::{Classmate, Dataset};
use crate::store::{CypherExecutor, Params, QueryExt, Row, RowStream};

/// Removes the demo nodes only; other labels in the database are untouched.
const DELETE_DEMO_NODES: &str = "MATCH (n) WHERE n:Student OR n:Class DETACH DELETE n";

const STUDENT_ID_CONSTRAINT: &str =
    "CREATE CONSTRAINT student_id IF NOT EXISTS FOR (s:Student) REQUIRE s.id IS UNIQUE";

const CLASS_ID_CONSTRAINT: &str =
    "CREATE CONSTRAINT class_id IF NOT EXISTS FOR (c:Class) REQUIRE c.id IS UNIQUE";

const CREATE_STUDENT: &str = "CREATE (s:Student {id: $id, name: $name, age: $age})";

const CREATE_CLASS: &str =
    "CREATE (c:Class {id: $id, title: $title, credits: $credits, instructor: $instructor})";

const CREATE_ENROLLMENT: &str = "MATCH (s:Student {id: $student_id}), (c:Class {id: $class_id})
CREATE (s)-[:ENROLLED_IN]->(c)";

const STUDENTS_IN_CLASS: &str = "MATCH (s:Student)-[:ENROLLED_IN]->(c:Class {title: $class_title})
RETURN s.name AS student_name";

const CLASSMATES_OF: &str = "MATCH (me:Student {name: $name})-[:ENROLLED_IN]->(c:Class)<-[:ENROLLED_IN]-(classmate:Student)
WHERE classmate <> me
RETURN classmate.name AS classmate_name, c.title AS class_title";

// ----------------------------------------------------------------------------
// Driver adapter
// ----------------------------------------------------------------------------

/// Neo4j connection wrapping the `neo4rs` connection pool.
#[derive(Clone)]
pub struct Neo4jClient {
    graph: neo4rs::Graph,
}

impl Neo4jClient {
    /// Connects and verifies the server answers before returning.
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, AppError> {
        config.validate()?;

        tracing::info!("Connecting to Neo4j at {}", config.uri);
        let graph = neo4rs::Graph::new(&config.uri, &config.user, &config.password).await?;
        graph.run(neo4rs::query("RETURN 1")).await?;
        tracing::info!("Connected to Neo4j");

        Ok(Self { graph })
    }

    fn build_query(cypher: &str, params: Params) -> neo4rs::Query {
        params
            .into_iter()
            .fold(neo4rs::query(cypher), |query, (name, value)| {
                query.param(&name, json_to_bolt(value))
            })
    }
}

#[async_trait]
impl CypherExecutor for Neo4jClient {
    async fn execute_cypher(
        &self,
        cypher: &str,
        params: Params,
    ) -> Result<RowStream<'_>, AppError> {
        use async_stream::try_stream;

        tracing::debug!(cypher, "Executing Cypher query");
        let mut rows = self
            .graph
            .execute(Self::build_query(cypher, params))
            .await
            .map_err(|e| AppError::Query {
                message: format!("Cypher query failed: {}", e),
                query: cypher.to_string(),
            })?;

        Ok(Box::pin(try_stream! {
            while let Some(row) = rows.next().await? {
                yield parse_bolt_row(&row)?;
            }
        }))
    }

    async fn run_cypher(&self, cypher: &str, params: Params) -> Result<(), AppError> {
        tracing::debug!(cypher, "Running Cypher statement");
        self.graph
            .run(Self::build_query(cypher, params))
            .await
            .map_err(|e| AppError::Query {
                message: format!("Cypher statement failed: {}", e),
                query: cypher.to_string(),
            })
    }
}

/// Converts a JSON parameter into the Bolt value the driver sends.
fn json_to_bolt(value: JsonValue) -> BoltType {
    match value {
        JsonValue::Null => BoltType::Null(BoltNull),
        JsonValue::Bool(b) => b.into(),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => i.into(),
            None => n.as_f64().unwrap_or_default().into(),
        },
        JsonValue::String(s) => s.into(),
        JsonValue::Array(items) => items
            .into_iter()
            .map(json_to_bolt)
            .collect::<Vec<BoltType>>()
            .into(),
        JsonValue::Object(fields) => {
            let mut map = BoltMap::with_capacity(fields.len());
            for (key, value) in fields {
                map.put(BoltString::from(key.as_str()), json_to_bolt(value));
            }
            BoltType::Map(map)
        }
    }
}

/// Converts a driver row into a JSON-valued [`Row`] keyed by column alias.
fn parse_bolt_row(row: &neo4rs::Row) -> Result<Row, AppError> {
    row.to::<HashMap<String, JsonValue>>()
        .map(Row::new)
        .map_err(|e| AppError::Internal(format!("Failed to decode Neo4j row: {}", e)))
}

// ----------------------------------------------------------------------------
// Backend
// ----------------------------------------------------------------------------

/// Graph backend over any [`CypherExecutor`].
pub struct GraphBackend<E = Neo4jClient> {
    executor: E,
}

impl<E: CypherExecutor> GraphBackend<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }
}

#[async_trait]
impl<E: CypherExecutor> SchoolBackend for GraphBackend<E> {
    fn name(&self) -> &'static str {
        "neo4j"
    }

    async fn reset(&self) -> Result<(), AppError> {
        self.executor.query(DELETE_DEMO_NODES).run().await?;
        self.executor.query(STUDENT_ID_CONSTRAINT).run().await?;
        self.executor.query(CLASS_ID_CONSTRAINT).run().await?;
        Ok(())
    }

    async fn load(&self, dataset: &Dataset) -> Result<(), AppError> {
        for student in &dataset.students {
            cypher!(
                self.executor,
                CREATE_STUDENT,
                id = student.id,
                name = &student.name,
                age = student.age,
            )
            .run()
            .await?;
        }

        for class in &dataset.classes {
            cypher!(
                self.executor,
                CREATE_CLASS,
                id = class.id,
                title = &class.title,
                credits = class.credits,
                instructor = &class.instructor,
            )
            .run()
            .await?;
        }

        for enrollment in &dataset.enrollments {
            cypher!(
                self.executor,
                CREATE_ENROLLMENT,
                student_id = enrollment.student_id,
                class_id = enrollment.class_id,
            )
            .run()
            .await?;
        }

        tracing::debug!(
            students = dataset.students.len(),
            classes = dataset.classes.len(),
            enrollments = dataset.enrollments.len(),
            "Created nodes and relationships"
        );
        Ok(())
    }

    async fn students_in_class(&self, title: &str) -> Result<Vec<String>, AppError> {
        cypher!(self.executor, STUDENTS_IN_CLASS, class_title = title)
            .fetch_column("student_name")
            .await
    }

    async fn classmates_of(&self, name: &str) -> Result<Vec<Classmate>, AppError> {
        let rows = cypher!(self.executor, CLASSMATES_OF, name = name)
            .fetch_all()
            .await?;

        let pairs = rows
            .iter()
            .map(|row| Ok((row.get("classmate_name")?, row.get("class_title")?)))
            .collect::<Result<Vec<(String, String)>, AppError>>()?;

        Ok(Classmate::group(pairs))
    }

    async fn close(self) -> Result<(), AppError> {
        // neo4rs shuts the pool down when the last `Graph` handle drops.
        drop(self.executor);
        tracing::info!("Closed Neo4j connection");
        Ok(())
    }
}
