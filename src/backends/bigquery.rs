//! BigQuery backend: `students`, `classes` and an `enrollments` join table.
//!
//! Every statement is literal SQL text addressed by fully-qualified table
//! name (`` `project.dataset.table` ``). Values are inlined as escaped
//! literals.

use std::collections::HashMap;

use async_trait::async_trait;
use gcp_bigquery_client::error::BQError;
use gcp_bigquery_client::model::get_query_results_parameters::GetQueryResultsParameters;
use gcp_bigquery_client::model::query_request::QueryRequest;
use gcp_bigquery_client::model::query_response::{QueryResponse, ResultSet};
use serde_json::Value as JsonValue;

use super::SchoolBackend;
use crate::config::BigQueryConfig;
use crate::error::AppError;
use crate::models::{Class, Classmate, Dataset, Enrollment, Student};
use crate::store::{Row, RowStream, SqlExecutor};

// ----------------------------------------------------------------------------
// Driver adapter
// ----------------------------------------------------------------------------

/// How long each `jobs.query` / `jobs.getQueryResults` call waits server-side.
const JOB_WAIT_MS: i32 = 10_000;

/// Polls of an unfinished job before giving up.
const MAX_JOB_POLLS: usize = 30;

/// BigQuery client authenticated with a service-account key.
pub struct BigQueryClient {
    client: gcp_bigquery_client::Client,
    project: String,
}

impl BigQueryClient {
    /// Authenticates with the key resolved from config or environment.
    pub async fn connect(config: &BigQueryConfig) -> Result<Self, AppError> {
        let key_path = config.credentials_path()?;
        let key_file = key_path.to_str().ok_or_else(|| {
            AppError::MissingCredentials(format!(
                "key file path is not valid UTF-8: {}",
                key_path.display()
            ))
        })?;

        tracing::info!("Authenticating to BigQuery with {}", key_file);
        let client = gcp_bigquery_client::Client::from_service_account_key_file(key_file).await?;

        Ok(Self {
            client,
            project: config.project.clone(),
        })
    }

    /// Runs one statement to completion and gathers every result page.
    async fn run_job(&self, sql: &str) -> Result<ResultSet, AppError> {
        tracing::debug!(sql, "Running BigQuery job");
        let mut request = QueryRequest::new(sql);
        request.timeout_ms = Some(JOB_WAIT_MS);
        let mut response = self
            .client
            .job()
            .query(&self.project, request)
            .await
            .map_err(|e| job_error(sql, e))?;

        let mut polls = 0;
        while response.job_complete != Some(true) && polls < MAX_JOB_POLLS {
            polls += 1;
            tracing::debug!(polls, "BigQuery job still running");
            response = self.fetch_results(sql, &response, None).await?;
        }
        let mut response = ensure_complete(response, sql)?;

        let mut rows = response.rows.take().unwrap_or_default();
        while let Some(page_token) = response.page_token.take() {
            let page = self.fetch_results(sql, &response, Some(page_token)).await?;
            rows.extend(page.rows.unwrap_or_default());
            response.page_token = page.page_token;
        }
        response.rows = Some(rows);

        Ok(ResultSet::new_from_query_response(response))
    }

    /// Fetches the state or the next page of a job started by `jobs.query`.
    async fn fetch_results(
        &self,
        sql: &str,
        response: &QueryResponse,
        page_token: Option<String>,
    ) -> Result<QueryResponse, AppError> {
        let reference = response.job_reference.as_ref();
        let job_id = reference
            .and_then(|r| r.job_id.as_deref())
            .ok_or_else(|| AppError::Query {
                message: "BigQuery response carries no job reference".into(),
                query: sql.to_string(),
            })?;

        let parameters = GetQueryResultsParameters {
            location: reference.and_then(|r| r.location.clone()),
            page_token,
            timeout_ms: Some(JOB_WAIT_MS),
            ..Default::default()
        };
        self.client
            .job()
            .get_query_results(&self.project, job_id, parameters)
            .await
            .map(QueryResponse::from)
            .map_err(|e| job_error(sql, e))
    }
}

fn job_error(sql: &str, err: BQError) -> AppError {
    AppError::Query {
        message: format!("BigQuery job failed: {}", err),
        query: sql.to_string(),
    }
}

/// Rejects a response whose job is still running; its rows would be empty.
fn ensure_complete(response: QueryResponse, sql: &str) -> Result<QueryResponse, AppError> {
    if response.job_complete == Some(true) {
        return Ok(response);
    }
    Err(AppError::Query {
        message: format!(
            "BigQuery job did not complete after {} polls",
            MAX_JOB_POLLS
        ),
        query: sql.to_string(),
    })
}

/// Converts every row of a result set into a [`Row`] keyed by column name.
fn collect_rows(mut result_set: ResultSet) -> Result<Vec<Row>, AppError> {
    let columns = result_set.column_names();

    let mut rows = Vec::with_capacity(result_set.row_count());
    while result_set.next_row() {
        let mut data = HashMap::with_capacity(columns.len());
        for column in &columns {
            let value = result_set
                .get_json_value_by_name(column)?
                .unwrap_or(JsonValue::Null);
            data.insert(column.clone(), value);
        }
        rows.push(Row::new(data));
    }
    Ok(rows)
}

#[async_trait]
impl SqlExecutor for BigQueryClient {
    async fn execute_sql(&self, sql: &str) -> Result<(), AppError> {
        self.run_job(sql).await?;
        Ok(())
    }

    async fn query_sql(&self, sql: &str) -> Result<RowStream<'_>, AppError> {
        let rows = collect_rows(self.run_job(sql).await?)?;
        Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok))))
    }
}

// ----------------------------------------------------------------------------
// Statements
// ----------------------------------------------------------------------------

/// Quotes a value as a BigQuery string literal.
pub fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn sql_int(value: Option<i64>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}

/// Fully-qualified names of the three demo tables.
#[derive(Debug, Clone)]
pub struct Tables {
    project: String,
    dataset: String,
}

impl Tables {
    pub fn new(project: &str, dataset: &str) -> Self {
        Self {
            project: project.to_string(),
            dataset: dataset.to_string(),
        }
    }

    fn table(&self, name: &str) -> String {
        format!("`{}.{}.{}`", self.project, self.dataset, name)
    }

    pub fn students(&self) -> String {
        self.table("students")
    }

    pub fn classes(&self) -> String {
        self.table("classes")
    }

    pub fn enrollments(&self) -> String {
        self.table("enrollments")
    }

    pub fn create_dataset(&self) -> String {
        format!(
            "CREATE SCHEMA IF NOT EXISTS `{}.{}`",
            self.project, self.dataset
        )
    }

    /// Drops then recreates the three tables, in execution order.
    pub fn reset_statements(&self) -> Vec<String> {
        let mut statements = vec![self.create_dataset()];
        for table in [self.students(), self.classes(), self.enrollments()] {
            statements.push(format!("DROP TABLE IF EXISTS {}", table));
        }
        statements.push(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  student_id INT64,\n  name STRING\n)",
            self.students()
        ));
        statements.push(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  class_id INT64,\n  title STRING,\n  credits INT64,\n  instructor STRING\n)",
            self.classes()
        ));
        statements.push(format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  student_id INT64,\n  class_id INT64\n)",
            self.enrollments()
        ));
        statements
    }

    pub fn insert_students(&self, students: &[Student]) -> Option<String> {
        values_statement(
            &format!("INSERT INTO {} (student_id, name) VALUES", self.students()),
            students
                .iter()
                .map(|s| format!("({}, {})", s.id, sql_string(&s.name))),
        )
    }

    pub fn insert_classes(&self, classes: &[Class]) -> Option<String> {
        values_statement(
            &format!(
                "INSERT INTO {} (class_id, title, credits, instructor) VALUES",
                self.classes()
            ),
            classes.iter().map(|c| {
                format!(
                    "({}, {}, {}, {})",
                    c.id,
                    sql_string(&c.title),
                    sql_int(c.credits),
                    sql_string(&c.instructor)
                )
            }),
        )
    }

    pub fn insert_enrollments(&self, enrollments: &[Enrollment]) -> Option<String> {
        values_statement(
            &format!(
                "INSERT INTO {} (student_id, class_id) VALUES",
                self.enrollments()
            ),
            enrollments
                .iter()
                .map(|e| format!("({}, {})", e.student_id, e.class_id)),
        )
    }

    pub fn students_in_class(&self, title: &str) -> String {
        format!(
            "SELECT s.name
FROM {students} s
JOIN {enrollments} e ON s.student_id = e.student_id
JOIN {classes} c ON e.class_id = c.class_id
WHERE c.title = {title}",
            students = self.students(),
            enrollments = self.enrollments(),
            classes = self.classes(),
            title = sql_string(title),
        )
    }

    pub fn classmates_of(&self, name: &str) -> String {
        format!(
            "WITH TargetClasses AS (
  SELECT e.class_id
  FROM {students} s
  JOIN {enrollments} e ON s.student_id = e.student_id
  WHERE s.name = {name}
)
SELECT DISTINCT s.name AS classmate_name, c.title AS class_title
FROM {students} s
JOIN {enrollments} e ON s.student_id = e.student_id
JOIN {classes} c ON e.class_id = c.class_id
JOIN TargetClasses tc ON e.class_id = tc.class_id
WHERE s.name != {name}",
            students = self.students(),
            enrollments = self.enrollments(),
            classes = self.classes(),
            name = sql_string(name),
        )
    }
}

/// Builds a multi-row `VALUES` statement; `None` when there are no rows.
fn values_statement(head: &str, rows: impl Iterator<Item = String>) -> Option<String> {
    let rows: Vec<String> = rows.map(|r| format!("  {}", r)).collect();
    if rows.is_empty() {
        return None;
    }
    Some(format!("{}\n{}", head, rows.join(",\n")))
}

// ----------------------------------------------------------------------------
// Backend
// ----------------------------------------------------------------------------

/// Warehouse backend over any [`SqlExecutor`].
pub struct WarehouseBackend<E = BigQueryClient> {
    executor: E,
    tables: Tables,
}

impl<E: SqlExecutor> WarehouseBackend<E> {
    pub fn new(executor: E, tables: Tables) -> Self {
        Self { executor, tables }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    async fn fetch_all(&self, sql: &str) -> Result<Vec<Row>, AppError> {
        use futures::TryStreamExt;
        self.executor.query_sql(sql).await?.try_collect().await
    }
}

impl WarehouseBackend<BigQueryClient> {
    /// Connects with the configured project and dataset.
    pub async fn connect(config: &BigQueryConfig) -> Result<Self, AppError> {
        let client = BigQueryClient::connect(config).await?;
        Ok(Self::new(
            client,
            Tables::new(&config.project, &config.dataset),
        ))
    }
}

#[async_trait]
impl<E: SqlExecutor> SchoolBackend for WarehouseBackend<E> {
    fn name(&self) -> &'static str {
        "bigquery"
    }

    async fn reset(&self) -> Result<(), AppError> {
        for statement in self.tables.reset_statements() {
            self.executor.execute_sql(&statement).await?;
        }
        Ok(())
    }

    async fn load(&self, dataset: &Dataset) -> Result<(), AppError> {
        let statements = [
            self.tables.insert_students(&dataset.students),
            self.tables.insert_classes(&dataset.classes),
            self.tables.insert_enrollments(&dataset.enrollments),
        ];
        for statement in statements.into_iter().flatten() {
            self.executor.execute_sql(&statement).await?;
        }
        Ok(())
    }

    async fn students_in_class(&self, title: &str) -> Result<Vec<String>, AppError> {
        self.fetch_all(&self.tables.students_in_class(title))
            .await?
            .iter()
            .map(|row| row.get("name"))
            .collect()
    }

    async fn classmates_of(&self, name: &str) -> Result<Vec<Classmate>, AppError> {
        let pairs = self
            .fetch_all(&self.tables.classmates_of(name))
            .await?
            .iter()
            .map(|row| Ok((row.get("classmate_name")?, row.get("class_title")?)))
            .collect::<Result<Vec<(String, String)>, AppError>>()?;

        Ok(Classmate::group(pairs))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::models::seed;

    /// Records statements; answers queries from canned rows keyed by a
    /// substring of the SQL.
    #[derive(Default)]
    struct MockExecutor {
        statements: Mutex<Vec<String>>,
        responses: Vec<(&'static str, Vec<Row>)>,
    }

    impl MockExecutor {
        fn statements(&self) -> Vec<String> {
            self.statements.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SqlExecutor for MockExecutor {
        async fn execute_sql(&self, sql: &str) -> Result<(), AppError> {
            self.statements.lock().unwrap().push(sql.to_string());
            Ok(())
        }

        async fn query_sql(&self, sql: &str) -> Result<RowStream<'_>, AppError> {
            self.statements.lock().unwrap().push(sql.to_string());
            let rows = self
                .responses
                .iter()
                .find(|(needle, _)| sql.contains(needle))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default();
            Ok(Box::pin(futures::stream::iter(rows.into_iter().map(Ok))))
        }
    }

    fn tables() -> Tables {
        Tables::new("school-with-classes", "school")
    }

    fn row(pairs: &[(&str, &str)]) -> Row {
        Row::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), json!(v)))
                .collect(),
        )
    }

    fn response(body: JsonValue) -> QueryResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_collect_rows_from_completed_response() {
        let response = response(json!({
            "jobComplete": true,
            "schema": { "fields": [
                { "name": "classmate_name", "type": "STRING" },
                { "name": "class_title", "type": "STRING" }
            ] },
            "rows": [
                { "f": [{ "v": "Bob" }, { "v": "Database Systems" }] },
                { "f": [{ "v": "Cara" }, { "v": "Data Science" }] }
            ]
        }));

        let complete = ensure_complete(response, "SELECT 1").unwrap();
        let rows = collect_rows(ResultSet::new_from_query_response(complete)).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get::<String>("classmate_name").unwrap(), "Bob");
        assert_eq!(rows[1].get::<String>("class_title").unwrap(), "Data Science");
    }

    #[test]
    fn test_null_cell_becomes_json_null() {
        let response = response(json!({
            "jobComplete": true,
            "schema": { "fields": [{ "name": "credits", "type": "INT64" }] },
            "rows": [{ "f": [{ "v": null }] }]
        }));

        let rows = collect_rows(ResultSet::new_from_query_response(response)).unwrap();
        assert_eq!(rows[0].get::<Option<i64>>("credits").unwrap(), None);
    }

    #[test]
    fn test_unfinished_job_is_an_error() {
        let response = response(json!({
            "jobComplete": false,
            "jobReference": { "projectId": "school-with-classes", "jobId": "job_123" }
        }));

        let result = ensure_complete(response, "SELECT s.name FROM t");
        assert!(matches!(
            result,
            Err(AppError::Query { query, .. }) if query == "SELECT s.name FROM t"
        ));
    }

    #[test]
    fn test_ddl_response_has_no_rows() {
        let response = response(json!({ "jobComplete": true }));
        let complete = ensure_complete(response, "DROP TABLE IF EXISTS t").unwrap();
        let rows = collect_rows(ResultSet::new_from_query_response(complete)).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_sql_string_escapes_quotes() {
        assert_eq!(sql_string("Alice"), "'Alice'");
        assert_eq!(sql_string("O'Neil"), r"'O\'Neil'");
        assert_eq!(sql_string(r"a\b"), r"'a\\b'");
    }

    #[test]
    fn test_table_names_are_fully_qualified() {
        assert_eq!(tables().students(), "`school-with-classes.school.students`");
    }

    #[test]
    fn test_reset_statements_drop_before_create() {
        let statements = tables().reset_statements();
        assert_eq!(statements.len(), 7);
        assert_eq!(
            statements[0],
            "CREATE SCHEMA IF NOT EXISTS `school-with-classes.school`"
        );
        assert!(statements[1..4]
            .iter()
            .all(|s| s.starts_with("DROP TABLE IF EXISTS")));
        assert!(statements[4..]
            .iter()
            .all(|s| s.starts_with("CREATE TABLE IF NOT EXISTS")));
        assert!(statements[5].contains("credits INT64"));
    }

    #[test]
    fn test_insert_classes_statement() {
        let sql = tables()
            .insert_classes(&seed::warehouse().classes)
            .unwrap();
        assert_eq!(
            sql,
            "INSERT INTO `school-with-classes.school.classes` (class_id, title, credits, instructor) VALUES
  (2433, 'Database Systems', 3, 'Dr. Jean-Claude'),
  (404, 'Data Science', 3, 'Prof. Herodotus')"
        );
    }

    #[test]
    fn test_insert_null_credits() {
        let sql = tables().insert_classes(&seed::graph().classes).unwrap();
        assert!(sql.contains("(404, 'Data Science', NULL, 'Prof. Herodotus')"));
    }

    #[test]
    fn test_insert_nothing_is_skipped() {
        assert!(tables().insert_students(&[]).is_none());
    }

    #[test]
    fn test_classmates_query_excludes_target() {
        let sql = tables().classmates_of("Alice");
        assert!(sql.contains("WHERE s.name = 'Alice'"));
        assert!(sql.contains("WHERE s.name != 'Alice'"));
        assert!(sql.contains("SELECT DISTINCT"));
    }

    #[tokio::test]
    async fn test_reset_then_load_statement_order() {
        let backend = WarehouseBackend::new(MockExecutor::default(), tables());
        backend.reset().await.unwrap();
        backend.load(&seed::warehouse()).await.unwrap();

        let statements = backend.executor().statements();
        assert_eq!(statements.len(), 10);
        assert!(statements[7].starts_with("INSERT INTO `school-with-classes.school.students`"));
        assert!(statements[7].contains("(3, 'Cara')"));
        assert!(statements[9].contains("(1, 2433),\n  (1, 404),\n  (2, 2433),\n  (3, 404)"));
    }

    #[tokio::test]
    async fn test_queries_read_named_columns() {
        let executor = MockExecutor {
            responses: vec![
                (
                    "WITH TargetClasses",
                    vec![
                        row(&[("classmate_name", "Bob"), ("class_title", "Database Systems")]),
                        row(&[("classmate_name", "Cara"), ("class_title", "Data Science")]),
                    ],
                ),
                (
                    "WHERE c.title",
                    vec![row(&[("name", "Alice")]), row(&[("name", "Cara")])],
                ),
            ],
            ..Default::default()
        };
        let backend = WarehouseBackend::new(executor, tables());

        let names = backend.students_in_class("Data Science").await.unwrap();
        assert_eq!(names, vec!["Alice", "Cara"]);

        let classmates = backend.classmates_of("Alice").await.unwrap();
        assert_eq!(classmates.len(), 2);
        assert_eq!(classmates[0].name, "Bob");
        assert_eq!(classmates[1].classes, vec!["Data Science"]);
    }
}
