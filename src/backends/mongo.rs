//! MongoDB backend: `students` documents embed their class ids in `courses`.
//!
//! The classmate query runs as an aggregation pipeline: set intersection on
//! the `courses` arrays, then a correlated `$lookup` into `classes` for the
//! shared titles.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use super::SchoolBackend;
use crate::config::MongoConfig;
use crate::error::AppError;
use crate::models::{Class, Classmate, Dataset, Meeting};

const STUDENTS: &str = "students";
const CLASSES: &str = "classes";

/// Student as stored: enrollments live in the `courses` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub courses: Vec<i64>,
}

/// Class as stored, with the scheduling fields flattened to the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<i64>,
    pub instructor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting: Option<Meeting>,
}

impl From<&Class> for ClassDocument {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            title: class.title.clone(),
            credits: class.credits,
            instructor: class.instructor.clone(),
            term: class.schedule.as_ref().map(|s| s.term.clone()),
            meeting: class.schedule.as_ref().map(|s| s.meeting.clone()),
        }
    }
}

/// One aggregation result: a classmate and the titles they share.
#[derive(Debug, Deserialize)]
struct OverlapDocument {
    name: String,
    #[serde(default)]
    overlap_titles: Vec<String>,
}

/// Builds the student documents, folding enrollments into `courses`.
pub fn student_documents(dataset: &Dataset) -> Vec<StudentDocument> {
    dataset
        .students
        .iter()
        .map(|s| StudentDocument {
            id: s.id,
            name: s.name.clone(),
            courses: dataset.courses_of(s.id),
        })
        .collect()
}

/// Aggregation over `students` finding everyone sharing a class with the
/// given student, with the shared class titles.
pub fn classmates_pipeline(student_id: i64, courses: &[i64]) -> Vec<Document> {
    let courses = courses.to_vec();
    vec![
        doc! { "$match": { "_id": { "$ne": student_id } } },
        doc! { "$addFields": { "overlap_ids": { "$setIntersection": ["$courses", courses] } } },
        doc! { "$match": { "$expr": { "$gt": [{ "$size": "$overlap_ids" }, 0] } } },
        doc! {
            "$lookup": {
                "from": CLASSES,
                "let": { "overlap_ids": "$overlap_ids" },
                "pipeline": [
                    { "$match": { "$expr": { "$in": ["$_id", "$$overlap_ids"] } } },
                    { "$project": { "_id": 0, "title": 1 } }
                ],
                "as": "overlap"
            }
        },
        doc! { "$project": { "_id": 0, "name": 1, "overlap_titles": "$overlap.title" } },
    ]
}

/// Maps driver errors raised while parsing or resolving the connection
/// string to [`AppError::InvalidConnectionString`].
fn connect_error(err: mongodb::error::Error) -> AppError {
    match err.kind.as_ref() {
        ErrorKind::InvalidArgument { .. } | ErrorKind::DnsResolve { .. } => {
            AppError::InvalidConnectionString(err.to_string())
        }
        _ => AppError::Mongo(err),
    }
}

/// Document backend over a MongoDB database.
pub struct DocumentBackend {
    students: Collection<StudentDocument>,
    classes: Collection<ClassDocument>,
}

impl DocumentBackend {
    /// Connects, pings the deployment and opens the two collections.
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        config.validate()?;

        tracing::info!("Connecting to MongoDB database '{}'", config.database);
        let client = Client::with_uri_str(&config.uri)
            .await
            .map_err(connect_error)?;
        let db = client.database(&config.database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(connect_error)?;
        tracing::info!("Connected to MongoDB");

        Ok(Self {
            students: db.collection(STUDENTS),
            classes: db.collection(CLASSES),
        })
    }

    async fn create_indexes(&self) -> Result<(), AppError> {
        // _id is indexed already; these cover the two lookups.
        for keys in [doc! { "name": 1 }, doc! { "courses": 1 }] {
            self.students
                .create_index(IndexModel::builder().keys(keys).build())
                .await?;
        }
        self.classes
            .create_index(IndexModel::builder().keys(doc! { "title": 1 }).build())
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SchoolBackend for DocumentBackend {
    fn name(&self) -> &'static str {
        "mongo"
    }

    async fn reset(&self) -> Result<(), AppError> {
        let students = self.students.delete_many(doc! {}).await?;
        let classes = self.classes.delete_many(doc! {}).await?;
        tracing::debug!(
            students = students.deleted_count,
            classes = classes.deleted_count,
            "Deleted existing documents"
        );
        Ok(())
    }

    async fn load(&self, dataset: &Dataset) -> Result<(), AppError> {
        let students = student_documents(dataset);
        if !students.is_empty() {
            self.students.insert_many(&students).await?;
        }

        let classes: Vec<ClassDocument> = dataset.classes.iter().map(ClassDocument::from).collect();
        if !classes.is_empty() {
            self.classes.insert_many(&classes).await?;
        }

        self.create_indexes().await
    }

    async fn students_in_class(&self, title: &str) -> Result<Vec<String>, AppError> {
        let class = self
            .classes
            .clone_with_type::<Document>()
            .find_one(doc! { "title": title })
            .projection(doc! { "_id": 1 })
            .await?;

        let Some(class) = class else {
            tracing::warn!("No course titled '{}' found.", title);
            return Ok(Vec::new());
        };
        let class_id = class.get("_id").cloned().unwrap_or(Bson::Null);

        let students: Vec<Document> = self
            .students
            .clone_with_type::<Document>()
            .find(doc! { "courses": class_id })
            .projection(doc! { "_id": 0, "name": 1 })
            .await?
            .try_collect()
            .await?;

        students
            .iter()
            .map(|d| {
                d.get_str("name")
                    .map(str::to_string)
                    .map_err(|e| AppError::Internal(format!("student without a name: {}", e)))
            })
            .collect()
    }

    async fn classmates_of(&self, name: &str) -> Result<Vec<Classmate>, AppError> {
        let Some(student) = self.students.find_one(doc! { "name": name }).await? else {
            tracing::warn!("{} not found in the database.", name);
            return Ok(Vec::new());
        };

        let results: Vec<Document> = self
            .students
            .aggregate(classmates_pipeline(student.id, &student.courses))
            .await?
            .try_collect()
            .await?;

        results
            .into_iter()
            .map(|d| {
                let overlap: OverlapDocument = bson::from_document(d).map_err(|e| {
                    AppError::Internal(format!("unexpected aggregation result: {}", e))
                })?;
                Ok(Classmate {
                    name: overlap.name,
                    classes: overlap.overlap_titles,
                })
            })
            .collect()
    }
}
