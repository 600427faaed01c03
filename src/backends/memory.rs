//! In-process backend holding the dataset behind a mutex.
//!
//! Answers the same queries as the remote backends without any service,
//! which makes it the offline demo target and the reference the tests
//! check the relationship semantics against.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::SchoolBackend;
use crate::error::AppError;
use crate::models::{Classmate, Dataset};

/// Backend keeping every row in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: Mutex<Dataset>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> Result<Dataset, AppError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Dataset>, AppError> {
        self.data
            .lock()
            .map_err(|_| AppError::Internal("memory backend lock poisoned".into()))
    }
}

#[async_trait]
impl SchoolBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn reset(&self) -> Result<(), AppError> {
        *self.lock()? = Dataset::default();
        Ok(())
    }

    async fn load(&self, dataset: &Dataset) -> Result<(), AppError> {
        // Appends, like an INSERT: a run without reset would duplicate rows.
        let mut data = self.lock()?;
        data.students.extend(dataset.students.iter().cloned());
        data.classes.extend(dataset.classes.iter().cloned());
        data.enrollments.extend(dataset.enrollments.iter().copied());
        Ok(())
    }

    async fn students_in_class(&self, title: &str) -> Result<Vec<String>, AppError> {
        let data = self.lock()?;
        let class_ids: Vec<i64> = data
            .classes
            .iter()
            .filter(|c| c.title == title)
            .map(|c| c.id)
            .collect();

        // Join order follows the enrollments, as a join row scan would.
        Ok(data
            .enrollments
            .iter()
            .filter(|e| class_ids.contains(&e.class_id))
            .filter_map(|e| data.student(e.student_id))
            .map(|s| s.name.clone())
            .collect())
    }

    async fn classmates_of(&self, name: &str) -> Result<Vec<Classmate>, AppError> {
        let data = self.lock()?;
        let own_classes: Vec<i64> = data
            .students
            .iter()
            .filter(|s| s.name == name)
            .flat_map(|s| data.courses_of(s.id))
            .collect();

        let pairs = data
            .enrollments
            .iter()
            .filter(|e| own_classes.contains(&e.class_id))
            .filter_map(|e| Some((data.student(e.student_id)?, data.class(e.class_id)?)))
            .filter(|(student, _)| student.name != name)
            .map(|(student, class)| (student.name.clone(), class.title.clone()))
            .collect::<Vec<_>>();

        Ok(Classmate::group(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed;

    async fn seeded(dataset: &Dataset) -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.reset().await.unwrap();
        backend.load(dataset).await.unwrap();
        backend
    }

    #[tokio::test]
    async fn test_students_in_class() {
        let backend = seeded(&seed::warehouse()).await;

        let mut names = backend.students_in_class("Data Science").await.unwrap();
        names.sort();
        assert_eq!(names, vec!["Alice", "Cara"]);
    }

    #[tokio::test]
    async fn test_unknown_class_is_empty() {
        let backend = seeded(&seed::warehouse()).await;
        let names = backend.students_in_class("Astrophysics").await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_classmates_of_alice() {
        let backend = seeded(&seed::document()).await;

        let classmates = backend.classmates_of("Alice").await.unwrap();
        assert_eq!(
            classmates,
            vec![
                Classmate {
                    name: "Bob".into(),
                    classes: vec!["Database".into()],
                },
                Classmate {
                    name: "Cara".into(),
                    classes: vec!["Data Science".into()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_load_without_reset_duplicates() {
        let backend = seeded(&seed::graph()).await;
        backend.load(&seed::graph()).await.unwrap();

        let snapshot = backend.snapshot().unwrap();
        assert_eq!(snapshot.students.len(), 6);
    }

    #[tokio::test]
    async fn test_reset_clears() {
        let backend = seeded(&seed::graph()).await;
        backend.reset().await.unwrap();
        assert_eq!(backend.snapshot().unwrap(), Dataset::default());
    }
}
