//! Wipe, seed, query and print against a single backend.

use std::io::Write;

use serde::Serialize;

use crate::backends::SchoolBackend;
use crate::config::DemoConfig;
use crate::error::AppError;
use crate::models::{Classmate, Dataset};

/// Results of the two relationship queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DemoReport {
    pub class_title: String,
    /// Students enrolled in `class_title`, in backend order.
    pub enrolled: Vec<String>,
    pub student_name: String,
    /// Students sharing a class with `student_name`, in backend order.
    pub classmates: Vec<Classmate>,
}

impl DemoReport {
    /// Writes both result sets, one record per line.
    pub fn render<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "Students enrolled in {}:", self.class_title)?;
        for name in &self.enrolled {
            writeln!(out, " - {}", name)?;
        }

        writeln!(out)?;
        writeln!(out, "Students who share classes with {}:", self.student_name)?;
        for classmate in &self.classmates {
            writeln!(out, "{}", classmate)?;
        }
        writeln!(out)?;
        Ok(())
    }
}

/// Runs the demo sequence against one backend.
pub struct DemoRunner<B> {
    backend: B,
    dataset: Dataset,
    options: DemoConfig,
}

impl<B: SchoolBackend> DemoRunner<B> {
    pub fn new(backend: B, dataset: Dataset, options: DemoConfig) -> Self {
        Self {
            backend,
            dataset,
            options,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Wipes previous demo data and loads the seed.
    ///
    /// With `verify_references` set, a seed whose enrollments do not
    /// resolve is rejected before anything is deleted.
    pub async fn prepare(&self) -> Result<(), AppError> {
        if self.options.verify_references {
            self.dataset.validate()?;
        }

        tracing::info!("Clearing existing {} demo data", self.backend.name());
        self.backend.reset().await?;

        tracing::info!(
            students = self.dataset.students.len(),
            classes = self.dataset.classes.len(),
            enrollments = self.dataset.enrollments.len(),
            "Loading seed data"
        );
        self.backend.load(&self.dataset).await
    }

    /// Runs the two relationship queries.
    pub async fn query(&self) -> Result<DemoReport, AppError> {
        let class_title = self.options.class_title.clone();
        let student_name = self.options.student_name.clone();

        tracing::debug!(%class_title, "Querying students in class");
        let enrolled = self.backend.students_in_class(&class_title).await?;

        tracing::debug!(%student_name, "Querying classmates");
        let classmates = self.backend.classmates_of(&student_name).await?;

        Ok(DemoReport {
            class_title,
            enrolled,
            student_name,
            classmates,
        })
    }

    /// Full sequence: prepare, query, print, then release the backend.
    ///
    /// The backend is closed even when an earlier step fails; that
    /// step's error takes precedence.
    pub async fn run<W: Write>(self, out: &mut W) -> Result<DemoReport, AppError> {
        let outcome = self.report_to(out).await;
        let closed = self.backend.close().await;
        let report = outcome?;
        closed?;
        Ok(report)
    }

    async fn report_to<W: Write>(&self, out: &mut W) -> Result<DemoReport, AppError> {
        self.prepare().await?;
        let report = self.query().await?;
        report.render(out)?;
        Ok(report)
    }
}
