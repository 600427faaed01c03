//! The students/classes/enrollments bundle loaded into every backend.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Class, Enrollment, Student};
use crate::error::AppError;

/// A complete set of rows for one demo run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub students: Vec<Student>,
    pub classes: Vec<Class>,
    pub enrollments: Vec<Enrollment>,
}

impl Dataset {
    pub fn student(&self, id: i64) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn class(&self, id: i64) -> Option<&Class> {
        self.classes.iter().find(|c| c.id == id)
    }

    /// Class ids a student is enrolled in, in enrollment order.
    pub fn courses_of(&self, student_id: i64) -> Vec<i64> {
        self.enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .map(|e| e.class_id)
            .collect()
    }

    /// Drops the named student's row but keeps their enrollments.
    pub fn without_student(mut self, name: &str) -> Self {
        self.students.retain(|s| s.name != name);
        self
    }

    /// Checks ids are unique and every enrollment resolves to a seeded row.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut student_ids = HashSet::new();
        for student in &self.students {
            if !student_ids.insert(student.id) {
                return Err(AppError::DuplicateId {
                    kind: "student",
                    id: student.id,
                });
            }
        }

        let mut class_ids = HashSet::new();
        for class in &self.classes {
            if !class_ids.insert(class.id) {
                return Err(AppError::DuplicateId {
                    kind: "class",
                    id: class.id,
                });
            }
        }

        for enrollment in &self.enrollments {
            if !student_ids.contains(&enrollment.student_id) {
                return Err(AppError::DanglingEnrollment {
                    kind: "student",
                    id: enrollment.student_id,
                });
            }
            if !class_ids.contains(&enrollment.class_id) {
                return Err(AppError::DanglingEnrollment {
                    kind: "class",
                    id: enrollment.class_id,
                });
            }
        }

        Ok(())
    }
}
