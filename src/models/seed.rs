//! Fixed seed data, one flavour per backend.
//!
//! All three share the same students and enrollments. Class titles,
//! instructors and the extra attributes differ slightly between backends.

use super::{Class, Dataset, Enrollment, Schedule, Student};

fn enrollments() -> Vec<Enrollment> {
    vec![
        Enrollment::new(1, 2433),
        Enrollment::new(1, 404),
        Enrollment::new(2, 2433),
        Enrollment::new(3, 404),
    ]
}

/// Rows for the BigQuery tables.
pub fn warehouse() -> Dataset {
    Dataset {
        students: vec![
            Student::new(1, "Alice"),
            Student::new(2, "Bob"),
            Student::new(3, "Cara"),
        ],
        classes: vec![
            Class::new(2433, "Database Systems", "Dr. Jean-Claude").with_credits(3),
            Class::new(404, "Data Science", "Prof. Herodotus").with_credits(3),
        ],
        enrollments: enrollments(),
    }
}

/// Documents for the MongoDB collections, with term and meeting times.
pub fn document() -> Dataset {
    Dataset {
        students: vec![
            Student::new(1, "Alice"),
            Student::new(2, "Bob"),
            Student::new(3, "Cara"),
        ],
        classes: vec![
            Class::new(2433, "Database", "Dr.Jean-Claude")
                .with_credits(3)
                .with_schedule(Schedule::new("Fall 2025", &["Thursday"], "5:55–7:30")),
            Class::new(404, "Data Science", "Dr. Herodotus")
                .with_credits(3)
                .with_schedule(Schedule::new("Fall 2025", &["Tue", "Thu"], "13:00–14:15")),
        ],
        enrollments: enrollments(),
    }
}

/// Nodes for the Neo4j graph. Students carry ages, classes have no credits.
pub fn graph() -> Dataset {
    Dataset {
        students: vec![
            Student::new(1, "Alice").with_age(20),
            Student::new(2, "Bob").with_age(22),
            Student::new(3, "Cara").with_age(100),
        ],
        classes: vec![
            Class::new(2433, "Database Systems", "Dr. Jean-Claude"),
            Class::new(404, "Data Science", "Prof. Herodotus"),
        ],
        enrollments: enrollments(),
    }
}
