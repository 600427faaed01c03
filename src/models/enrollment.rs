//! Enrollment association and query result types.

use serde::{Deserialize, Serialize};

/// Links one student to one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: i64,
    pub class_id: i64,
}

impl Enrollment {
    pub fn new(student_id: i64, class_id: i64) -> Self {
        Self {
            student_id,
            class_id,
        }
    }
}

/// A student who shares at least one class with the queried student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classmate {
    pub name: String,
    /// Titles of the shared classes, in backend order.
    pub classes: Vec<String>,
}

impl Classmate {
    /// Folds `(name, class title)` pairs into one entry per classmate.
    ///
    /// Entries keep the order in which each name first appears and each
    /// title is listed once.
    pub fn group<I>(pairs: I) -> Vec<Classmate>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut grouped: Vec<Classmate> = Vec::new();
        for (name, title) in pairs {
            match grouped.iter_mut().find(|c| c.name == name) {
                Some(existing) => {
                    if !existing.classes.contains(&title) {
                        existing.classes.push(title);
                    }
                }
                None => grouped.push(Classmate {
                    name,
                    classes: vec![title],
                }),
            }
        }
        grouped
    }
}

impl std::fmt::Display for Classmate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is also enrolled in {}",
            self.name,
            self.classes.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(name: &str, title: &str) -> (String, String) {
        (name.to_string(), title.to_string())
    }

    #[test]
    fn test_group_keeps_first_seen_order() {
        let grouped = Classmate::group(vec![
            pair("Cara", "Data Science"),
            pair("Bob", "Database Systems"),
            pair("Cara", "Compilers"),
        ]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].name, "Cara");
        assert_eq!(grouped[0].classes, vec!["Data Science", "Compilers"]);
        assert_eq!(grouped[1].name, "Bob");
    }

    #[test]
    fn test_group_drops_repeated_titles() {
        let grouped = Classmate::group(vec![
            pair("Bob", "Database Systems"),
            pair("Bob", "Database Systems"),
        ]);
        assert_eq!(grouped[0].classes, vec!["Database Systems"]);
    }

    #[test]
    fn test_display_joins_titles() {
        let classmate = Classmate {
            name: "Bob".into(),
            classes: vec!["Database".into(), "Data Science".into()],
        };
        assert_eq!(
            classmate.to_string(),
            "Bob is also enrolled in Database, Data Science"
        );
    }
}
