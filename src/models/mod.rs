//! Domain models for the school demo.

mod class;
mod dataset;
mod enrollment;
mod student;

pub mod seed;

pub use class::{Class, Meeting, Schedule};
pub use dataset::Dataset;
pub use enrollment::{Classmate, Enrollment};
pub use student::Student;
