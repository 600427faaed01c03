//! Classmates - one school dataset, three databases
//!
//! Loads the same students, classes and enrollments into BigQuery, MongoDB
//! or Neo4j and asks two relationship questions of each.

pub mod backends;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod models;
pub mod store;
