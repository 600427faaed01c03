//! CLI module for classmates.
//!
//! Subcommands, one per backend:
//! - `bigquery`: columnar warehouse
//! - `mongo`: document store
//! - `neo4j`: graph database
//! - `memory`: in-process, no credentials needed

mod bigquery;
mod memory;
mod mongo;
mod neo4j;

use clap::{Parser, Subcommand};
use color_eyre::Result;

use crate::backends::SchoolBackend;
use crate::config::{Config, DemoConfig};
use crate::demo::DemoRunner;
use crate::models::Dataset;

pub use memory::SeedChoice;

/// Classmates - students, classes and enrollments across three databases
#[derive(Parser)]
#[command(name = "classmates")]
#[command(about = "Load a small school dataset into a database and query who studies together")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Class whose students are listed (default: "Data Science")
    #[arg(long = "class", global = true, value_name = "TITLE")]
    pub class_title: Option<String>,

    /// Student whose classmates are listed (default: "Alice")
    #[arg(long = "student", global = true, value_name = "NAME")]
    pub student_name: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the demo against BigQuery
    Bigquery,

    /// Run the demo against MongoDB
    Mongo,

    /// Run the demo against Neo4j
    Neo4j,

    /// Run the demo against the in-process backend
    Memory {
        /// Which backend's seed data to load
        #[arg(long, value_enum, default_value_t = SeedChoice::Warehouse)]
        seed: SeedChoice,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        match self.command {
            Command::Bigquery => self.run_bigquery(&config).await,
            Command::Mongo => self.run_mongo(&config).await,
            Command::Neo4j => self.run_neo4j(&config).await,
            Command::Memory { seed } => self.run_memory(&config, seed).await,
        }
    }

    /// Query targets from config, with command-line overrides applied.
    fn demo_options(&self, config: &Config) -> DemoConfig {
        let mut options = config.demo.clone();
        if let Some(title) = &self.class_title {
            options.class_title = title.clone();
        }
        if let Some(name) = &self.student_name {
            options.student_name = name.clone();
        }
        options
    }

    async fn run_demo<B: SchoolBackend>(
        &self,
        config: &Config,
        backend: B,
        dataset: Dataset,
    ) -> Result<()> {
        let runner = DemoRunner::new(backend, dataset, self.demo_options(config));
        let mut stdout = std::io::stdout().lock();
        runner.run(&mut stdout).await?;
        tracing::info!("Demo complete");
        Ok(())
    }
}
