//! In-process command handler.

use clap::ValueEnum;
use color_eyre::Result;

use crate::backends::MemoryBackend;
use crate::config::Config;
use crate::models::{seed, Dataset};

use super::App;

/// Which backend's flavour of the seed data to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeedChoice {
    Warehouse,
    Document,
    Graph,
}

impl SeedChoice {
    pub fn dataset(self) -> Dataset {
        match self {
            SeedChoice::Warehouse => seed::warehouse(),
            SeedChoice::Document => seed::document(),
            SeedChoice::Graph => seed::graph(),
        }
    }
}

impl App {
    /// Run the demo without any external service.
    pub async fn run_memory(&self, config: &Config, seed: SeedChoice) -> Result<()> {
        tracing::info!("Using in-process backend with {:?} seed", seed);
        self.run_demo(config, MemoryBackend::new(), seed.dataset())
            .await
    }
}
