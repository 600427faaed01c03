//! Neo4j command handler.

use color_eyre::Result;

use crate::backends::neo4j::{GraphBackend, Neo4jClient};
use crate::config::Config;
use crate::models::seed;

use super::App;

impl App {
    /// Run the demo against the configured Neo4j instance.
    pub async fn run_neo4j(&self, config: &Config) -> Result<()> {
        let client = Neo4jClient::connect(&config.neo4j).await?;
        self.run_demo(config, GraphBackend::new(client), seed::graph())
            .await
    }
}
