//! MongoDB command handler.

use color_eyre::Result;

use crate::backends::DocumentBackend;
use crate::config::Config;
use crate::models::seed;

use super::App;

impl App {
    /// Run the demo against the configured MongoDB deployment.
    pub async fn run_mongo(&self, config: &Config) -> Result<()> {
        let backend = DocumentBackend::connect(&config.mongo).await?;
        self.run_demo(config, backend, seed::document()).await
    }
}
