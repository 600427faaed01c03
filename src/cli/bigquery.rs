//! BigQuery command handler.

use color_eyre::Result;

use crate::backends::WarehouseBackend;
use crate::config::Config;
use crate::models::seed;

use super::App;

impl App {
    /// Run the demo against the configured BigQuery dataset.
    pub async fn run_bigquery(&self, config: &Config) -> Result<()> {
        tracing::info!(
            "Using BigQuery dataset {}.{}",
            config.bigquery.project,
            config.bigquery.dataset
        );
        let backend = WarehouseBackend::connect(&config.bigquery).await?;
        self.run_demo(config, backend, seed::warehouse()).await
    }
}
