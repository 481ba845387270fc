pub mod image_client;
pub mod text_client;
pub mod traits;

use crate::{
    config::PipelineConfig,
    error::{BatchError, Result},
};
use reqwest::Client;

pub use image_client::ImageClient;
pub use text_client::TextClient;
pub use traits::{DescriptionGenerator, ImageGenerator};

/// Both local services behind one shared HTTP connection pool.
#[derive(Clone)]
pub struct ServiceClients {
    image_client: ImageClient,
    text_client: TextClient,
}

impl ServiceClients {
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        // No request timeout: a slow local render is not a failure.
        let client = Client::builder()
            .build()
            .map_err(|e| BatchError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            image_client: ImageClient::new(client.clone(), config.image_endpoint.clone()),
            text_client: TextClient::new(client, config.language_model.clone()),
        })
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn text(&self) -> &TextClient {
        &self.text_client
    }
}
