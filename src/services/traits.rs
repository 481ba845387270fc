use crate::{
    error::Result,
    models::{GeneratedImage, GenerationRequest},
};
use async_trait::async_trait;

/// Submit a generation request and get back the first decoded image.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage>;
}

/// Turn slide text into an image description.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync {
    async fn describe(&self, slide_text: &str) -> Result<String>;
}
