use crate::{
    error::{BatchError, Result},
    models::{GeneratedImage, GenerationRequest, GenerationResult},
    services::traits::ImageGenerator,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{header, Client, StatusCode};

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    endpoint: String,
}

impl ImageClient {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let model = request.model.as_deref().unwrap_or("default");
        log::info!(
            "Generating image with {} steps using {}{}",
            request.steps,
            model,
            if request.is_img2img() { " (img2img)" } else { "" }
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Could not reach image service at {}: {}", self.endpoint, e);
                BatchError::RequestError(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            log::error!("Error generating image: {}, {}", status.as_u16(), body);
            return Err(BatchError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let result: GenerationResult = serde_json::from_str(&body).map_err(|e| {
            log::error!("Error generating image: {}, {}", status.as_u16(), body);
            BatchError::ResponseError(e.to_string())
        })?;

        let first = match result.images.first() {
            Some(image) => image,
            None => {
                log::error!("Error generating image: {}, {}", status.as_u16(), body);
                return Err(BatchError::EmptyResult("No images generated".into()));
            }
        };

        let bytes = STANDARD
            .decode(first.trim())
            .map_err(|e| BatchError::DecodeError(e.to_string()))?;

        log::debug!("Decoded {} image bytes", bytes.len());

        Ok(GeneratedImage {
            bytes,
            model: request.model.clone(),
        })
    }
}
