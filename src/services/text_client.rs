use crate::{
    config::LanguageModelConfig,
    error::{BatchError, Result},
    models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
    services::traits::DescriptionGenerator,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

/// Chat-completions client for a local LM Studio server.
#[derive(Clone)]
pub struct TextClient {
    client: Client,
    config: LanguageModelConfig,
}

impl TextClient {
    pub fn new(client: Client, config: LanguageModelConfig) -> Self {
        Self { client, config }
    }

    pub fn build_request(&self, slide_text: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            messages: vec![
                ChatMessage::system(self.config.system_prompt.clone()),
                ChatMessage::user(slide_text),
            ],
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
            reset_history: true,
        }
    }
}

#[async_trait]
impl DescriptionGenerator for TextClient {
    async fn describe(&self, slide_text: &str) -> Result<String> {
        let request = self.build_request(slide_text);

        log::info!("Invoking model: {}", self.config.model);
        log::debug!("Description request for {} chars of slide text", slide_text.len());

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            log::error!(
                "Error generating description. Status code: {}",
                status.as_u16()
            );
            return Err(BatchError::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BatchError::ResponseError(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| BatchError::EmptyResult("No description generated".into()))
    }
}
