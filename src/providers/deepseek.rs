use super::LLMProvider;
use crate::core::error::AssistError;
use crate::providers::openai_compatible::OpenAICompatibleProvider;
use std::time::Duration;

#[derive(Clone)]
pub struct DeepSeekProvider {
    inner: OpenAICompatibleProvider,
}

impl DeepSeekProvider {
    pub fn with_endpoint(
        endpoint: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AssistError> {
        Ok(Self {
            inner: OpenAICompatibleProvider::new(endpoint, api_key, model, timeout)?,
        })
    }
}

#[async_trait::async_trait]
impl LLMProvider for DeepSeekProvider {
    fn name(&self) -> &str {
        "deepseek"
    }

    async fn get_response(&self, messages: &[super::Message]) -> Result<String, AssistError> {
        self.inner.get_response(self.name(), messages).await
    }
}
