use crate::core::error::AssistError;
use crate::providers::base_client::HttpClient;
use crate::providers::Message;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 1000;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    content: Option<String>,
}

/// Chat completions against any OpenAI-compatible `/chat/completions` API.
#[derive(Clone)]
pub struct OpenAICompatibleProvider {
    client: HttpClient,
    api_key_present: bool,
    model: String,
}

impl OpenAICompatibleProvider {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AssistError> {
        let auth_header = api_key
            .as_ref()
            .map(|key| ("Authorization".to_string(), format!("Bearer {}", key)));

        Ok(Self {
            client: HttpClient::new(base_url, auth_header, timeout)?,
            api_key_present: api_key.is_some(),
            model,
        })
    }

    pub async fn get_response(
        &self,
        provider_name: &str,
        messages: &[Message],
    ) -> Result<String, AssistError> {
        if !self.api_key_present {
            return Err(AssistError::Config(format!(
                "no API key configured for {}",
                provider_name
            )));
        }

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        tracing::debug!(
            "{}: sending {} messages to {}",
            provider_name,
            messages.len(),
            self.model
        );

        let response = self.client.post("chat/completions", &payload).await?;
        let response_body: String = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&response_body)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(AssistError::Api(format!(
                "{} returned no content",
                provider_name
            )));
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Role;

    fn provider(url: &str, key: Option<&str>) -> OpenAICompatibleProvider {
        OpenAICompatibleProvider::new(
            url.to_string(),
            key.map(str::to_string),
            "test-model".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn completion_returns_trimmed_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "test-model",
                "temperature": 0.7,
                "max_tokens": 1000,
                "messages": [{"role": "user", "content": "円を描いて"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"  (command \"CIRCLE\" \"0,0\" 10)\n"},"finish_reason":"stop"}]}"#,
            )
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "円を描いて")];
        let result = provider(&server.url(), Some("sk-test"))
            .get_response("groq", &messages)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, "(command \"CIRCLE\" \"0,0\" 10)");
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"invalid key"}}"#)
            .create_async()
            .await;

        let result = provider(&server.url(), Some("bad"))
            .get_response("deepseek", &[Message::new(Role::User, "hi")])
            .await;

        match result {
            Err(AssistError::Api(msg)) => assert!(msg.contains("401")),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let result = provider(&server.url(), Some("k"))
            .get_response("groq", &[Message::new(Role::User, "hi")])
            .await;
        assert!(matches!(result, Err(AssistError::Api(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let result = provider(&server.url(), None)
            .get_response("groq", &[Message::new(Role::User, "hi")])
            .await;

        mock.assert_async().await;
        assert!(matches!(result, Err(AssistError::Config(_))));
    }
}
