use crate::core::error::AssistError;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth_header: Option<(String, String)>,
}

impl HttpClient {
    pub fn new(
        base_url: String,
        auth_header: Option<(String, String)>,
        timeout: Duration,
    ) -> Result<Self, AssistError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    /// POSTs `payload` as JSON, turning non-2xx replies into `AssistError::Api`.
    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, AssistError> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some((key, value)) = &self.auth_header {
            request = request.header(key, value);
        }

        let response = request.json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AssistError::Api(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn post_sends_auth_header_and_trims_base_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("x-api-key", "secret")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = HttpClient::new(
            format!("{}/", server.url()),
            Some(("x-api-key".to_string(), "secret".to_string())),
            Duration::from_secs(5),
        )
        .unwrap();
        let response = client
            .post("chat/completions", &serde_json::json!({"ping": true}))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn anonymous_post_carries_no_auth_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/ping")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = HttpClient::new(server.url(), None, Duration::from_secs(5)).unwrap();
        let result = client.post("ping", &serde_json::json!({})).await;

        mock.assert_async().await;
        match result {
            Err(AssistError::Api(msg)) => assert!(msg.contains("500") && msg.contains("boom")),
            other => panic!("expected API error, got {:?}", other.map(|r| r.status())),
        }
    }
}
