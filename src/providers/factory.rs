use crate::config::{Provider, ResolvedProvider};
use crate::core::error::AssistError;
use crate::providers::{LLMProvider, deepseek::DeepSeekProvider, groq::GroqProvider};
use std::collections::HashMap;
use std::time::Duration;

type ProviderCreator = Box<
    dyn Fn(&ResolvedProvider, Duration) -> Result<Box<dyn LLMProvider>, AssistError> + Send + Sync,
>;

pub struct ProviderFactory {
    creators: HashMap<Provider, ProviderCreator>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators = HashMap::new();

        creators.insert(
            Provider::Groq,
            Box::new(|config: &ResolvedProvider, timeout: Duration| {
                if config.api_key.is_none() {
                    tracing::warn!("{} is not set", Provider::Groq.api_key_env());
                }
                let provider = GroqProvider::with_endpoint(
                    config.base_url.clone(),
                    config.api_key.clone(),
                    config.model.clone(),
                    timeout,
                )?;
                Ok(Box::new(provider) as Box<dyn LLMProvider>)
            }) as ProviderCreator,
        );

        creators.insert(
            Provider::DeepSeek,
            Box::new(|config: &ResolvedProvider, timeout: Duration| {
                if config.api_key.is_none() {
                    tracing::warn!("{} is not set", Provider::DeepSeek.api_key_env());
                }
                let provider = DeepSeekProvider::with_endpoint(
                    config.base_url.clone(),
                    config.api_key.clone(),
                    config.model.clone(),
                    timeout,
                )?;
                Ok(Box::new(provider) as Box<dyn LLMProvider>)
            }) as ProviderCreator,
        );

        Self { creators }
    }

    pub fn create(
        &self,
        config: &ResolvedProvider,
        timeout: Duration,
    ) -> Result<Box<dyn LLMProvider>, AssistError> {
        self.creators
            .get(&config.provider)
            .ok_or_else(|| AssistError::Config(format!("Provider not found: {:?}", config.provider)))
            .and_then(|creator| creator(config, timeout))
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn creates_each_configured_provider() {
        let factory = ProviderFactory::new();
        let config = Config::default();

        let groq = factory
            .create(&config.resolve(Provider::Groq), Duration::from_secs(1))
            .unwrap();
        let deepseek = factory
            .create(&config.resolve(Provider::DeepSeek), Duration::from_secs(1))
            .unwrap();

        assert_eq!(groq.name(), "groq");
        assert_eq!(deepseek.name(), "deepseek");
    }
}
