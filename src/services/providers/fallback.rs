//! Primary/secondary provider chain

use super::{GenerationParams, ProviderError, TextGenerator};
use async_trait::async_trait;
use std::sync::Arc;

/// Calls `primary`; on any error logs it and retries once on `secondary`
/// with the same parameters.
pub struct FallbackGenerator {
    primary: Arc<dyn TextGenerator>,
    secondary: Arc<dyn TextGenerator>,
}

impl FallbackGenerator {
    pub fn new(primary: Arc<dyn TextGenerator>, secondary: Arc<dyn TextGenerator>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl TextGenerator for FallbackGenerator {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, params: &GenerationParams) -> Result<String, ProviderError> {
        match self.primary.generate(params).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(
                    "{} failed ({}), falling back to {}",
                    self.primary.name(),
                    e,
                    self.secondary.name()
                );
                self.secondary.generate(params).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::testing::{FailingGenerator, MockGenerator};

    #[tokio::test]
    async fn test_primary_success_skips_secondary() {
        let secondary = Arc::new(MockGenerator::replying("secondary"));
        let chain = FallbackGenerator::new(Arc::new(MockGenerator::replying("primary")), secondary.clone());

        assert_eq!(chain.generate(&GenerationParams::new("x")).await.unwrap(), "primary");
        assert!(secondary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_primary_failure_uses_secondary_with_same_params() {
        let secondary = Arc::new(MockGenerator::replying("secondary"));
        let chain = FallbackGenerator::new(Arc::new(FailingGenerator), secondary.clone());

        let params = GenerationParams::new("x").max_tokens(123).system_prompt("sys");
        assert_eq!(chain.generate(&params).await.unwrap(), "secondary");
        assert_eq!(secondary.calls(), vec![params]);
    }

    #[tokio::test]
    async fn test_both_failing_is_an_error() {
        let chain = FallbackGenerator::new(Arc::new(FailingGenerator), Arc::new(FailingGenerator));
        assert!(chain.generate(&GenerationParams::new("x")).await.is_err());
    }
}
