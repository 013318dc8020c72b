use async_trait::async_trait;

use crate::error::OracleError;

/// External text classifier (an LLM behind some API).
///
/// The reply is free-form text and is never trusted as-is; see
/// [`parse_suggest_response`](crate::response::parse_suggest_response).
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn classify(&self, prompt: &str) -> Result<String, OracleError>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for Box<T> {
    async fn classify(&self, prompt: &str) -> Result<String, OracleError> {
        (**self).classify(prompt).await
    }
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for std::sync::Arc<T> {
    async fn classify(&self, prompt: &str) -> Result<String, OracleError> {
        (**self).classify(prompt).await
    }
}
