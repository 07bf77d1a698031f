//! services/api/src/adapters/embeddings.rs
//!
//! This module contains the adapter for the text-embedding model.
//! It implements the `EmbeddingService` port from the `core` crate.

use async_openai::{config::OpenAIConfig, types::CreateEmbeddingRequestArgs, Client};
use async_trait::async_trait;
use praxis_core::ports::{AiOutcome, EmbeddingService, PortError};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `EmbeddingService` using the OpenAI embeddings API.
#[derive(Clone)]
pub struct OpenAiEmbeddingAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiEmbeddingAdapter {
    /// Creates a new `OpenAiEmbeddingAdapter`.
    pub fn new(client: Option<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    async fn request(
        &self,
        client: &Client<OpenAIConfig>,
        content: &str,
    ) -> Result<Vec<f32>, PortError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(content)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                PortError::Unexpected("Embedding response contained no vectors".to_string())
            })
    }
}

//=========================================================================================
// `EmbeddingService` Trait Implementation
//=========================================================================================

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingAdapter {
    async fn embed(&self, content: &str) -> AiOutcome<Vec<f32>> {
        let Some(client) = &self.client else {
            warn!("OPENAI_API_KEY missing, skipping embedding");
            return AiOutcome::Degraded;
        };
        match self.request(client, content).await {
            Ok(vector) => AiOutcome::Ready(vector),
            Err(e) => {
                warn!("Embedding generation failed, degrading: {e}");
                AiOutcome::Degraded
            }
        }
    }
}
