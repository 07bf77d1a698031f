//! services/api/src/adapters/classify_llm.rs
//!
//! This module contains the adapter for the thought-classification LLM.
//! It implements the `ClassificationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use praxis_core::domain::{Classification, Importance};
use praxis_core::ports::{AiOutcome, ClassificationService, PortError};
use serde::Deserialize;
use tracing::warn;

use crate::adapters::strip_code_fences;

const SYSTEM_INSTRUCTIONS: &str = r#"You are an expert cognitive assistant for "Praxis".
Process the user's mind dump and return a JSON object.
Keys: "processedContent" (concise action/idea), "suggestedImportance" ("TODAY", "WEEK", "LATER", or "NOT_IMPORTANT"), "tags" (array of 2-3 strings).
Return ONLY the raw JSON object. No markdown."#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ClassificationService` using an OpenAI-compatible LLM.
///
/// Constructed without a client when no API key is configured; every call
/// then degrades and the capture flow proceeds without a preview.
#[derive(Clone)]
pub struct OpenAiClassifyAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiClassifyAdapter {
    /// Creates a new `OpenAiClassifyAdapter`.
    pub fn new(client: Option<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    async fn request(
        &self,
        client: &Client<OpenAIConfig>,
        content: &str,
    ) -> Result<Classification, PortError> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = client
            .chat()
            .create(request)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Classification LLM returned no text content".to_string())
            })?;

        let raw: RawClassification = serde_json::from_str(&strip_code_fences(&text))
            .map_err(|e| PortError::Unexpected(format!("Classification parse failed: {e}")))?;

        Ok(Classification {
            processed_content: raw.processed_content,
            suggested_importance: Importance::from_label(&raw.suggested_importance),
            tags: raw.tags,
        })
    }
}

/// The JSON object the model is instructed to return.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassification {
    processed_content: String,
    suggested_importance: String,
    #[serde(default)]
    tags: Vec<String>,
}

//=========================================================================================
// `ClassificationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ClassificationService for OpenAiClassifyAdapter {
    async fn classify(&self, content: &str) -> AiOutcome<Classification> {
        let Some(client) = &self.client else {
            warn!("OPENAI_API_KEY missing, skipping classification");
            return AiOutcome::Degraded;
        };
        match self.request(client, content).await {
            Ok(classification) => AiOutcome::Ready(classification),
            Err(e) => {
                warn!("Classification failed, degrading: {e}");
                AiOutcome::Degraded
            }
        }
    }
}
