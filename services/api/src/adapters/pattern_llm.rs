//! services/api/src/adapters/pattern_llm.rs
//!
//! This module contains the adapter for the pattern-analysis LLM.
//! It implements the `PatternDetectionService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use praxis_core::domain::{DetectedPattern, HistoryEntry, PatternKind};
use praxis_core::ports::{AiOutcome, PatternDetectionService, PortError};
use serde::Deserialize;
use tracing::warn;

use crate::adapters::strip_code_fences;

/// Used when the model reports a pattern without a confidence score.
const DEFAULT_CONFIDENCE: f64 = 0.8;

const SYSTEM_INSTRUCTIONS: &str = r#"You are the "Pattern Analyzer" of a cognitive augmentation system.
Analyze the USER'S NEW THOUGHT against their PAST THOUGHTS.

Look for:
1. RECURRENCE: Is this a recurring theme?
2. CONTRADICTION: Does this contradict past thoughts?
3. CONNECTION: Does this relate to a seemingly unrelated past topic?

Return a JSON object with a "patterns" array. Each pattern object should have:
- "title": Short title (e.g. "Recurring Anxiety about Deadlines")
- "description": One sentence explanation.
- "type": "RECURRENCE" | "CONTRADICTION" | "CONNECTION"
- "confidence": 0.0 to 1.0
- "suggestedAction": String. IF the pattern is negative or problematic (e.g. anxiety, procrastination, contradiction), provide 2-3 short, bulleted steps to resolve it. Otherwise null.

If no strong patterns found, return { "patterns": [] }.
ONLY return JSON."#;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `PatternDetectionService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiPatternAdapter {
    client: Option<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiPatternAdapter {
    /// Creates a new `OpenAiPatternAdapter`.
    pub fn new(client: Option<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    async fn request(
        &self,
        client: &Client<OpenAIConfig>,
        content: &str,
        history: &[HistoryEntry],
    ) -> Result<Vec<DetectedPattern>, PortError> {
        let user_input = format!(
            "PAST THOUGHTS:\n{}\n\nNEW THOUGHT:\n{}",
            format_history(history),
            content
        );

        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_input)
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
                PortError::Unexpected("Pattern LLM returned no text content".to_string())
            })?;

        let report: RawPatternReport = serde_json::from_str(&strip_code_fences(&text))
            .map_err(|e| PortError::Unexpected(format!("Pattern parse failed: {e}")))?;

        Ok(report
            .patterns
            .into_iter()
            .filter_map(|raw| match PatternKind::from_label(&raw.kind) {
                Some(kind) => Some(DetectedPattern {
                    title: raw.title,
                    description: raw.description,
                    kind,
                    confidence: raw.confidence.unwrap_or(DEFAULT_CONFIDENCE),
                    suggested_action: raw.suggested_action,
                }),
                None => {
                    warn!("Dropping pattern with unknown type '{}'", raw.kind);
                    None
                }
            })
            .collect())
    }
}

/// One line per prior thought: the capture date and the raw content.
fn format_history(history: &[HistoryEntry]) -> String {
    history
        .iter()
        .map(|entry| format!("- [{}] {}", entry.date.format("%Y-%m-%d"), entry.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The JSON object the model is instructed to return.
#[derive(Deserialize)]
struct RawPatternReport {
    #[serde(default)]
    patterns: Vec<RawPattern>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPattern {
    title: String,
    description: String,
    #[serde(rename = "type")]
    kind: String,
    confidence: Option<f64>,
    #[serde(default)]
    suggested_action: Option<String>,
}

//=========================================================================================
// `PatternDetectionService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PatternDetectionService for OpenAiPatternAdapter {
    async fn detect_patterns(
        &self,
        content: &str,
        history: &[HistoryEntry],
    ) -> AiOutcome<Vec<DetectedPattern>> {
        let Some(client) = &self.client else {
            warn!("OPENAI_API_KEY missing, skipping pattern analysis");
            return AiOutcome::Degraded;
        };
        match self.request(client, content, history).await {
            Ok(patterns) => AiOutcome::Ready(patterns),
            Err(e) => {
                warn!("Pattern analysis failed, degrading: {e}");
                AiOutcome::Degraded
            }
        }
    }
}
