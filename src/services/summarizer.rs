use crate::llm::{LLMClientFactoryTrait, ModelParams};
use crate::types::{RecentMessage, Result};
use std::sync::Arc;

const SUMMARIZER_SYSTEM_PROMPT: &str = "You compress conversation history into concise \
summaries that keep the context needed later: key decisions, action items, constraints or \
preferences the user expressed, and where the discussion currently stands. Output only the \
summary text.";

/// Conversation summaries for context compaction
pub struct Summarizer {
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
}

impl Summarizer {
    pub fn new(llm_factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        Self { llm_factory }
    }

    pub async fn summarize(&self, messages: &[RecentMessage], max_length: usize) -> Result<String> {
        let llm = self
            .llm_factory
            .create_with_params(ModelParams::with_temperature(0.0))
            .await?;

        let prompt = format!(
            "Summarize the following conversation in under {} characters.\n\nTRANSCRIPT:\n{}",
            max_length,
            transcript(messages)
        );
        let summary = llm.generate_with_system(SUMMARIZER_SYSTEM_PROMPT, &prompt).await?;
        Ok(summary.trim().to_string())
    }
}

/// `ROLE: content` lines
pub fn transcript(messages: &[RecentMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.to_uppercase(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
