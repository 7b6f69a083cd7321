use crate::llm::{LLMClientFactoryTrait, ModelParams};
use crate::types::Result;
use crate::utils::json::truncate_chars;
use std::sync::Arc;

const MAX_TITLE_CHARS: usize = 50;
const TITLE_TEMPERATURE: f32 = 0.3;

const TITLE_SYSTEM_PROMPT: &str = "You name conversations. Reply with a short title of at \
most six words that captures the topic of the user's message. Reply with the title only: \
no quotes, no punctuation at the end, no explanation.";

/// Conversation titles from the first message
pub struct TitleGenerator {
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
}

impl TitleGenerator {
    pub fn new(llm_factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        Self { llm_factory }
    }

    /// Generate a title, falling back to the message itself on any failure
    pub async fn generate(&self, message: &str) -> String {
        match self.try_generate(message).await {
            Ok(title) if !title.is_empty() => title,
            Ok(_) => fallback_title(message),
            Err(e) => {
                tracing::warn!(error = %e, "Title generation failed, using fallback");
                fallback_title(message)
            }
        }
    }

    async fn try_generate(&self, message: &str) -> Result<String> {
        let llm = self
            .llm_factory
            .create_with_params(ModelParams::with_temperature(TITLE_TEMPERATURE))
            .await?;
        let raw = llm.generate_with_system(TITLE_SYSTEM_PROMPT, message).await?;
        Ok(clean_title(&raw))
    }
}

/// First non-empty line, without a `Title:` label or quotes, capped at 50 chars
pub fn clean_title(raw: &str) -> String {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    let line = match line.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("title:") => line[6..].trim(),
        _ => line,
    };

    let unquoted = line
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '“' | '”'))
        .trim();
    truncate_chars(unquoted, MAX_TITLE_CHARS).trim_end().to_string()
}

/// The first 50 characters of the message, with `...` when cut
pub fn fallback_title(message: &str) -> String {
    let cut = truncate_chars(message, MAX_TITLE_CHARS);
    if cut.len() < message.len() {
        format!("{}...", cut)
    } else {
        cut.to_string()
    }
}
