//! Chat message processing
//!
//! One request runs through: intent detection, persona selection, prompt
//! assembly from the caller's context, an agent run with backend tools,
//! and a scan of the answer for suggested actions.

use crate::agents::definitions::{get_agent, AgentProfile};
use crate::agents::executor::AgentExecutor;
use crate::agents::router::{detect, select_agent};
use crate::backend::{BackendClient, RequestScope};
use crate::llm::{LLMClientFactoryTrait, ModelParams};
use crate::tools::registry::{group_tools, ToolRegistry};
use crate::tools::ToolContext;
use crate::types::{
    ActionProposal, AppError, MessageContext, ProcessMessageRequest, ProcessMessageResponse,
    Result,
};
use crate::utils::config::Settings;
use crate::utils::json::truncate_chars;
use crate::AppState;
use std::collections::HashSet;
use std::sync::Arc;

/// Answer phrases that signal a suggested write, in match priority
const PROPOSAL_PHRASES: &[(&str, &str)] = &[
    ("I recommend creating", "create_issue"),
    ("I suggest creating", "create_issue"),
    ("should create a new", "create_issue"),
    ("I recommend updating", "update_issue"),
    ("I suggest updating", "update_issue"),
    ("should be reassigned", "assign_issue"),
    ("recommend reassigning", "assign_issue"),
];

const RECENT_MESSAGE_LIMIT: usize = 5;
const RECENT_MESSAGE_CHARS: usize = 200;
const KNOWLEDGE_TEAM_LIMIT: usize = 10;

pub struct ChatProcessor {
    settings: Arc<Settings>,
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
    http: reqwest::Client,
}

impl ChatProcessor {
    pub fn new(
        settings: Arc<Settings>,
        llm_factory: Arc<dyn LLMClientFactoryTrait>,
        http: reqwest::Client,
    ) -> Self {
        Self {
            settings,
            llm_factory,
            http,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.settings.clone(),
            state.llm_factory.clone(),
            state.http.clone(),
        )
    }

    /// Process one chat message.
    ///
    /// When no provider is available the setup instructions are returned as
    /// the reply from the `system` agent. Every other failure is an error.
    pub async fn process(&self, request: &ProcessMessageRequest) -> Result<ProcessMessageResponse> {
        let intent = detect(&request.content);
        let agent = get_agent(select_agent(intent, &request.context))?;
        tracing::info!(
            conversation_id = %request.conversation_id,
            intent = %intent,
            agent = agent.id,
            "Routing chat message"
        );

        match self.run_agent(agent, request).await {
            Ok(answer) => {
                let proposals = extract_proposals(&answer, agent.id);
                Ok(ProcessMessageResponse {
                    tokens_used: estimate_tokens(&answer),
                    content: answer,
                    agent_id: Some(agent.id.to_string()),
                    proposals,
                })
            }
            Err(AppError::ProviderUnavailable(message)) => {
                tracing::error!("No LLM provider available for chat");
                Ok(ProcessMessageResponse {
                    content: message,
                    agent_id: Some("system".to_string()),
                    proposals: Vec::new(),
                    tokens_used: 0,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn run_agent(&self, agent: &AgentProfile, request: &ProcessMessageRequest) -> Result<String> {
        let llm = self
            .llm_factory
            .create_with_params(ModelParams::with_temperature(agent.temperature))
            .await?;

        let tools = self.tools_for(agent, request);
        let executor = AgentExecutor::new(llm, tools, self.settings.max_iterations);

        let task = build_task_description(&request.content, &request.context);
        let knowledge = build_knowledge(&request.context);

        tokio::time::timeout(
            self.settings.agent_timeout(),
            executor.execute(agent, &task, knowledge.as_deref()),
        )
        .await
        .map_err(|_| {
            tracing::warn!(agent = agent.id, timeout_secs = self.settings.agent_timeout, "Agent run timed out");
            AppError::Timeout(format!(
                "Agent took too long (>{}s)",
                self.settings.agent_timeout
            ))
        })?
    }

    /// The persona's own tools plus any groups granted for this request
    fn tools_for(&self, agent: &AgentProfile, request: &ProcessMessageRequest) -> ToolRegistry {
        let scope = RequestScope::new(&request.tenant_id, &request.user_id)
            .with_conversation(&request.conversation_id)
            .with_agent(agent.id);
        let backend = BackendClient::new(self.http.clone(), &self.settings, scope);
        let project_id = request.context.project.as_ref().and_then(|p| p.id.clone());
        let ctx = Arc::new(ToolContext::new(backend, project_id));

        let mut allowed: HashSet<String> = agent.tools.iter().map(|t| t.to_string()).collect();
        for group in request.agent_tool_sets.get(agent.id).into_iter().flatten() {
            match group_tools(group) {
                Some(tools) => allowed.extend(tools.iter().map(|t| t.to_string())),
                None => tracing::warn!(group = %group, "Ignoring unknown tool set"),
            }
        }

        let mut registry = ToolRegistry::for_backend(ctx);
        registry.retain(&allowed);
        registry
    }
}

/// Render the user's request with the context the caller sent along
pub fn build_task_description(content: &str, context: &MessageContext) -> String {
    let mut parts = vec![format!("User Request: {}", content), String::new()];

    if let Some(project) = &context.project {
        parts.push(format!(
            "Project: {}",
            project.name.as_deref().unwrap_or("Unknown")
        ));
    }

    if let Some(cycle) = &context.cycle {
        parts.push(format!(
            "Current Sprint: {}",
            cycle.name.as_deref().unwrap_or("Unknown")
        ));
        if let Some(metrics) = &cycle.metrics {
            parts.push(format!(
                "Sprint Progress: {}%",
                metrics.progress_percent.unwrap_or(0.0)
            ));
        }
    }

    if !context.team.is_empty() {
        parts.push(format!("Team Size: {} members", context.team.len()));
    }

    if !context.recent_messages.is_empty() {
        parts.push(String::new());
        parts.push("Recent conversation for context:".to_string());
        let skip = context
            .recent_messages
            .len()
            .saturating_sub(RECENT_MESSAGE_LIMIT);
        for msg in context.recent_messages.iter().skip(skip) {
            let role = if msg.role == "user" { "User" } else { "Assistant" };
            parts.push(format!(
                "  {}: {}...",
                role,
                truncate_chars(&msg.content, RECENT_MESSAGE_CHARS)
            ));
        }
    }

    if !context.mentioned_entities.is_empty() {
        parts.push(String::new());
        parts.push("Mentioned entities:".to_string());
        for entity in &context.mentioned_entities {
            let label = entity
                .name
                .as_deref()
                .or(entity.id.as_deref())
                .unwrap_or("unknown");
            parts.push(format!("  - {}: {}", entity.entity_type, label));
        }
    }

    parts.join("\n")
}

/// Background facts for the system prompt; `None` when the context is empty
pub fn build_knowledge(context: &MessageContext) -> Option<String> {
    let mut sections = Vec::new();

    if let Some(project) = &context.project {
        sections.push(format!(
            "Project: {}\nDescription: {}\nStatus: {}",
            project.name.as_deref().unwrap_or("Unknown"),
            project.description.as_deref().unwrap_or("N/A"),
            project.status.as_deref().unwrap_or("active"),
        ));
    }

    if !context.team.is_empty() {
        let mut team = String::from("Team Members:");
        for member in context.team.iter().take(KNOWLEDGE_TEAM_LIMIT) {
            team.push_str(&format!(
                "\n- {}: {}",
                member.name.as_deref().unwrap_or("Unknown"),
                member.role.as_deref().unwrap_or("Developer"),
            ));
        }
        sections.push(team);
    }

    if let Some(cycle) = &context.cycle {
        let progress = cycle
            .metrics
            .as_ref()
            .and_then(|m| m.progress_percent)
            .unwrap_or(0.0);
        sections.push(format!(
            "Active Sprint: {} ({} to {})\nProgress: {}%",
            cycle.name.as_deref().unwrap_or("Unknown"),
            cycle.start_date.as_deref().unwrap_or("?"),
            cycle.end_date.as_deref().unwrap_or("?"),
            progress,
        ));
    }

    (!sections.is_empty()).then(|| sections.join("\n\n"))
}

/// At most one proposal, from the first matching phrase
pub fn extract_proposals(answer: &str, agent_id: &str) -> Vec<ActionProposal> {
    let lowered = answer.to_lowercase();
    PROPOSAL_PHRASES
        .iter()
        .find(|(phrase, _)| lowered.contains(&phrase.to_lowercase()))
        .map(|(phrase, action_type)| ActionProposal {
            agent_id: agent_id.to_string(),
            action_type: action_type.to_string(),
            parameters: serde_json::json!({}),
            reasoning: format!("Agent suggested: {}", phrase),
            affected_entities: Vec::new(),
            confidence_score: 0.7,
        })
        .into_iter()
        .collect()
}

/// Rough token count: four characters per token
pub fn estimate_tokens(text: &str) -> u32 {
    u32::try_from(text.chars().count() / 4).unwrap_or(u32::MAX)
}
