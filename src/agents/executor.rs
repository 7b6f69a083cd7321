//! Tool-using agent loop
//!
//! Providers are driven through plain text, so tool use follows a small
//! reasoning protocol instead of vendor function calling:
//!
//! ```text
//! Thought: I need the open bugs first
//! Action: search_issues
//! Action Input: {"query": "login", "status": "todo"}
//! ```
//!
//! The executor runs the tool, feeds `Observation: ...` back and asks again
//! until the model answers with `Final Answer: ...`.

use crate::agents::definitions::AgentProfile;
use crate::llm::LLMClient;
use crate::tools::registry::ToolRegistry;
use crate::types::Result;
use crate::utils::json::{extract_json_object, truncate_chars};
use serde_json::Value;

const ACTION: &str = "Action:";
const ACTION_INPUT: &str = "Action Input:";
const OBSERVATION: &str = "Observation:";
const FINAL_ANSWER: &str = "Final Answer:";

/// Observations longer than this are cut before going back to the model
const MAX_OBSERVATION_CHARS: usize = 4000;

/// One parsed model turn
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// The model wants a tool run
    Action { tool: String, input: Value },
    /// The model is done
    Final(String),
}

/// Parse a model reply into the next step.
///
/// A tool call wins when `Action:` appears before any `Final Answer:`.
/// Replies that follow neither form are treated as the final answer.
pub fn parse_step(reply: &str) -> AgentStep {
    let final_at = reply.find(FINAL_ANSWER);
    let action_at = find_action(reply);

    if let Some(action_at) = action_at {
        if final_at.is_none_or(|f| action_at < f) {
            let rest = &reply[action_at + ACTION.len()..];
            let tool = rest
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .trim_matches('`')
                .trim()
                .to_string();

            let input = rest
                .find(ACTION_INPUT)
                .map(|idx| {
                    let raw = &rest[idx + ACTION_INPUT.len()..];
                    // The model sometimes hallucinates its own observation
                    let raw = raw.split(OBSERVATION).next().unwrap_or(raw);
                    extract_json_object(raw).unwrap_or(Value::Null)
                })
                .unwrap_or(Value::Null);

            if !tool.is_empty() {
                return AgentStep::Action { tool, input };
            }
        }
    }

    match final_at {
        Some(idx) => AgentStep::Final(reply[idx + FINAL_ANSWER.len()..].trim().to_string()),
        None => AgentStep::Final(reply.trim().to_string()),
    }
}

/// Position of an `Action:` label that is not the start of `Action Input:`
fn find_action(reply: &str) -> Option<usize> {
    reply
        .match_indices(ACTION)
        .map(|(idx, _)| idx)
        .find(|idx| !reply[*idx..].starts_with(ACTION_INPUT))
}

pub struct AgentExecutor {
    llm: Box<dyn LLMClient>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl AgentExecutor {
    pub fn new(llm: Box<dyn LLMClient>, tools: ToolRegistry, max_iterations: usize) -> Self {
        Self {
            llm,
            tools,
            max_iterations,
        }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }

    /// Build the persona's system prompt
    pub fn system_prompt(&self, agent: &AgentProfile, knowledge: Option<&str>) -> String {
        let mut prompt = format!(
            "You are {}.\n{}\n\nYour personal goal is: {}\n",
            agent.role, agent.backstory, agent.goal
        );

        if let Some(knowledge) = knowledge.filter(|k| !k.trim().is_empty()) {
            prompt.push_str("\nBackground knowledge about this workspace:\n");
            prompt.push_str(knowledge);
            prompt.push('\n');
        }

        let definitions = self.tools.get_tool_definitions();
        if definitions.is_empty() {
            prompt.push_str(&format!(
                "\nAnswer the request directly, starting your reply with \"{}\".",
                FINAL_ANSWER
            ));
            return prompt;
        }

        prompt.push_str("\nYou can use the following tools:\n");
        for def in &definitions {
            prompt.push_str(&format!(
                "- {}: {}\n  Arguments (JSON schema): {}\n",
                def.name, def.description, def.parameters
            ));
        }
        let names: Vec<&str> = definitions.iter().map(|d| d.name.as_str()).collect();
        prompt.push_str(&format!(
            "\nTo use a tool, reply in exactly this format and then stop:\n\
             Thought: what you need to find out\n\
             {ACTION} one of [{}]\n\
             {ACTION_INPUT} a JSON object with the arguments\n\n\
             You will receive the result as \"{OBSERVATION} ...\".\n\
             When you have enough information, reply with:\n\
             Thought: I now know the final answer\n\
             {FINAL_ANSWER} your complete answer to the user\n\n\
             Changes to issues and specs are proposals that a human approves. \
             Never claim a change was applied.",
            names.join(", ")
        ));
        prompt
    }

    /// Run the loop for one task and return the final answer
    pub async fn execute(
        &self,
        agent: &AgentProfile,
        task: &str,
        knowledge: Option<&str>,
    ) -> Result<String> {
        let mut messages = vec![
            ("system".to_string(), self.system_prompt(agent, knowledge)),
            ("user".to_string(), task.to_string()),
        ];

        for iteration in 0..self.max_iterations {
            let reply = self.llm.generate_with_history(&messages).await?;

            match parse_step(&reply) {
                AgentStep::Final(answer) => {
                    tracing::debug!(agent = agent.id, iteration, "Agent produced final answer");
                    return Ok(answer);
                }
                AgentStep::Action { tool, input } => {
                    tracing::debug!(agent = agent.id, iteration, tool = %tool, "Agent calling tool");
                    let observation = self.observe(&tool, input).await;

                    let thought = reply.split(OBSERVATION).next().unwrap_or(&reply);
                    messages.push(("assistant".to_string(), thought.trim().to_string()));
                    messages.push((
                        "user".to_string(),
                        format!("{} {}", OBSERVATION, observation),
                    ));
                }
            }
        }

        tracing::info!(
            agent = agent.id,
            max_iterations = self.max_iterations,
            "Agent hit the iteration limit, forcing a final answer"
        );
        messages.push((
            "user".to_string(),
            format!(
                "You have reached the tool call limit. Using the observations above, \
                 give your best answer now, starting with \"{}\".",
                FINAL_ANSWER
            ),
        ));
        let reply = self.llm.generate_with_history(&messages).await?;
        Ok(match parse_step(&reply) {
            AgentStep::Final(answer) => answer,
            AgentStep::Action { .. } => reply.trim().to_string(),
        })
    }

    /// Run a tool; failures become text the model can react to
    async fn observe(&self, tool: &str, input: Value) -> String {
        if !self.tools.has_tool(tool) {
            return format!(
                "Error: '{}' is not an available tool. Available tools: {}",
                tool,
                self.tools.tool_names().join(", ")
            );
        }

        match self.tools.execute(tool, input).await {
            Ok(output) => truncate_chars(&output, MAX_OBSERVATION_CHARS).to_string(),
            Err(e) => {
                tracing::warn!(tool, error = %e, "Tool execution failed");
                format!("Error: {}", e)
            }
        }
    }
}
