//! Workflow Engine
//!
//! Runs the five structured workflows. Each one builds a prompt, asks the
//! provider cascade for JSON and checks the answer for the key the caller
//! relies on. Anything else (no provider, a failed call, prose instead of
//! JSON) is answered by [`fallback`](crate::workflows::fallback).

use crate::llm::LLMClientFactoryTrait;
use crate::types::{AppError, Result};
use crate::utils::json::extract_json_object;
use crate::workflows::fallback;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use utoipa::ToSchema;

/// Issues and team members listed in a prompt
const PROMPT_ITEM_LIMIT: usize = 15;
const PROMPT_TEAM_LIMIT: usize = 5;
const DEFAULT_SPRINT_CAPACITY: u64 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Workflow {
    Prioritize,
    SuggestSprint,
    Breakdown,
    SuggestAssignee,
    GenerateSpec,
}

impl Workflow {
    pub const ALL: [Workflow; 5] = [
        Workflow::Prioritize,
        Workflow::SuggestSprint,
        Workflow::Breakdown,
        Workflow::SuggestAssignee,
        Workflow::GenerateSpec,
    ];

    /// Route segment under `/workflows/`
    pub fn slug(&self) -> &'static str {
        match self {
            Workflow::Prioritize => "prioritize",
            Workflow::SuggestSprint => "suggest-sprint",
            Workflow::Breakdown => "breakdown",
            Workflow::SuggestAssignee => "suggest-assignee",
            Workflow::GenerateSpec => "generate-spec",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            Workflow::Prioritize => "You are an experienced project manager. Return only valid JSON.",
            Workflow::SuggestSprint => "You are a sprint planner. Return only valid JSON.",
            Workflow::Breakdown => "You are a technical lead. Return only valid JSON.",
            Workflow::SuggestAssignee => "You are an engineering manager. Return only valid JSON.",
            Workflow::GenerateSpec => "You are a product manager writing clear specifications.",
        }
    }

    /// Key a model answer must carry to be used instead of the fallback
    fn expected_key(&self) -> Option<&'static str> {
        match self {
            Workflow::Prioritize => Some("prioritized"),
            Workflow::SuggestSprint => Some("suggested"),
            Workflow::Breakdown => Some("subtasks"),
            Workflow::SuggestAssignee => Some("suggestions"),
            Workflow::GenerateSpec => None,
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Workflow {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Workflow::ALL
            .into_iter()
            .find(|w| w.slug() == s)
            .ok_or_else(|| AppError::NotFound(format!("Unknown workflow: {}", s)))
    }
}

/// Structured AI workflows with deterministic fallbacks
pub struct WorkflowService {
    llm_factory: Arc<dyn LLMClientFactoryTrait>,
}

impl WorkflowService {
    pub fn new(llm_factory: Arc<dyn LLMClientFactoryTrait>) -> Self {
        Self { llm_factory }
    }

    /// Run a workflow. Always produces a result.
    pub async fn run(&self, workflow: Workflow, input: &Value) -> Value {
        match workflow {
            Workflow::Prioritize => self.prioritize(input).await,
            Workflow::SuggestSprint => self.suggest_sprint(input).await,
            Workflow::Breakdown => self.breakdown(input).await,
            Workflow::SuggestAssignee => self.suggest_assignee(input).await,
            Workflow::GenerateSpec => self.generate_spec(input).await,
        }
    }

    pub async fn prioritize(&self, input: &Value) -> Value {
        let issues = array(input, "issues");
        if issues.is_empty() {
            return json!({ "prioritized": [], "reasoning": "No issues provided" });
        }

        let listing: Vec<String> = issues
            .iter()
            .take(PROMPT_ITEM_LIMIT)
            .map(|i| {
                format!(
                    "- ID: {}, Title: {}, Priority: {}",
                    text(i, "id", ""),
                    text(i, "title", ""),
                    text(i, "priority", "medium")
                )
            })
            .collect();
        let prompt = format!(
            "Prioritize these issues by urgency and business impact:\n{}\n\n\
             Return valid JSON only: {{\"prioritized\": [{{\"issueId\": \"...\", \"rank\": 1, \"reason\": \"...\"}}], \"reasoning\": \"...\"}}",
            listing.join("\n")
        );

        match self.ask_json(Workflow::Prioritize, &prompt).await {
            Some(result) => Value::Object(result),
            None => fallback::prioritize(&issues),
        }
    }

    pub async fn suggest_sprint(&self, input: &Value) -> Value {
        let backlog = array(input, "backlog");
        let capacity = input
            .get("targetCapacity")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_SPRINT_CAPACITY);

        if backlog.is_empty() {
            return json!({ "suggested": [], "totalPoints": 0, "remainingCapacity": capacity });
        }

        let listed: Vec<&Value> = backlog.iter().take(PROMPT_ITEM_LIMIT).collect();
        let prompt = format!(
            "Select issues for a sprint with {} story points capacity.\n\
             Backlog (max {}): {}\n\
             Return valid JSON only: {{\"suggested\": [\"id1\", \"id2\"], \"totalPoints\": 0, \"reasoning\": \"...\"}}",
            capacity,
            PROMPT_ITEM_LIMIT,
            pretty(&listed)
        );

        match self.ask_json(Workflow::SuggestSprint, &prompt).await {
            Some(result) => Value::Object(result),
            None => fallback::suggest_sprint(&backlog, capacity),
        }
    }

    pub async fn breakdown(&self, input: &Value) -> Value {
        let issue = input.get("issue").cloned().unwrap_or_else(|| json!({}));
        let prompt = format!(
            "Break down this issue into subtasks:\nTitle: {}\nDescription: {}\n\n\
             Return valid JSON only: {{\"subtasks\": [{{\"title\": \"...\", \"description\": \"...\", \"suggestedPoints\": 2}}], \"totalPoints\": 0}}",
            text(&issue, "title", ""),
            text(&issue, "description", "")
        );

        match self.ask_json(Workflow::Breakdown, &prompt).await {
            Some(mut result) => {
                if !result.contains_key("totalPoints") {
                    let total: u64 = array(&Value::Object(result.clone()), "subtasks")
                        .iter()
                        .filter_map(|s| s.get("suggestedPoints").and_then(Value::as_u64))
                        .sum();
                    result.insert("totalPoints".to_string(), json!(total));
                }
                result.insert("parentIssue".to_string(), issue);
                Value::Object(result)
            }
            None => fallback::breakdown(&issue),
        }
    }

    pub async fn suggest_assignee(&self, input: &Value) -> Value {
        let issue = input.get("issue").cloned().unwrap_or_else(|| json!({}));
        let team = {
            let team = array(input, "team");
            if team.is_empty() {
                array(input, "teamMembers")
            } else {
                team
            }
        };

        if team.is_empty() {
            return json!({ "issue": issue, "suggestions": [] });
        }

        let listed: Vec<&Value> = team.iter().take(PROMPT_TEAM_LIMIT).collect();
        let prompt = format!(
            "Suggest the best team member for this issue:\nIssue: {} ({})\nTeam (max {}): {}\n\
             Return valid JSON only: {{\"suggestions\": [{{\"userId\": \"...\", \"score\": 10, \"reasoning\": \"...\"}}]}}",
            text(&issue, "title", ""),
            text(&issue, "type", "story"),
            PROMPT_TEAM_LIMIT,
            pretty(&listed)
        );

        match self.ask_json(Workflow::SuggestAssignee, &prompt).await {
            Some(mut result) => {
                result.insert("issue".to_string(), issue);
                Value::Object(result)
            }
            None => fallback::suggest_assignee(&issue, &team),
        }
    }

    pub async fn generate_spec(&self, input: &Value) -> Value {
        let title = text(input, "title", "");
        let description = text(input, "description", "");
        let prompt = format!(
            "Write a Product Requirement Document (PRD) for:\nTitle: {}\nDescription: {}\n\n\
             Include: Overview, Goals, User Stories, Requirements, Success Metrics.\n\
             Write in markdown format.",
            title, description
        );

        let content = match self.ask(Workflow::GenerateSpec, &prompt).await {
            Some(text) if !text.trim().is_empty() => text,
            _ => format!("# {}\n\n{}", title, description),
        };

        json!({
            "title": title,
            "content": {
                "type": "doc",
                "content": [{
                    "type": "paragraph",
                    "content": [{ "type": "text", "text": content }]
                }]
            }
        })
    }

    /// Ask the cascade; `None` on any failure
    async fn ask(&self, workflow: Workflow, prompt: &str) -> Option<String> {
        let result = async {
            let llm = self.llm_factory.create_default().await?;
            llm.generate_with_system(workflow.system_prompt(), prompt).await
        }
        .await;

        match result {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!(workflow = %workflow, error = %e, "Workflow model call failed, using fallback");
                None
            }
        }
    }

    /// Ask and keep the answer only if it is a JSON object with the expected key
    async fn ask_json(&self, workflow: Workflow, prompt: &str) -> Option<Map<String, Value>> {
        let reply = self.ask(workflow, prompt).await?;
        let parsed = parse_workflow_output(&reply, workflow.expected_key());
        if parsed.is_none() {
            tracing::warn!(workflow = %workflow, "Workflow model output unusable, using fallback");
        }
        parsed
    }
}

/// Pull the JSON object out of a reply and check it carries `expected_key`
pub fn parse_workflow_output(reply: &str, expected_key: Option<&str>) -> Option<Map<String, Value>> {
    match extract_json_object(reply)? {
        Value::Object(map) if expected_key.is_none_or(|key| map.contains_key(key)) => Some(map),
        _ => None,
    }
}

fn array(value: &Value, key: &str) -> Vec<Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn text(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

fn pretty(items: &[&Value]) -> String {
    serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_slugs_round_trip() {
        for workflow in Workflow::ALL {
            assert_eq!(workflow.slug().parse::<Workflow>().unwrap(), workflow);
        }
        assert!("deploy".parse::<Workflow>().is_err());
    }

    #[test]
    fn test_parse_output_requires_expected_key() {
        let reply = "Here you go:\n{\"prioritized\": [{\"issueId\": \"a\", \"rank\": 1}], \"reasoning\": \"r\"}";
        assert!(parse_workflow_output(reply, Some("prioritized")).is_some());
        assert!(parse_workflow_output(reply, Some("subtasks")).is_none());
        assert!(parse_workflow_output("no json here", Some("prioritized")).is_none());
        assert!(parse_workflow_output("{broken", None).is_none());
    }

    #[test]
    fn test_text_renders_non_strings() {
        let v = json!({"id": 42, "title": "T", "none": null});
        assert_eq!(text(&v, "id", ""), "42");
        assert_eq!(text(&v, "title", ""), "T");
        assert_eq!(text(&v, "none", "d"), "d");
        assert_eq!(text(&v, "missing", "d"), "d");
    }
}
