//! Proactive project insights
//!
//! Plain rules over backend data; no model is involved. The capacity and
//! sprint analyses run concurrently and a failing one only drops its own
//! insights.

use crate::backend::BackendClient;
use crate::tools::{display, list, number};
use crate::types::{Insight, InsightSeverity, Result, SuggestedAction};
use serde_json::{json, Value};

const UTILIZATION_LIMIT: f64 = 90.0;
const LATE_SPRINT_DAYS: f64 = 5.0;
const PROGRESS_GAP_HIGH: f64 = 20.0;
const WIP_LIMIT: usize = 3;

pub struct InsightGenerator {
    backend: BackendClient,
}

impl InsightGenerator {
    pub fn new(backend: BackendClient) -> Self {
        Self { backend }
    }

    pub async fn generate(&self, project_id: &str) -> Vec<Insight> {
        tracing::info!(project_id, "Generating insights");

        let (capacity, sprint) = futures::join!(
            self.analyze_capacity(project_id),
            self.analyze_sprint(project_id)
        );

        let mut insights = Vec::new();
        match capacity {
            Ok(found) => insights.extend(found),
            Err(e) => tracing::warn!(error = %e, "Capacity analysis failed"),
        }
        match sprint {
            Ok(found) => insights.extend(found),
            Err(e) => tracing::warn!(error = %e, "Sprint analysis failed"),
        }

        tracing::info!(count = insights.len(), "Insights generated");
        insights
    }

    async fn analyze_capacity(&self, project_id: &str) -> Result<Vec<Insight>> {
        let data = self
            .backend
            .call_tool("/capacity/overview", json!({ "projectId": project_id }))
            .await?;
        Ok(capacity_insights(&data))
    }

    async fn analyze_sprint(&self, project_id: &str) -> Result<Vec<Insight>> {
        let cycle = self
            .backend
            .call_tool("/cycles/get-active", json!({ "projectId": project_id }))
            .await?;
        let Some(cycle_id) = cycle.get("id").and_then(Value::as_str) else {
            return Ok(Vec::new());
        };

        let metrics = self
            .backend
            .call_tool("/cycles/metrics", json!({ "cycleId": cycle_id }))
            .await?;
        Ok(sprint_insights(&cycle, &metrics))
    }
}

fn insight(
    category: &str,
    severity: InsightSeverity,
    title: String,
    description: String,
    affected_entities: Vec<Value>,
    actions: &[(&str, &str)],
) -> Insight {
    Insight {
        id: uuid::Uuid::new_v4().to_string(),
        category: category.to_string(),
        severity,
        title,
        description,
        affected_entities,
        suggested_actions: actions
            .iter()
            .map(|(id, label)| SuggestedAction {
                id: id.to_string(),
                label: label.to_string(),
            })
            .collect(),
    }
}

pub fn capacity_insights(data: &Value) -> Vec<Insight> {
    let mut insights = Vec::new();
    let team = data.get("team").cloned().unwrap_or(Value::Null);

    let utilization = number(&team, "utilizationPercent");
    if utilization > UTILIZATION_LIMIT {
        insights.push(insight(
            "capacity",
            InsightSeverity::High,
            "Team nearing capacity limit".to_string(),
            format!(
                "Team is at {}% capacity. Consider deferring lower-priority items or bringing in help.",
                utilization
            ),
            Vec::new(),
            &[("review_priorities", "Review priorities")],
        ));
    }

    for warning in list(data, "warnings") {
        if warning.get("severity").and_then(Value::as_str) != Some("critical") {
            continue;
        }
        insights.push(insight(
            "capacity",
            InsightSeverity::Critical,
            display(&warning, "message", "Team member overloaded"),
            "Immediate action needed to prevent burnout.".to_string(),
            vec![json!({ "type": "user", "id": warning.get("userId").cloned().unwrap_or(Value::Null) })],
            &[("reassign_work", "Reassign work")],
        ));
    }

    insights
}

pub fn sprint_insights(cycle: &Value, metrics: &Value) -> Vec<Insight> {
    let mut insights = Vec::new();
    let name = display(cycle, "name", "Current sprint");

    let health = metrics.get("health").cloned().unwrap_or(Value::Null);
    let progress = metrics.get("progress").cloned().unwrap_or(Value::Null);
    let dates = metrics.get("dates").cloned().unwrap_or(Value::Null);

    let on_track = health
        .get("isOnTrack")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let days_remaining = number(&dates, "daysRemaining");

    if !on_track && days_remaining <= LATE_SPRINT_DAYS {
        // Progress figures live under `progress`; older payloads put them in `health`
        let source = if progress.is_object() { &progress } else { &health };
        let gap = number(source, "expectedProgress") - number(source, "actualProgress");
        let severity = if gap > PROGRESS_GAP_HIGH {
            InsightSeverity::High
        } else {
            InsightSeverity::Medium
        };
        insights.push(insight(
            "velocity",
            severity,
            format!("Sprint {} is behind schedule", name),
            format!(
                "Progress is {}% behind expected. Only {} days remaining.",
                gap, days_remaining
            ),
            vec![json!({ "type": "cycle", "id": cycle.get("id").cloned().unwrap_or(Value::Null), "name": name })],
            &[
                ("scope_review", "Review scope"),
                ("move_to_backlog", "Move items to backlog"),
            ],
        ));
    }

    let in_progress = list(cycle, "issues")
        .iter()
        .filter(|i| i.get("status").and_then(Value::as_str) == Some("in_progress"))
        .count();
    if in_progress > WIP_LIMIT {
        insights.push(insight(
            "velocity",
            InsightSeverity::Medium,
            format!("{} issues in progress simultaneously", in_progress),
            "High WIP count may indicate context switching or blocked work. \
             Consider finishing items before starting new ones."
                .to_string(),
            Vec::new(),
            &[("check_blockers", "Check for blockers")],
        ));
    }

    insights
}
