//! Deterministic answers used when no model output is usable
//!
//! Every function here is pure so the workflow endpoints always have
//! something sensible to return.

use serde_json::{json, Value};

pub const DEFAULT_STORY_POINTS: u64 = 1;
const ASSIGNEE_SUGGESTIONS: usize = 3;

/// 0 is most urgent. Unknown or missing priorities rank as medium.
pub fn priority_rank(issue: &Value) -> u8 {
    match issue
        .get("priority")
        .and_then(Value::as_str)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("urgent") | Some("critical") => 0,
        Some("high") => 1,
        Some("low") => 3,
        _ => 2,
    }
}

/// Story points of an issue; fractional estimates round up
pub fn story_points(issue: &Value) -> u64 {
    match issue.get("storyPoints") {
        Some(v) => v
            .as_u64()
            .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f.ceil() as u64))
            .unwrap_or(DEFAULT_STORY_POINTS),
        None => DEFAULT_STORY_POINTS,
    }
}

/// Issues in priority order; the sort is stable
pub fn sorted_by_priority(issues: &[Value]) -> Vec<&Value> {
    let mut sorted: Vec<&Value> = issues.iter().collect();
    sorted.sort_by_key(|issue| priority_rank(issue));
    sorted
}

pub fn prioritize(issues: &[Value]) -> Value {
    let prioritized: Vec<Value> = sorted_by_priority(issues)
        .into_iter()
        .enumerate()
        .map(|(idx, issue)| {
            json!({
                "issueId": issue.get("id").cloned().unwrap_or(Value::Null),
                "rank": idx + 1,
                "reason": format!(
                    "{} priority",
                    issue.get("priority").and_then(Value::as_str).unwrap_or("medium")
                ),
            })
        })
        .collect();

    json!({
        "prioritized": prioritized,
        "reasoning": "Prioritized by urgency level (fallback)",
    })
}

/// Greedy fill of the sprint in priority order
pub fn suggest_sprint(backlog: &[Value], capacity: u64) -> Value {
    let mut selected = Vec::new();
    let mut total: u64 = 0;

    for issue in sorted_by_priority(backlog) {
        let fits = total
            .checked_add(story_points(issue))
            .filter(|sum| *sum <= capacity);
        if let Some(sum) = fits {
            selected.push(issue.clone());
            total = sum;
        }
    }

    json!({
        "suggested": selected,
        "totalPoints": total,
        "remainingCapacity": capacity - total,
        "reasoning": "Filled by priority until capacity was reached (fallback)",
    })
}

pub fn breakdown(issue: &Value) -> Value {
    let title = issue.get("title").and_then(Value::as_str).unwrap_or_default();
    let subtasks = [("Research", 1), ("Implement", 3), ("Test", 2)]
        .iter()
        .map(|(step, points)| {
            json!({ "title": format!("{}: {}", step, title), "suggestedPoints": points })
        })
        .collect::<Vec<_>>();

    json!({
        "parentIssue": issue,
        "subtasks": subtasks,
        "totalPoints": 6,
    })
}

/// The least loaded members first
pub fn suggest_assignee(issue: &Value, team: &[Value]) -> Value {
    let mut members: Vec<&Value> = team.iter().collect();
    members.sort_by_key(|m| workload(m));

    let suggestions: Vec<Value> = members
        .into_iter()
        .take(ASSIGNEE_SUGGESTIONS)
        .map(|m| {
            json!({
                "userId": m.get("id").or_else(|| m.get("userId")).cloned().unwrap_or(Value::Null),
                "name": m.get("name").cloned().unwrap_or(Value::Null),
                "score": 10,
                "reasoning": "Available",
            })
        })
        .collect();

    json!({ "issue": issue, "suggestions": suggestions })
}

/// Workload as a sortable integer (hundredths), missing counts as idle
fn workload(member: &Value) -> i64 {
    let load = member
        .get("currentWorkload")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    (load * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(json!({"priority": "urgent"}), 0)]
    #[case(json!({"priority": "Critical"}), 0)]
    #[case(json!({"priority": "high"}), 1)]
    #[case(json!({"priority": "medium"}), 2)]
    #[case(json!({"priority": "low"}), 3)]
    #[case(json!({"priority": "whenever"}), 2)]
    #[case(json!({}), 2)]
    fn test_priority_rank(#[case] issue: Value, #[case] expected: u8) {
        assert_eq!(priority_rank(&issue), expected);
    }

    #[test]
    fn test_prioritize_is_stable() {
        let issues = vec![
            json!({"id": "a", "priority": "low"}),
            json!({"id": "b", "priority": "high"}),
            json!({"id": "c"}),
            json!({"id": "d", "priority": "high"}),
            json!({"id": "e", "priority": "urgent"}),
        ];
        let result = prioritize(&issues);
        let ids: Vec<&str> = result["prioritized"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["issueId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["e", "b", "d", "c", "a"]);
        assert_eq!(result["prioritized"][0]["rank"], 1);
        assert_eq!(result["reasoning"], "Prioritized by urgency level (fallback)");
    }

    #[test]
    fn test_suggest_sprint_greedy_fill() {
        let backlog = vec![
            json!({"id": "a", "priority": "low", "storyPoints": 3}),
            json!({"id": "b", "priority": "high", "storyPoints": 5}),
            json!({"id": "c", "priority": "high", "storyPoints": 8}),
            json!({"id": "d", "priority": "medium"}),
        ];
        let result = suggest_sprint(&backlog, 10);
        let ids: Vec<&str> = result["suggested"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_str().unwrap())
            .collect();
        // b (5) fits, c (8) does not, d (1) fits, a (3) fits
        assert_eq!(ids, ["b", "d", "a"]);
        assert_eq!(result["totalPoints"], 9);
        assert_eq!(result["remainingCapacity"], 1);
    }

    #[test]
    fn test_suggest_sprint_skips_oversized_estimates() {
        let backlog = vec![
            json!({"id": "a", "storyPoints": 1}),
            json!({"id": "huge", "storyPoints": u64::MAX}),
            json!({"id": "b", "storyPoints": 2}),
        ];
        let result = suggest_sprint(&backlog, 40);
        let ids: Vec<&str> = result["suggested"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(result["totalPoints"], 3);
        assert_eq!(result["remainingCapacity"], 37);
    }

    #[test]
    fn test_story_points() {
        assert_eq!(story_points(&json!({"storyPoints": 5})), 5);
        assert_eq!(story_points(&json!({"storyPoints": 2.5})), 3);
        assert_eq!(story_points(&json!({"storyPoints": null})), 1);
        assert_eq!(story_points(&json!({})), 1);
    }

    #[test]
    fn test_breakdown() {
        let issue = json!({"id": "i1", "title": "Login"});
        let result = breakdown(&issue);
        assert_eq!(result["parentIssue"], issue);
        assert_eq!(result["subtasks"][0]["title"], "Research: Login");
        assert_eq!(result["subtasks"][1]["suggestedPoints"], 3);
        assert_eq!(result["subtasks"][2]["title"], "Test: Login");
    }

    #[test]
    fn test_suggest_assignee_least_loaded() {
        let team = vec![
            json!({"id": "u1", "name": "Ana", "currentWorkload": 80}),
            json!({"id": "u2", "name": "Bo", "currentWorkload": 20}),
            json!({"id": "u3", "name": "Cy"}),
            json!({"id": "u4", "name": "Di", "currentWorkload": 50}),
        ];
        let result = suggest_assignee(&json!({"id": "i1"}), &team);
        let ids: Vec<&str> = result["suggestions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["userId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["u3", "u2", "u4"]);
        assert_eq!(result["suggestions"][0]["reasoning"], "Available");
        assert_eq!(result["suggestions"][0]["score"], 10);
    }
}
