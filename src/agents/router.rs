//! Keyword-based intent routing
//!
//! Routing is deterministic and needs no model call: each intent owns a
//! keyword list, the message is scored by how many of an intent's keywords
//! it contains, and the unique best score wins. Anything ambiguous lands on
//! [`Intent::Issue`], the general-purpose category.

use crate::agents::definitions::{CAPACITY_PLANNER, ISSUE_BREAKDOWN, PRODUCT_MANAGER, STANDUP_ASSISTANT};
use crate::types::MessageContext;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Capacity,
    Prioritization,
    Standup,
    Breakdown,
    Spec,
    Sprint,
    Issue,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Capacity,
        Intent::Prioritization,
        Intent::Standup,
        Intent::Breakdown,
        Intent::Spec,
        Intent::Sprint,
        Intent::Issue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Capacity => "capacity",
            Intent::Prioritization => "prioritization",
            Intent::Standup => "standup",
            Intent::Breakdown => "breakdown",
            Intent::Spec => "spec",
            Intent::Sprint => "sprint",
            Intent::Issue => "issue",
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Intent::Capacity => &[
                "capacity",
                "workload",
                "overloaded",
                "overallocated",
                "burnout",
                "who has time",
                "who can take",
                "reassign",
                "available",
            ],
            Intent::Prioritization => &[
                "prioritize",
                "priority",
                "what should",
                "most important",
                "focus on",
                "highest impact",
                "next",
                "roadmap",
            ],
            Intent::Standup => &[
                "standup",
                "stand-up",
                "daily",
                "summary",
                "progress",
                "yesterday",
                "today",
                "update",
                "report",
            ],
            Intent::Breakdown => &[
                "break down",
                "breakdown",
                "split",
                "decompose",
                "subtasks",
                "how to implement",
                "divide",
                "smaller",
            ],
            Intent::Spec => &[
                "spec",
                "specification",
                "write a spec",
                "requirements",
                "document",
                "design doc",
                "prd",
            ],
            Intent::Sprint => &[
                "sprint",
                "cycle",
                "iteration",
                "velocity",
                "burndown",
                "on track",
                "behind",
                "metrics",
            ],
            Intent::Issue => &[
                "issue",
                "bug",
                "task",
                "story",
                "find",
                "search",
                "show me",
                "list",
                "what issues",
            ],
        }
    }

    /// Number of this intent's keywords found in already lowercased text
    fn score(&self, lowered: &str) -> usize {
        self.keywords()
            .iter()
            .filter(|keyword| lowered.contains(*keyword))
            .count()
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a message. No match, or a shared best score, yields `Issue`.
pub fn detect(message: &str) -> Intent {
    let lowered = message.to_lowercase();

    let mut best = Intent::Issue;
    let mut best_score = 0;
    let mut tied = false;

    for intent in Intent::ALL {
        let score = intent.score(&lowered);
        if score > best_score {
            best = intent;
            best_score = score;
            tied = false;
        } else if score > 0 && score == best_score {
            tied = true;
        }
    }

    if best_score == 0 || tied {
        Intent::Issue
    } else {
        best
    }
}

/// Map an intent to the persona that handles it
pub fn select_agent(intent: Intent, context: &MessageContext) -> &'static str {
    match intent {
        Intent::Capacity => CAPACITY_PLANNER.id,
        Intent::Standup => STANDUP_ASSISTANT.id,
        Intent::Breakdown => ISSUE_BREAKDOWN.id,
        Intent::Prioritization | Intent::Spec | Intent::Sprint => PRODUCT_MANAGER.id,
        Intent::Issue => {
            // Questions about a specific person are workload questions
            let mentions_user = context
                .mentioned_entities
                .iter()
                .any(|entity| entity.entity_type == "user");
            if mentions_user {
                CAPACITY_PLANNER.id
            } else {
                PRODUCT_MANAGER.id
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MentionedEntity;
    use rstest::rstest;

    #[rstest]
    #[case("Who has capacity for more work?", Intent::Capacity)]
    #[case("Is anyone overloaded?", Intent::Capacity)]
    #[case("Help me prioritize", Intent::Prioritization)]
    #[case("What's highest priority?", Intent::Prioritization)]
    #[case("Generate standup report", Intent::Standup)]
    #[case("Show me progress update", Intent::Standup)]
    #[case("What did the team do yesterday?", Intent::Standup)]
    #[case("Break down this feature", Intent::Breakdown)]
    #[case("Decompose into subtasks", Intent::Breakdown)]
    #[case("Write a spec for the login page", Intent::Spec)]
    #[case("How is our sprint velocity?", Intent::Sprint)]
    #[case("Find the login bug", Intent::Issue)]
    #[case("Hello, how are you?", Intent::Issue)]
    fn test_detect(#[case] message: &str, #[case] expected: Intent) {
        assert_eq!(detect(message), expected);
    }

    #[test]
    fn test_detect_is_case_insensitive() {
        assert_eq!(detect("STANDUP REPORT"), Intent::Standup);
    }

    #[test]
    fn test_tie_falls_back_to_issue() {
        // "workload" (capacity) and "show me" (issue) score one each
        assert_eq!(detect("Show me team workload"), Intent::Issue);
        // "most important" (prioritization) and "issue" score one each
        assert_eq!(detect("Most important issues"), Intent::Issue);
    }

    #[rstest]
    #[case(Intent::Capacity, "capacity-planner")]
    #[case(Intent::Prioritization, "product-manager")]
    #[case(Intent::Standup, "standup-assistant")]
    #[case(Intent::Breakdown, "issue-breakdown")]
    #[case(Intent::Spec, "product-manager")]
    #[case(Intent::Sprint, "product-manager")]
    #[case(Intent::Issue, "product-manager")]
    fn test_select_agent(#[case] intent: Intent, #[case] expected: &str) {
        assert_eq!(select_agent(intent, &MessageContext::default()), expected);
    }

    #[test]
    fn test_user_mention_routes_issue_to_capacity_planner() {
        let context = MessageContext {
            mentioned_entities: vec![MentionedEntity {
                entity_type: "user".to_string(),
                id: Some("u-2".to_string()),
                name: Some("Alice".to_string()),
            }],
            ..Default::default()
        };
        assert_eq!(select_agent(Intent::Issue, &context), "capacity-planner");
        // The override only applies to the general category
        assert_eq!(select_agent(Intent::Standup, &context), "standup-assistant");
    }
}
