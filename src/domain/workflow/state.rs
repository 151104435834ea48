//! Workflow state machine

use serde::{Deserialize, Serialize};

/// Progress of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Start,
    /// Plan validated
    Configured,
    AgentCreated,
    /// Document ingestion finished and passed the ingestion policy
    KnowledgeIngested,
    /// Response written to the output sink
    Answered,
    Failed,
}

impl WorkflowState {
    /// Next state on the success path, `None` for terminal states
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Start => Some(Self::Configured),
            Self::Configured => Some(Self::AgentCreated),
            Self::AgentCreated => Some(Self::KnowledgeIngested),
            Self::KnowledgeIngested => Some(Self::Answered),
            Self::Answered | Self::Failed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Answered | Self::Failed)
    }

    /// Whether moving from `self` to `target` is a legal transition
    pub fn can_transition_to(&self, target: Self) -> bool {
        match target {
            Self::Failed => !self.is_terminal(),
            _ => self.next() == Some(target),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Configured => "configured",
            Self::AgentCreated => "agent_created",
            Self::KnowledgeIngested => "knowledge_ingested",
            Self::Answered => "answered",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_path() {
        let mut state = WorkflowState::Start;
        let mut visited = vec![state];
        while let Some(next) = state.next() {
            assert!(state.can_transition_to(next));
            state = next;
            visited.push(state);
        }

        assert_eq!(
            visited,
            vec![
                WorkflowState::Start,
                WorkflowState::Configured,
                WorkflowState::AgentCreated,
                WorkflowState::KnowledgeIngested,
                WorkflowState::Answered,
            ]
        );
    }

    #[test]
    fn test_failed_reachable_from_non_terminal_states() {
        for state in [
            WorkflowState::Start,
            WorkflowState::Configured,
            WorkflowState::AgentCreated,
            WorkflowState::KnowledgeIngested,
        ] {
            assert!(state.can_transition_to(WorkflowState::Failed));
        }
        assert!(!WorkflowState::Answered.can_transition_to(WorkflowState::Failed));
        assert!(!WorkflowState::Failed.can_transition_to(WorkflowState::Failed));
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!WorkflowState::Start.can_transition_to(WorkflowState::AgentCreated));
        assert!(!WorkflowState::Configured.can_transition_to(WorkflowState::Answered));
        assert!(!WorkflowState::Answered.can_transition_to(WorkflowState::Start));
    }

    #[test]
    fn test_display() {
        assert_eq!(WorkflowState::KnowledgeIngested.to_string(), "knowledge_ingested");
    }
}
