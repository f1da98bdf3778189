use derive_more::{Display, Error};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    access_rules::Relation,
    auth::Auth,
    repository::{Entity, HasLastModified},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[display(fmt = "open")]
    Open,
    #[display(fmt = "in_progress")]
    InProgress,
    #[display(fmt = "resolved")]
    Resolved,
    #[display(fmt = "closed")]
    Closed,
    #[display(fmt = "reopened")]
    Reopened,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum TransitionError {
    #[display(fmt = "Cannot transition from '{}' to '{}'", from, to)]
    InvalidTransition { from: IssueStatus, to: IssueStatus },
    #[display(fmt = "Critical issues cannot be closed without at least one comment")]
    MissingRequiredComment,
}

impl IssueStatus {
    /// The issue lifecycle graph. Kept as data so the edge set is the
    /// single place transitions are defined.
    pub fn allowed_transitions(&self) -> &'static [IssueStatus] {
        match self {
            IssueStatus::Open => &[IssueStatus::InProgress],
            IssueStatus::InProgress => &[IssueStatus::Resolved],
            IssueStatus::Resolved => &[IssueStatus::Closed, IssueStatus::Reopened],
            IssueStatus::Closed => &[IssueStatus::Reopened],
            IssueStatus::Reopened => &[IssueStatus::Open, IssueStatus::InProgress],
        }
    }

    /// Validates a requested status change. Self-transitions are not edges:
    /// an unchanged status must not reach this call.
    pub fn transition(
        self,
        requested: IssueStatus,
        priority: Priority,
        has_comment: bool,
    ) -> Result<IssueStatus, TransitionError> {
        if !self.allowed_transitions().contains(&requested) {
            return Err(TransitionError::InvalidTransition {
                from: self,
                to: requested,
            });
        }

        if requested == IssueStatus::Closed && priority == Priority::Critical && !has_comment {
            return Err(TransitionError::MissingRequiredComment);
        }

        Ok(requested)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue<Id> {
    pub id: Id,
    pub project_id: Id,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
    pub priority: Priority,
    pub reporter: Id,
    pub assignee: Option<Id>,
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub last_modified: i64,
}

impl Issue<String> {
    pub fn parse(self) -> Issue<ObjectId> {
        Issue {
            id: self.id.parse().unwrap(),
            project_id: self.project_id.parse().unwrap(),
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            reporter: self.reporter.parse().unwrap(),
            assignee: self.assignee.map(|id| id.parse().unwrap()),
            due_date: self.due_date,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

impl Issue<ObjectId> {
    pub fn stringify(self) -> Issue<String> {
        Issue {
            id: self.id.to_hex(),
            project_id: self.project_id.to_hex(),
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            reporter: self.reporter.to_hex(),
            assignee: self.assignee.map(|id| id.to_hex()),
            due_date: self.due_date,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }

    /// Relationship labels are derived per request, never stored.
    pub fn relations(&self, auth: &Auth) -> Vec<Relation> {
        let mut relations = Vec::new();
        if let Some(id) = auth.id() {
            if &self.reporter == id {
                relations.push(Relation::Reporter);
            }
            if self.assignee.as_ref() == Some(id) {
                relations.push(Relation::Assignee);
            }
        }
        relations
    }
}

impl Entity for Issue<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}

impl HasLastModified for Issue<ObjectId> {
    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn set_last_modified(&mut self, timestamp: i64) {
        self.last_modified = timestamp;
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicIssue {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
    pub priority: Priority,
    pub reporter: String,
    pub assignee: Option<String>,
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub valid_transitions: Vec<IssueStatus>,
}

impl From<Issue<ObjectId>> for PublicIssue {
    fn from(issue: Issue<ObjectId>) -> Self {
        let valid_transitions = issue.status.allowed_transitions().to_vec();
        Self {
            id: issue.id.to_hex(),
            project_id: issue.project_id.to_hex(),
            title: issue.title,
            description: issue.description,
            status: issue.status,
            priority: issue.priority,
            reporter: issue.reporter.to_hex(),
            assignee: issue.assignee.map(|id| id.to_hex()),
            due_date: issue.due_date,
            created_at: issue.created_at,
            valid_transitions,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const ALL: [IssueStatus; 5] = [
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
        IssueStatus::Closed,
        IssueStatus::Reopened,
    ];

    #[test]
    fn every_pair_outside_the_edge_set_is_rejected() {
        for current in ALL {
            for requested in ALL {
                let result = current.transition(requested, Priority::Low, true);
                if current.allowed_transitions().contains(&requested) {
                    assert_eq!(result, Ok(requested));
                } else {
                    assert_eq!(
                        result,
                        Err(TransitionError::InvalidTransition {
                            from: current,
                            to: requested,
                        })
                    );
                }
            }
        }
    }

    #[test]
    fn self_transitions_are_rejected() {
        for status in ALL {
            assert_eq!(
                status.transition(status, Priority::Low, true),
                Err(TransitionError::InvalidTransition {
                    from: status,
                    to: status,
                })
            );
        }
    }

    #[test]
    fn critical_close_requires_a_comment() {
        assert_eq!(
            IssueStatus::Resolved.transition(IssueStatus::Closed, Priority::Critical, false),
            Err(TransitionError::MissingRequiredComment)
        );
        assert_eq!(
            IssueStatus::Resolved.transition(IssueStatus::Closed, Priority::Critical, true),
            Ok(IssueStatus::Closed)
        );
    }

    #[test]
    fn comment_rule_applies_only_to_critical() {
        assert_eq!(
            IssueStatus::Resolved.transition(IssueStatus::Closed, Priority::High, false),
            Ok(IssueStatus::Closed)
        );
    }

    #[test]
    fn comment_rule_applies_only_to_the_closing_edge() {
        assert_eq!(
            IssueStatus::Closed.transition(IssueStatus::Reopened, Priority::Critical, false),
            Ok(IssueStatus::Reopened)
        );
        assert_eq!(
            IssueStatus::InProgress.transition(IssueStatus::Resolved, Priority::Critical, false),
            Ok(IssueStatus::Resolved)
        );
    }

    #[test]
    fn resolving_a_low_priority_issue_succeeds() {
        assert_eq!(
            IssueStatus::InProgress.transition(IssueStatus::Resolved, Priority::Low, false),
            Ok(IssueStatus::Resolved)
        );
    }

    #[test]
    fn transition_is_idempotent_over_repeated_calls() {
        for _ in 0..3 {
            assert_eq!(
                IssueStatus::Resolved.transition(IssueStatus::Closed, Priority::Critical, false),
                Err(TransitionError::MissingRequiredComment)
            );
            assert_eq!(
                IssueStatus::Open.transition(IssueStatus::InProgress, Priority::Medium, false),
                Ok(IssueStatus::InProgress)
            );
        }
    }
}
