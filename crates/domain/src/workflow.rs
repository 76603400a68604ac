use std::collections::HashSet;
use std::str::FromStr;

use docflow_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{RoleId, UserId, WorkflowId, WorkflowStepId};

/// Step definition owned by a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// Stable step identifier.
    pub step_id: WorkflowStepId,
    /// Owning workflow.
    pub workflow_id: WorkflowId,
}

/// Kind of subject a workflow step is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssigneeType {
    /// Listed users.
    User,
    /// Members of the selected roles.
    Role,
    /// Members of the selected departments.
    Department,
}

impl AssigneeType {
    /// Returns the storage value for this assignee type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Role => "ROLE",
            Self::Department => "DEPARTMENT",
        }
    }
}

impl FromStr for AssigneeType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "USER" => Ok(Self::User),
            "ROLE" => Ok(Self::Role),
            "DEPARTMENT" => Ok(Self::Department),
            _ => Err(AppError::Validation(format!(
                "unknown assignee type '{value}'"
            ))),
        }
    }
}

/// Step assignment joined with the workflow that owns the step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowAssignment {
    /// Assigned step.
    pub step_id: WorkflowStepId,
    /// Workflow owning the step.
    pub workflow_id: WorkflowId,
    /// Assignee kind.
    pub assignee_type: AssigneeType,
    /// Users, read when the assignee type is `USER`.
    pub assignee_ids: Vec<UserId>,
    /// Role or department identifiers, read for `ROLE` and `DEPARTMENT`.
    pub selected_roles: Vec<Uuid>,
}

impl WorkflowAssignment {
    /// Returns whether the assignment reaches the user.
    ///
    /// Department assignments are matched against the user's role
    /// identifiers, not department identifiers. This mirrors the access
    /// rules already deployed; changing it changes who can see workflows.
    #[must_use]
    pub fn matches_subject(&self, user_id: UserId, role_ids: &HashSet<RoleId>) -> bool {
        match self.assignee_type {
            AssigneeType::User => self.assignee_ids.contains(&user_id),
            AssigneeType::Role | AssigneeType::Department => self
                .selected_roles
                .iter()
                .any(|selected| role_ids.contains(&RoleId::from_uuid(*selected))),
        }
    }
}
