use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DepartmentId, ProcessId, ProcessStepId, RoleId, UserId, WorkflowId};

/// Running (or finished) instance of a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInstance {
    /// Stable process identifier.
    pub process_id: ProcessId,
    /// Workflow the process was started from.
    pub workflow_id: WorkflowId,
    /// User who started the process.
    pub initiator_id: UserId,
    /// Lifecycle status as stored.
    pub status: String,
}

/// One step of a process instance and whom it is assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStepInstance {
    /// Stable step instance identifier.
    pub step_instance_id: ProcessStepId,
    /// Owning process.
    pub process_id: ProcessId,
    /// Directly assigned user.
    pub assigned_to: Option<UserId>,
    /// Assigned role.
    pub role_id: Option<RoleId>,
    /// Assigned department.
    pub department_id: Option<DepartmentId>,
    /// Lifecycle status as stored.
    pub status: String,
}

impl ProcessStepInstance {
    /// Returns whether the step is assigned to the user, one of the roles, or
    /// one of the departments.
    #[must_use]
    pub fn is_assigned_to(
        &self,
        user_id: UserId,
        role_ids: &HashSet<RoleId>,
        department_ids: &HashSet<DepartmentId>,
    ) -> bool {
        self.assigned_to == Some(user_id)
            || self.role_id.is_some_and(|role_id| role_ids.contains(&role_id))
            || self
                .department_id
                .is_some_and(|department_id| department_ids.contains(&department_id))
    }
}
