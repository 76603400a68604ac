//! Access resolution inputs and outputs.

use std::collections::HashSet;

use docflow_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{DepartmentId, DocumentId, ProcessId, RoleAssignment, RoleId, UserId, WorkflowId};

/// Role and department memberships resolved for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMemberships {
    /// User the memberships belong to.
    pub user_id: UserId,
    /// Role membership records, including role flags.
    pub role_assignments: Vec<RoleAssignment>,
    /// Distinct role identifiers.
    pub role_ids: HashSet<RoleId>,
    /// Distinct department identifiers.
    pub department_ids: HashSet<DepartmentId>,
}

impl SubjectMemberships {
    /// Builds memberships from raw records, deduplicating identifiers.
    #[must_use]
    pub fn new(
        user_id: UserId,
        role_assignments: Vec<RoleAssignment>,
        department_ids: impl IntoIterator<Item = DepartmentId>,
    ) -> Self {
        let role_ids = role_assignments
            .iter()
            .map(|assignment| assignment.role_id)
            .collect();

        Self {
            user_id,
            role_assignments,
            role_ids,
            department_ids: department_ids.into_iter().collect(),
        }
    }

    /// Returns role identifiers as a sorted list, for store queries.
    #[must_use]
    pub fn sorted_role_ids(&self) -> Vec<RoleId> {
        let mut values: Vec<RoleId> = self.role_ids.iter().copied().collect();
        values.sort();
        values
    }

    /// Returns department identifiers as a sorted list, for store queries.
    #[must_use]
    pub fn sorted_department_ids(&self) -> Vec<DepartmentId> {
        let mut values: Vec<DepartmentId> = self.department_ids.iter().copied().collect();
        values.sort();
        values
    }
}

/// Identifier sets a user may query.
///
/// An absent set means "apply no filter" and only occurs for administrators.
/// A present but empty set means the user sees nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AccessScopeRecord")]
pub struct AccessScope {
    is_admin: bool,
    document_ids: Option<HashSet<DocumentId>>,
    workflow_ids: Option<HashSet<WorkflowId>>,
    process_ids: Option<HashSet<ProcessId>>,
}

#[derive(Deserialize)]
struct AccessScopeRecord {
    is_admin: bool,
    document_ids: Option<HashSet<DocumentId>>,
    workflow_ids: Option<HashSet<WorkflowId>>,
    process_ids: Option<HashSet<ProcessId>>,
}

impl TryFrom<AccessScopeRecord> for AccessScope {
    type Error = AppError;

    fn try_from(record: AccessScopeRecord) -> Result<Self, Self::Error> {
        match record {
            AccessScopeRecord {
                is_admin: true,
                document_ids: None,
                workflow_ids: None,
                process_ids: None,
            } => Ok(Self::unrestricted()),
            AccessScopeRecord {
                is_admin: false,
                document_ids: Some(document_ids),
                workflow_ids: Some(workflow_ids),
                process_ids: Some(process_ids),
            } => Ok(Self::restricted(document_ids, workflow_ids, process_ids)),
            AccessScopeRecord { is_admin: true, .. } => Err(AppError::Validation(
                "administrator scope must not carry identifier sets".to_owned(),
            )),
            AccessScopeRecord { is_admin: false, .. } => Err(AppError::Validation(
                "restricted scope must carry every identifier set".to_owned(),
            )),
        }
    }
}

impl AccessScope {
    /// Scope for administrators: every set absent.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            is_admin: true,
            document_ids: None,
            workflow_ids: None,
            process_ids: None,
        }
    }

    /// Scope for regular users: every set present, possibly empty.
    #[must_use]
    pub fn restricted(
        document_ids: HashSet<DocumentId>,
        workflow_ids: HashSet<WorkflowId>,
        process_ids: HashSet<ProcessId>,
    ) -> Self {
        Self {
            is_admin: false,
            document_ids: Some(document_ids),
            workflow_ids: Some(workflow_ids),
            process_ids: Some(process_ids),
        }
    }

    /// Returns whether the user bypasses access filtering.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// Returns the document filter, `None` when unrestricted.
    #[must_use]
    pub fn document_ids(&self) -> Option<&HashSet<DocumentId>> {
        self.document_ids.as_ref()
    }

    /// Returns the workflow filter, `None` when unrestricted.
    #[must_use]
    pub fn workflow_ids(&self) -> Option<&HashSet<WorkflowId>> {
        self.workflow_ids.as_ref()
    }

    /// Returns the process filter, `None` when unrestricted.
    #[must_use]
    pub fn process_ids(&self) -> Option<&HashSet<ProcessId>> {
        self.process_ids.as_ref()
    }

    /// Returns whether the document passes the filter.
    #[must_use]
    pub fn allows_document(&self, document_id: DocumentId) -> bool {
        allows(self.document_ids.as_ref(), &document_id)
    }

    /// Returns whether the workflow passes the filter.
    #[must_use]
    pub fn allows_workflow(&self, workflow_id: WorkflowId) -> bool {
        allows(self.workflow_ids.as_ref(), &workflow_id)
    }

    /// Returns whether the process passes the filter.
    #[must_use]
    pub fn allows_process(&self, process_id: ProcessId) -> bool {
        allows(self.process_ids.as_ref(), &process_id)
    }
}

/// Process identifiers visible within a single workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowProcessScope {
    /// Workflow the scope is limited to.
    pub workflow_id: WorkflowId,
    /// Whether the user bypasses access filtering.
    pub is_admin: bool,
    /// Visible processes of the workflow, `None` when unrestricted.
    pub process_ids: Option<HashSet<ProcessId>>,
}

impl WorkflowProcessScope {
    /// Returns whether the process passes the filter.
    #[must_use]
    pub fn allows_process(&self, process_id: ProcessId) -> bool {
        allows(self.process_ids.as_ref(), &process_id)
    }
}

fn allows<T: Eq + std::hash::Hash>(filter: Option<&HashSet<T>>, value: &T) -> bool {
    filter.is_none_or(|values| values.contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_scope_allows_everything() {
        let scope = AccessScope::unrestricted();

        assert!(scope.is_admin());
        assert!(scope.document_ids().is_none());
        assert!(scope.allows_document(DocumentId::new()));
        assert!(scope.allows_process(ProcessId::new()));
    }

    #[test]
    fn empty_restricted_scope_allows_nothing() {
        let scope = AccessScope::restricted(HashSet::new(), HashSet::new(), HashSet::new());

        assert!(!scope.is_admin());
        assert_eq!(scope.document_ids().map(HashSet::len), Some(0));
        assert!(!scope.allows_document(DocumentId::new()));
        assert!(!scope.allows_workflow(WorkflowId::new()));
    }

    #[test]
    fn memberships_deduplicate_roles() {
        let user_id = UserId::new();
        let role_id = RoleId::new();
        let assignment = RoleAssignment {
            user_id,
            role_id,
            role_is_admin: false,
            role_is_root_level: false,
        };
        let department_id = DepartmentId::new();

        let memberships = SubjectMemberships::new(
            user_id,
            vec![assignment.clone(), assignment],
            [department_id, department_id],
        );

        assert_eq!(memberships.role_assignments.len(), 2);
        assert_eq!(memberships.sorted_role_ids(), vec![role_id]);
        assert_eq!(memberships.sorted_department_ids(), vec![department_id]);
    }

    #[test]
    fn scope_serializes_absent_sets_as_null() {
        let encoded = serde_json::to_value(AccessScope::unrestricted())
            .unwrap_or_else(|_| panic!("test"));

        assert_eq!(encoded["is_admin"], serde_json::Value::Bool(true));
        assert!(encoded["document_ids"].is_null());
    }

    #[test]
    fn restricted_scope_round_trips_through_json() {
        let document_id = DocumentId::new();
        let scope = AccessScope::restricted(
            HashSet::from([document_id]),
            HashSet::new(),
            HashSet::new(),
        );
        let encoded = serde_json::to_string(&scope).unwrap_or_else(|_| panic!("test"));

        let decoded = serde_json::from_str::<AccessScope>(encoded.as_str());

        assert_eq!(decoded.ok(), Some(scope));
    }

    #[test]
    fn non_admin_scope_without_sets_is_rejected() {
        let decoded = serde_json::from_str::<AccessScope>(
            r#"{"is_admin":false,"document_ids":null,"workflow_ids":[],"process_ids":[]}"#,
        );

        assert!(decoded.is_err());
    }

    #[test]
    fn admin_scope_with_sets_is_rejected() {
        let decoded = serde_json::from_str::<AccessScope>(
            r#"{"is_admin":true,"document_ids":[],"workflow_ids":null,"process_ids":null}"#,
        );

        assert!(decoded.is_err());
    }
}
