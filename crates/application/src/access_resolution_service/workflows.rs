use super::*;

impl AccessResolutionService {
    /// Resolves workflows with at least one step assigned to the user.
    pub(super) async fn resolve_workflow_ids(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        memberships: &SubjectMemberships,
    ) -> AppResult<HashSet<WorkflowId>> {
        let user_id = memberships.user_id;
        let assignments = snapshot
            .list_workflow_assignments_for_subject(user_id, &memberships.sorted_role_ids())
            .await?;

        Ok(assignments
            .into_iter()
            .filter(|assignment| assignment.matches_subject(user_id, &memberships.role_ids))
            .map(|assignment| assignment.workflow_id)
            .collect())
    }
}
