use docflow_domain::ProcessId;

use super::*;

impl AccessResolutionService {
    /// Resolves processes the user started, works on, or sees through
    /// workflow access.
    ///
    /// `only_workflow` narrows every source to the processes of one workflow.
    /// The narrowing happens in the store queries.
    pub(super) async fn resolve_process_ids(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        memberships: &SubjectMemberships,
        workflow_ids: &HashSet<WorkflowId>,
        only_workflow: Option<WorkflowId>,
    ) -> AppResult<HashSet<ProcessId>> {
        let user_id = memberships.user_id;
        let mut processes = snapshot
            .list_processes_initiated_by(user_id, only_workflow)
            .await?;

        processes.extend(
            snapshot
                .list_processes_with_assigned_steps(
                    user_id,
                    &memberships.sorted_role_ids(),
                    &memberships.sorted_department_ids(),
                    only_workflow,
                )
                .await?,
        );

        if !workflow_ids.is_empty() {
            let mut sorted_workflow_ids: Vec<WorkflowId> = workflow_ids.iter().copied().collect();
            sorted_workflow_ids.sort();
            processes.extend(
                snapshot
                    .list_processes_for_workflows(&sorted_workflow_ids)
                    .await?,
            );
        }

        Ok(processes
            .into_iter()
            .map(|process| process.process_id)
            .collect())
    }
}
