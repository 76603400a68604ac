use super::*;

impl PostgresAccessSnapshot {
    pub(super) async fn list_workflow_assignments_for_subject_impl(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<WorkflowAssignment>> {
        // DEPARTMENT assignments are matched on role identifiers as well.
        let rows = sqlx::query_as::<_, WorkflowAssignmentRow>(
            r#"
            SELECT
                assignments.step_id,
                steps.workflow_id,
                assignments.assignee_type,
                assignments.assignee_ids,
                assignments.selected_roles
            FROM workflow_assignments AS assignments
            INNER JOIN workflow_steps AS steps
                ON steps.id = assignments.step_id
            WHERE (assignments.assignee_type = 'USER' AND $1 = ANY(assignments.assignee_ids))
                OR (
                    assignments.assignee_type IN ('ROLE', 'DEPARTMENT')
                    AND assignments.selected_roles && $2::uuid[]
                )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_uuids(role_ids))
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load workflow assignments: {error}"))
        })?;

        rows.into_iter().map(WorkflowAssignment::try_from).collect()
    }

    pub(super) async fn workflow_exists_impl(&mut self, workflow_id: WorkflowId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM workflows
                WHERE id = $1
            )
            "#,
        )
        .bind(workflow_id.as_uuid())
        .fetch_one(self.connection()?)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve workflow: {error}")))
    }
}
