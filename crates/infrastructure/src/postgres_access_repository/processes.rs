use super::*;

impl PostgresAccessSnapshot {
    pub(super) async fn list_processes_initiated_by_impl(
        &mut self,
        user_id: UserId,
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>> {
        let rows = sqlx::query_as::<_, ProcessRow>(
            r#"
            SELECT id, workflow_id, initiator_id, status
            FROM process_instances
            WHERE initiator_id = $1
                AND ($2::UUID IS NULL OR workflow_id = $2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(workflow_id.map(|workflow_id| workflow_id.as_uuid()))
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load initiated processes: {error}"))
        })?;

        Ok(rows.into_iter().map(ProcessInstance::from).collect())
    }

    pub(super) async fn list_processes_with_assigned_steps_impl(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
        department_ids: &[DepartmentId],
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>> {
        let department_uuids: Vec<Uuid> = department_ids
            .iter()
            .map(DepartmentId::as_uuid)
            .collect();

        let rows = sqlx::query_as::<_, ProcessRow>(
            r#"
            SELECT DISTINCT
                processes.id,
                processes.workflow_id,
                processes.initiator_id,
                processes.status
            FROM process_instances AS processes
            INNER JOIN process_step_instances AS steps
                ON steps.process_id = processes.id
            WHERE (
                    steps.assigned_to = $1
                    OR steps.role_id = ANY($2)
                    OR steps.department_id = ANY($3)
                )
                AND ($4::UUID IS NULL OR processes.workflow_id = $4)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_uuids(role_ids))
        .bind(department_uuids)
        .bind(workflow_id.map(|workflow_id| workflow_id.as_uuid()))
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load assigned processes: {error}"))
        })?;

        Ok(rows.into_iter().map(ProcessInstance::from).collect())
    }

    pub(super) async fn list_processes_for_workflows_impl(
        &mut self,
        workflow_ids: &[WorkflowId],
    ) -> AppResult<Vec<ProcessInstance>> {
        let workflow_uuids: Vec<Uuid> = workflow_ids.iter().map(WorkflowId::as_uuid).collect();

        let rows = sqlx::query_as::<_, ProcessRow>(
            r#"
            SELECT id, workflow_id, initiator_id, status
            FROM process_instances
            WHERE workflow_id = ANY($1)
            "#,
        )
        .bind(workflow_uuids)
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load workflow processes: {error}"))
        })?;

        Ok(rows.into_iter().map(ProcessInstance::from).collect())
    }
}
