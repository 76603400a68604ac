use async_trait::async_trait;
use docflow_core::AppResult;
use docflow_domain::{
    DepartmentId, DepartmentMembership, DocumentAccessGrant, DocumentId, DocumentLink,
    ProcessInstance, RoleAssignment, RoleId, UserId, UserProfile, WorkflowAssignment, WorkflowId,
};

/// Repository port handing out consistent read snapshots of access data.
#[async_trait]
pub trait AccessRepository: Send + Sync {
    /// Opens a read-only snapshot.
    ///
    /// Every read performed by one resolution call goes through the same
    /// snapshot so grants and hierarchy are observed at a single point in time.
    async fn open_snapshot(&self) -> AppResult<Box<dyn AccessSnapshot>>;
}

/// Point-in-time, read-only view over users, grants, workflows, and processes.
#[async_trait]
pub trait AccessSnapshot: Send {
    /// Finds a user record.
    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<UserProfile>>;

    /// Lists the user's role memberships joined with role flags.
    async fn list_role_assignments(&mut self, user_id: UserId) -> AppResult<Vec<RoleAssignment>>;

    /// Lists the user's department memberships.
    async fn list_department_memberships(
        &mut self,
        user_id: UserId,
    ) -> AppResult<Vec<DepartmentMembership>>;

    /// Lists grants issued to the user directly or to any of the roles.
    async fn list_document_grants(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<DocumentAccessGrant>>;

    /// Lists the hierarchy edge of every document in one batch.
    async fn list_document_links(&mut self) -> AppResult<Vec<DocumentLink>>;

    /// Lists documents authored by the user.
    async fn list_documents_created_by(&mut self, user_id: UserId) -> AppResult<Vec<DocumentId>>;

    /// Lists step assignments that name the user or intersect the roles.
    async fn list_workflow_assignments_for_subject(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<WorkflowAssignment>>;

    /// Returns whether the workflow exists.
    async fn workflow_exists(&mut self, workflow_id: WorkflowId) -> AppResult<bool>;

    /// Lists processes started by the user, optionally within one workflow.
    async fn list_processes_initiated_by(
        &mut self,
        user_id: UserId,
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>>;

    /// Lists processes with at least one step assigned to the user, one of
    /// the roles, or one of the departments, optionally within one workflow.
    async fn list_processes_with_assigned_steps(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
        department_ids: &[DepartmentId],
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>>;

    /// Lists every process started from one of the workflows.
    async fn list_processes_for_workflows(
        &mut self,
        workflow_ids: &[WorkflowId],
    ) -> AppResult<Vec<ProcessInstance>>;

    /// Releases the snapshot.
    async fn finish(&mut self) -> AppResult<()>;
}
