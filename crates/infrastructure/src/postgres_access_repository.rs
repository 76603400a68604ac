use std::str::FromStr;

use async_trait::async_trait;

use docflow_application::{AccessRepository, AccessSnapshot};
use docflow_core::{AppError, AppResult};
use docflow_domain::{
    AccessLevel, AccessType, AssigneeType, DepartmentId, DepartmentMembership,
    DocumentAccessGrant, DocumentId, DocumentLink, GrantSubject, ProcessId, ProcessInstance,
    RoleAssignment, RoleId, UserId, UserProfile, WorkflowAssignment, WorkflowId, WorkflowStepId,
};

use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

mod documents;
mod identity;
mod processes;
mod workflows;


/// PostgreSQL-backed repository for access resolution reads.
#[derive(Clone)]
pub struct PostgresAccessRepository {
    pool: PgPool,
}

impl PostgresAccessRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessRepository for PostgresAccessRepository {
    async fn open_snapshot(&self) -> AppResult<Box<dyn AccessSnapshot>> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to configure snapshot isolation: {error}"))
            })?;
        debug!("opened repeatable-read access snapshot");

        Ok(Box::new(PostgresAccessSnapshot {
            transaction: Some(transaction),
        }))
    }
}

/// Repeatable-read, read-only transaction holding one pooled connection.
///
/// Dropping an unfinished snapshot rolls the transaction back.
pub struct PostgresAccessSnapshot {
    transaction: Option<Transaction<'static, Postgres>>,
}

impl PostgresAccessSnapshot {
    fn connection(&mut self) -> AppResult<&mut PgConnection> {
        self.transaction
            .as_deref_mut()
            .ok_or_else(|| AppError::Internal("access snapshot already finished".to_owned()))
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    is_admin: bool,
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    role_id: Uuid,
    is_admin: bool,
    is_root_level: bool,
}

#[derive(Debug, FromRow)]
struct DocumentGrantRow {
    document_id: Uuid,
    user_id: Option<Uuid>,
    role_id: Option<Uuid>,
    access_level: String,
    access_types: Vec<String>,
}

#[derive(Debug, FromRow)]
struct DocumentLinkRow {
    id: Uuid,
    parent_id: Option<Uuid>,
}

#[derive(Debug, FromRow)]
struct WorkflowAssignmentRow {
    step_id: Uuid,
    workflow_id: Uuid,
    assignee_type: String,
    assignee_ids: Vec<Uuid>,
    selected_roles: Vec<Uuid>,
}

#[derive(Debug, FromRow)]
struct ProcessRow {
    id: Uuid,
    workflow_id: Uuid,
    initiator_id: Uuid,
    status: String,
}

impl TryFrom<DocumentGrantRow> for DocumentAccessGrant {
    type Error = AppError;

    fn try_from(row: DocumentGrantRow) -> Result<Self, Self::Error> {
        let subject = match (row.user_id, row.role_id) {
            (Some(user_id), _) => GrantSubject::User(UserId::from_uuid(user_id)),
            (None, Some(role_id)) => GrantSubject::Role(RoleId::from_uuid(role_id)),
            (None, None) => {
                return Err(AppError::Internal(format!(
                    "document grant on '{}' has neither user nor role",
                    row.document_id
                )));
            }
        };

        let access_level = AccessLevel::from_str(row.access_level.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "failed to decode access level for document '{}': {error}",
                row.document_id
            ))
        })?;

        let access_types = row
            .access_types
            .iter()
            .map(|value| {
                AccessType::from_str(value.as_str()).map_err(|error| {
                    AppError::Internal(format!(
                        "failed to decode access type for document '{}': {error}",
                        row.document_id
                    ))
                })
            })
            .collect::<AppResult<_>>()?;

        Ok(Self {
            document_id: DocumentId::from_uuid(row.document_id),
            subject,
            access_level,
            access_types,
        })
    }
}

impl TryFrom<WorkflowAssignmentRow> for WorkflowAssignment {
    type Error = AppError;

    fn try_from(row: WorkflowAssignmentRow) -> Result<Self, Self::Error> {
        let assignee_type =
            AssigneeType::from_str(row.assignee_type.as_str()).map_err(|error| {
                AppError::Internal(format!(
                    "failed to decode assignee type for step '{}': {error}",
                    row.step_id
                ))
            })?;

        Ok(Self {
            step_id: WorkflowStepId::from_uuid(row.step_id),
            workflow_id: WorkflowId::from_uuid(row.workflow_id),
            assignee_type,
            assignee_ids: row.assignee_ids.into_iter().map(UserId::from_uuid).collect(),
            selected_roles: row.selected_roles,
        })
    }
}

impl From<ProcessRow> for ProcessInstance {
    fn from(row: ProcessRow) -> Self {
        Self {
            process_id: ProcessId::from_uuid(row.id),
            workflow_id: WorkflowId::from_uuid(row.workflow_id),
            initiator_id: UserId::from_uuid(row.initiator_id),
            status: row.status,
        }
    }
}

#[async_trait]
impl AccessSnapshot for PostgresAccessSnapshot {
    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        self.find_user_impl(user_id).await
    }

    async fn list_role_assignments(&mut self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        self.list_role_assignments_impl(user_id).await
    }

    async fn list_department_memberships(
        &mut self,
        user_id: UserId,
    ) -> AppResult<Vec<DepartmentMembership>> {
        self.list_department_memberships_impl(user_id).await
    }

    async fn list_document_grants(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<DocumentAccessGrant>> {
        self.list_document_grants_impl(user_id, role_ids).await
    }

    async fn list_document_links(&mut self) -> AppResult<Vec<DocumentLink>> {
        self.list_document_links_impl().await
    }

    async fn list_documents_created_by(&mut self, user_id: UserId) -> AppResult<Vec<DocumentId>> {
        self.list_documents_created_by_impl(user_id).await
    }

    async fn list_workflow_assignments_for_subject(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<WorkflowAssignment>> {
        self.list_workflow_assignments_for_subject_impl(user_id, role_ids)
            .await
    }

    async fn workflow_exists(&mut self, workflow_id: WorkflowId) -> AppResult<bool> {
        self.workflow_exists_impl(workflow_id).await
    }

    async fn list_processes_initiated_by(
        &mut self,
        user_id: UserId,
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>> {
        self.list_processes_initiated_by_impl(user_id, workflow_id)
            .await
    }

    async fn list_processes_with_assigned_steps(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
        department_ids: &[DepartmentId],
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>> {
        self.list_processes_with_assigned_steps_impl(
            user_id,
            role_ids,
            department_ids,
            workflow_id,
        )
        .await
    }

    async fn list_processes_for_workflows(
        &mut self,
        workflow_ids: &[WorkflowId],
    ) -> AppResult<Vec<ProcessInstance>> {
        self.list_processes_for_workflows_impl(workflow_ids).await
    }

    async fn finish(&mut self) -> AppResult<()> {
        let Some(transaction) = self.transaction.take() else {
            return Ok(());
        };

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to release access snapshot: {error}"))
        })
    }
}

fn role_uuids(role_ids: &[RoleId]) -> Vec<Uuid> {
    role_ids.iter().map(RoleId::as_uuid).collect()
}
