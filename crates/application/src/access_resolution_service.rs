use std::collections::HashSet;
use std::sync::Arc;

use docflow_core::{AppError, AppResult, UserIdentity};
use docflow_domain::{
    AccessScope, SubjectMemberships, TraversalLimits, UserId, UserProfile, WorkflowId,
    WorkflowProcessScope,
};
use tracing::{debug, error, info, warn};

use crate::access_ports::{AccessRepository, AccessSnapshot};

mod documents;
mod memberships;
mod processes;
mod workflows;


/// Computes the documents, workflows, and processes a user may see.
#[derive(Clone)]
pub struct AccessResolutionService {
    repository: Arc<dyn AccessRepository>,
    limits: TraversalLimits,
}

impl AccessResolutionService {
    /// Creates a resolution service with default traversal limits.
    #[must_use]
    pub fn new(repository: Arc<dyn AccessRepository>) -> Self {
        Self {
            repository,
            limits: TraversalLimits::default(),
        }
    }

    /// Overrides the bounds applied to document hierarchy walks.
    #[must_use]
    pub fn with_traversal_limits(mut self, limits: TraversalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Resolves the access scope of an authenticated actor.
    pub async fn resolve_identity(&self, actor: &UserIdentity) -> AppResult<AccessScope> {
        self.resolve(UserId::from_uuid(actor.subject())).await
    }

    /// Resolves the access scope of a user.
    ///
    /// Administrators get an unrestricted scope. Everyone else gets every set
    /// computed, possibly empty. Any failure aborts the whole resolution.
    pub async fn resolve(&self, user_id: UserId) -> AppResult<AccessScope> {
        let mut snapshot = self.open_snapshot(user_id).await?;
        let result = self.resolve_in_snapshot(snapshot.as_mut(), user_id).await;
        self.finish_snapshot(snapshot.as_mut(), user_id, result)
            .await
    }

    /// Resolves the processes a user may see within one workflow.
    ///
    /// Fails with `NotFound` for unknown workflows and with `Forbidden` when a
    /// non-administrator has no access to the workflow.
    pub async fn resolve_for_workflow(
        &self,
        user_id: UserId,
        workflow_id: WorkflowId,
    ) -> AppResult<WorkflowProcessScope> {
        let mut snapshot = self.open_snapshot(user_id).await?;
        let result = self
            .resolve_workflow_in_snapshot(snapshot.as_mut(), user_id, workflow_id)
            .await;
        self.finish_snapshot(snapshot.as_mut(), user_id, result)
            .await
    }

    /// Returns whether the user bypasses access resolution.
    pub async fn is_admin(&self, user_id: UserId) -> AppResult<bool> {
        let mut snapshot = self.open_snapshot(user_id).await?;
        let result = self.is_admin_in_snapshot(snapshot.as_mut(), user_id).await;
        self.finish_snapshot(snapshot.as_mut(), user_id, result)
            .await
    }

    async fn is_admin_in_snapshot(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        user_id: UserId,
    ) -> AppResult<bool> {
        let (profile, memberships) = self.load_memberships(snapshot, user_id).await?;
        Ok(grants_admin_bypass(&profile, &memberships))
    }

    async fn resolve_in_snapshot(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        user_id: UserId,
    ) -> AppResult<AccessScope> {
        let (profile, memberships) = self.load_memberships(snapshot, user_id).await?;

        if grants_admin_bypass(&profile, &memberships) {
            info!(user_id = %user_id, "access resolution bypassed for administrator");
            return Ok(AccessScope::unrestricted());
        }

        let document_ids = self.resolve_document_ids(snapshot, &memberships).await?;
        let workflow_ids = self.resolve_workflow_ids(snapshot, &memberships).await?;
        let process_ids = self
            .resolve_process_ids(snapshot, &memberships, &workflow_ids, None)
            .await?;

        debug!(
            user_id = %user_id,
            document_count = document_ids.len(),
            workflow_count = workflow_ids.len(),
            process_count = process_ids.len(),
            "access scope resolved"
        );

        Ok(AccessScope::restricted(
            document_ids,
            workflow_ids,
            process_ids,
        ))
    }

    async fn resolve_workflow_in_snapshot(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        user_id: UserId,
        workflow_id: WorkflowId,
    ) -> AppResult<WorkflowProcessScope> {
        let (profile, memberships) = self.load_memberships(snapshot, user_id).await?;

        if !snapshot.workflow_exists(workflow_id).await? {
            return Err(AppError::NotFound(format!(
                "workflow '{workflow_id}' does not exist"
            )));
        }

        if grants_admin_bypass(&profile, &memberships) {
            info!(
                user_id = %user_id,
                workflow_id = %workflow_id,
                "workflow access resolution bypassed for administrator"
            );
            return Ok(WorkflowProcessScope {
                workflow_id,
                is_admin: true,
                process_ids: None,
            });
        }

        let workflow_ids = self.resolve_workflow_ids(snapshot, &memberships).await?;
        if !workflow_ids.contains(&workflow_id) {
            warn!(
                user_id = %user_id,
                workflow_id = %workflow_id,
                "workflow access denied"
            );
            return Err(AppError::Forbidden(format!(
                "user '{user_id}' has no access to workflow '{workflow_id}'"
            )));
        }

        let process_ids = self
            .resolve_process_ids(
                snapshot,
                &memberships,
                &HashSet::from([workflow_id]),
                Some(workflow_id),
            )
            .await?;

        Ok(WorkflowProcessScope {
            workflow_id,
            is_admin: false,
            process_ids: Some(process_ids),
        })
    }

    async fn open_snapshot(&self, user_id: UserId) -> AppResult<Box<dyn AccessSnapshot>> {
        self.repository
            .open_snapshot()
            .await
            .map_err(|error| mask_internal(user_id, error))
    }

    async fn finish_snapshot<T>(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        user_id: UserId,
        result: AppResult<T>,
    ) -> AppResult<T> {
        let value = result.map_err(|error| mask_internal(user_id, error))?;
        snapshot
            .finish()
            .await
            .map_err(|error| mask_internal(user_id, error))?;
        Ok(value)
    }
}

/// Returns whether the user or any of the user's roles is administrative.
fn grants_admin_bypass(profile: &UserProfile, memberships: &SubjectMemberships) -> bool {
    profile.is_admin
        || memberships
            .role_assignments
            .iter()
            .any(|assignment| assignment.grants_bypass())
}

fn mask_internal(user_id: UserId, error: AppError) -> AppError {
    if !error.is_internal() {
        return error;
    }

    error!(user_id = %user_id, error = %error, "access resolution failed");
    AppError::Internal("access resolution failed".to_owned())
}
