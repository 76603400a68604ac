use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use docflow_application::{AccessRepository, AccessSnapshot};
use docflow_core::{AppError, AppResult};
use docflow_domain::{
    DepartmentId, DepartmentMembership, DocumentAccessGrant, DocumentId, DocumentLink,
    DocumentNode, ProcessId, ProcessInstance, ProcessStepInstance, RoleAssignment, RoleId,
    RoleProfile, UserId, UserProfile, WorkflowAssignment, WorkflowId, WorkflowStep,
    WorkflowStepId,
};
use tokio::sync::RwLock;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Default)]
struct AccessDataset {
    users: HashMap<UserId, UserProfile>,
    roles: HashMap<RoleId, RoleProfile>,
    user_roles: HashSet<(UserId, RoleId)>,
    departments: HashSet<DepartmentMembership>,
    documents: HashMap<DocumentId, DocumentNode>,
    grants: Vec<DocumentAccessGrant>,
    workflows: HashSet<WorkflowId>,
    steps: HashMap<WorkflowStepId, WorkflowStep>,
    assignments: Vec<WorkflowAssignment>,
    processes: HashMap<ProcessId, ProcessInstance>,
    process_steps: Vec<ProcessStepInstance>,
}

/// In-memory access repository implementation.
///
/// Writers replace the dataset copy-on-write, so an open snapshot keeps
/// observing the data as it was when the snapshot was taken.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    dataset: RwLock<Arc<AccessDataset>>,
}

impl InMemoryAccessRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dataset: RwLock::new(Arc::new(AccessDataset::default())),
        }
    }

    /// Inserts or replaces a user.
    pub async fn save_user(&self, user: UserProfile) {
        let mut dataset = self.dataset.write().await;
        Arc::make_mut(&mut dataset).users.insert(user.user_id, user);
    }

    /// Inserts or replaces a role.
    pub async fn save_role(&self, role: RoleProfile) {
        let mut dataset = self.dataset.write().await;
        Arc::make_mut(&mut dataset).roles.insert(role.role_id, role);
    }

    /// Adds a user to a role.
    pub async fn assign_role(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut dataset = self.dataset.write().await;
        if !dataset.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }
        if !dataset.roles.contains_key(&role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        Arc::make_mut(&mut dataset)
            .user_roles
            .insert((user_id, role_id));
        Ok(())
    }

    /// Adds a user to a department.
    pub async fn add_department_membership(&self, membership: DepartmentMembership) {
        let mut dataset = self.dataset.write().await;
        Arc::make_mut(&mut dataset).departments.insert(membership);
    }

    /// Inserts or replaces a document node.
    pub async fn save_document(&self, document: DocumentNode) {
        let mut dataset = self.dataset.write().await;
        Arc::make_mut(&mut dataset)
            .documents
            .insert(document.document_id, document);
    }

    /// Adds a document grant.
    pub async fn grant_document_access(&self, grant: DocumentAccessGrant) -> AppResult<()> {
        let mut dataset = self.dataset.write().await;
        if !dataset.documents.contains_key(&grant.document_id) {
            return Err(AppError::NotFound(format!(
                "document '{}' does not exist",
                grant.document_id
            )));
        }

        Arc::make_mut(&mut dataset).grants.push(grant);
        Ok(())
    }

    /// Registers a workflow. Workflows may exist without steps.
    pub async fn save_workflow(&self, workflow_id: WorkflowId) {
        let mut dataset = self.dataset.write().await;
        Arc::make_mut(&mut dataset).workflows.insert(workflow_id);
    }

    /// Inserts or replaces a step of an existing workflow.
    pub async fn save_workflow_step(&self, step: WorkflowStep) -> AppResult<()> {
        let mut dataset = self.dataset.write().await;
        if !dataset.workflows.contains(&step.workflow_id) {
            return Err(AppError::NotFound(format!(
                "workflow '{}' does not exist",
                step.workflow_id
            )));
        }

        Arc::make_mut(&mut dataset).steps.insert(step.step_id, step);
        Ok(())
    }

    /// Attaches an assignment to an existing step.
    ///
    /// The stored workflow is taken from the step, not from the input.
    pub async fn add_workflow_assignment(&self, assignment: WorkflowAssignment) -> AppResult<()> {
        let mut dataset = self.dataset.write().await;
        let Some(step) = dataset.steps.get(&assignment.step_id).copied() else {
            return Err(AppError::NotFound(format!(
                "workflow step '{}' does not exist",
                assignment.step_id
            )));
        };

        Arc::make_mut(&mut dataset)
            .assignments
            .push(WorkflowAssignment {
                workflow_id: step.workflow_id,
                ..assignment
            });
        Ok(())
    }

    /// Inserts or replaces a process instance.
    pub async fn save_process(&self, process: ProcessInstance) -> AppResult<()> {
        let mut dataset = self.dataset.write().await;
        if !dataset.workflows.contains(&process.workflow_id) {
            return Err(AppError::NotFound(format!(
                "workflow '{}' does not exist",
                process.workflow_id
            )));
        }

        Arc::make_mut(&mut dataset)
            .processes
            .insert(process.process_id, process);
        Ok(())
    }

    /// Adds a step instance to an existing process.
    pub async fn add_process_step(&self, step: ProcessStepInstance) -> AppResult<()> {
        let mut dataset = self.dataset.write().await;
        if !dataset.processes.contains_key(&step.process_id) {
            return Err(AppError::NotFound(format!(
                "process '{}' does not exist",
                step.process_id
            )));
        }

        Arc::make_mut(&mut dataset).process_steps.push(step);
        Ok(())
    }
}

#[async_trait]
impl AccessRepository for InMemoryAccessRepository {
    async fn open_snapshot(&self) -> AppResult<Box<dyn AccessSnapshot>> {
        Ok(Box::new(InMemoryAccessSnapshot {
            dataset: self.dataset.read().await.clone(),
        }))
    }
}

/// Immutable view over the dataset captured when the snapshot was opened.
#[derive(Debug)]
pub struct InMemoryAccessSnapshot {
    dataset: Arc<AccessDataset>,
}

impl InMemoryAccessSnapshot {
    fn processes_matching(
        &self,
        workflow_id: Option<WorkflowId>,
        predicate: impl Fn(&ProcessInstance) -> bool,
    ) -> Vec<ProcessInstance> {
        let mut values: Vec<ProcessInstance> = self
            .dataset
            .processes
            .values()
            .filter(|process| {
                workflow_id.is_none_or(|workflow_id| process.workflow_id == workflow_id)
            })
            .filter(|process| predicate(process))
            .cloned()
            .collect();
        values.sort_by_key(|process| process.process_id);
        values
    }
}

#[async_trait]
impl AccessSnapshot for InMemoryAccessSnapshot {
    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        Ok(self.dataset.users.get(&user_id).cloned())
    }

    async fn list_role_assignments(&mut self, user_id: UserId) -> AppResult<Vec<RoleAssignment>> {
        let mut values: Vec<RoleAssignment> = self
            .dataset
            .user_roles
            .iter()
            .filter(|(member, _)| *member == user_id)
            .filter_map(|(_, role_id)| self.dataset.roles.get(role_id))
            .map(|role| role.assignment_for(user_id))
            .collect();
        values.sort_by_key(|assignment| assignment.role_id);
        Ok(values)
    }

    async fn list_department_memberships(
        &mut self,
        user_id: UserId,
    ) -> AppResult<Vec<DepartmentMembership>> {
        Ok(self
            .dataset
            .departments
            .iter()
            .filter(|membership| membership.user_id == user_id)
            .copied()
            .collect())
    }

    async fn list_document_grants(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<DocumentAccessGrant>> {
        let role_ids: HashSet<RoleId> = role_ids.iter().copied().collect();

        Ok(self
            .dataset
            .grants
            .iter()
            .filter(|grant| grant.applies_to(user_id, &role_ids))
            .cloned()
            .collect())
    }

    async fn list_document_links(&mut self) -> AppResult<Vec<DocumentLink>> {
        Ok(self
            .dataset
            .documents
            .values()
            .map(DocumentNode::link)
            .collect())
    }

    async fn list_documents_created_by(&mut self, user_id: UserId) -> AppResult<Vec<DocumentId>> {
        Ok(self
            .dataset
            .documents
            .values()
            .filter(|document| document.created_by_id == user_id)
            .map(|document| document.document_id)
            .collect())
    }

    async fn list_workflow_assignments_for_subject(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<WorkflowAssignment>> {
        let role_ids: HashSet<RoleId> = role_ids.iter().copied().collect();

        Ok(self
            .dataset
            .assignments
            .iter()
            .filter(|assignment| assignment.matches_subject(user_id, &role_ids))
            .cloned()
            .collect())
    }

    async fn workflow_exists(&mut self, workflow_id: WorkflowId) -> AppResult<bool> {
        Ok(self.dataset.workflows.contains(&workflow_id))
    }

    async fn list_processes_initiated_by(
        &mut self,
        user_id: UserId,
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>> {
        Ok(self.processes_matching(workflow_id, |process| process.initiator_id == user_id))
    }

    async fn list_processes_with_assigned_steps(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
        department_ids: &[DepartmentId],
        workflow_id: Option<WorkflowId>,
    ) -> AppResult<Vec<ProcessInstance>> {
        let role_ids: HashSet<RoleId> = role_ids.iter().copied().collect();
        let department_ids: HashSet<DepartmentId> = department_ids.iter().copied().collect();
        let process_ids: HashSet<ProcessId> = self
            .dataset
            .process_steps
            .iter()
            .filter(|step| step.is_assigned_to(user_id, &role_ids, &department_ids))
            .map(|step| step.process_id)
            .collect();

        Ok(self.processes_matching(workflow_id, |process| {
            process_ids.contains(&process.process_id)
        }))
    }

    async fn list_processes_for_workflows(
        &mut self,
        workflow_ids: &[WorkflowId],
    ) -> AppResult<Vec<ProcessInstance>> {
        let workflow_ids: HashSet<WorkflowId> = workflow_ids.iter().copied().collect();

        Ok(self.processes_matching(None, |process| {
            workflow_ids.contains(&process.workflow_id)
        }))
    }

    async fn finish(&mut self) -> AppResult<()> {
        Ok(())
    }
}
