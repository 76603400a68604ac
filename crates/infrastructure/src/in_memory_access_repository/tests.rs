use std::collections::BTreeSet;
use std::sync::Arc;

use docflow_application::{AccessRepository, AccessResolutionService};
use docflow_core::AppError;
use docflow_domain::{
    AccessLevel, AccessType, AssigneeType, DepartmentId, DepartmentMembership,
    DocumentAccessGrant, DocumentId, DocumentNode, GrantSubject, ProcessId, ProcessInstance,
    ProcessStepId, ProcessStepInstance, RoleId, RoleProfile, UserId, UserProfile,
    WorkflowAssignment, WorkflowId, WorkflowStep, WorkflowStepId,
};

use super::InMemoryAccessRepository;

fn document(parent_id: Option<DocumentId>, created_by_id: UserId) -> DocumentNode {
    let document_id = DocumentId::new();
    DocumentNode {
        document_id,
        parent_id,
        created_by_id,
        path: format!("/{document_id}"),
        name: document_id.to_string(),
    }
}

fn process(workflow_id: WorkflowId, initiator_id: UserId) -> ProcessInstance {
    ProcessInstance {
        process_id: ProcessId::new(),
        workflow_id,
        initiator_id,
        status: "IN_PROGRESS".to_owned(),
    }
}

async fn seeded_user(repository: &InMemoryAccessRepository) -> UserId {
    let user_id = UserId::new();
    repository
        .save_user(UserProfile {
            user_id,
            is_admin: false,
        })
        .await;
    user_id
}

async fn seeded_workflow(repository: &InMemoryAccessRepository) -> (WorkflowId, WorkflowStepId) {
    let step = WorkflowStep {
        step_id: WorkflowStepId::new(),
        workflow_id: WorkflowId::new(),
    };
    repository.save_workflow(step.workflow_id).await;
    assert!(repository.save_workflow_step(step).await.is_ok());
    (step.workflow_id, step.step_id)
}

#[tokio::test]
async fn assign_role_requires_known_user_and_role() {
    let repository = InMemoryAccessRepository::new();
    let user_id = seeded_user(&repository).await;

    let missing_role = repository.assign_role(user_id, RoleId::new()).await;
    assert!(matches!(missing_role, Err(AppError::NotFound(_))));

    let role = RoleProfile {
        role_id: RoleId::new(),
        is_admin: false,
        is_root_level: false,
    };
    repository.save_role(role).await;
    let missing_user = repository.assign_role(UserId::new(), role.role_id).await;
    assert!(matches!(missing_user, Err(AppError::NotFound(_))));

    assert!(repository.assign_role(user_id, role.role_id).await.is_ok());
}

#[tokio::test]
async fn workflow_assignment_takes_workflow_from_step() {
    let repository = InMemoryAccessRepository::new();
    let user_id = seeded_user(&repository).await;
    let (workflow_id, step_id) = seeded_workflow(&repository).await;

    let unknown_step = repository
        .add_workflow_assignment(WorkflowAssignment {
            step_id: WorkflowStepId::new(),
            workflow_id,
            assignee_type: AssigneeType::User,
            assignee_ids: vec![user_id],
            selected_roles: Vec::new(),
        })
        .await;
    assert!(matches!(unknown_step, Err(AppError::NotFound(_))));

    let added = repository
        .add_workflow_assignment(WorkflowAssignment {
            step_id,
            workflow_id: WorkflowId::new(),
            assignee_type: AssigneeType::User,
            assignee_ids: vec![user_id],
            selected_roles: Vec::new(),
        })
        .await;
    assert!(added.is_ok());

    let mut snapshot = match repository.open_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(error) => panic!("failed to open snapshot: {error}"),
    };
    let assignments = snapshot
        .list_workflow_assignments_for_subject(user_id, &[])
        .await
        .unwrap_or_default();

    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].workflow_id, workflow_id);
}

#[tokio::test]
async fn workflow_step_requires_registered_workflow() {
    let repository = InMemoryAccessRepository::new();

    let orphan = repository
        .save_workflow_step(WorkflowStep {
            step_id: WorkflowStepId::new(),
            workflow_id: WorkflowId::new(),
        })
        .await;

    assert!(matches!(orphan, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn stepless_workflow_exists_and_is_forbidden_to_regular_users() {
    let repository = Arc::new(InMemoryAccessRepository::new());
    let user_id = seeded_user(&repository).await;
    let workflow_id = WorkflowId::new();
    repository.save_workflow(workflow_id).await;
    assert!(repository.save_process(process(workflow_id, user_id)).await.is_ok());

    let service = AccessResolutionService::new(repository);
    let result = service.resolve_for_workflow(user_id, workflow_id).await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn process_and_step_require_existing_parents() {
    let repository = InMemoryAccessRepository::new();
    let user_id = seeded_user(&repository).await;

    let orphan = repository
        .save_process(process(WorkflowId::new(), user_id))
        .await;
    assert!(matches!(orphan, Err(AppError::NotFound(_))));

    let orphan_step = repository
        .add_process_step(ProcessStepInstance {
            step_instance_id: ProcessStepId::new(),
            process_id: ProcessId::new(),
            assigned_to: Some(user_id),
            role_id: None,
            department_id: None,
            status: "PENDING".to_owned(),
        })
        .await;
    assert!(matches!(orphan_step, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn open_snapshot_is_isolated_from_later_writes() {
    let repository = InMemoryAccessRepository::new();
    let user_id = seeded_user(&repository).await;
    let first = document(None, user_id);
    repository.save_document(first.clone()).await;

    let mut snapshot = match repository.open_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(error) => panic!("failed to open snapshot: {error}"),
    };

    repository.save_document(document(None, user_id)).await;
    repository
        .save_user(UserProfile {
            user_id,
            is_admin: true,
        })
        .await;

    let authored = snapshot
        .list_documents_created_by(user_id)
        .await
        .unwrap_or_default();
    assert_eq!(authored, vec![first.document_id]);

    let profile = snapshot.find_user(user_id).await.ok().flatten();
    assert!(profile.is_some_and(|profile| !profile.is_admin));
    assert!(snapshot.finish().await.is_ok());

    let mut fresh = match repository.open_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(error) => panic!("failed to open snapshot: {error}"),
    };
    let authored = fresh
        .list_documents_created_by(user_id)
        .await
        .unwrap_or_default();
    assert_eq!(authored.len(), 2);
}

#[tokio::test]
async fn resolves_full_scope_end_to_end() {
    let repository = Arc::new(InMemoryAccessRepository::new());
    let owner = seeded_user(&repository).await;
    let user_id = seeded_user(&repository).await;
    let role = RoleProfile {
        role_id: RoleId::new(),
        is_admin: false,
        is_root_level: false,
    };
    repository.save_role(role).await;
    assert!(repository.assign_role(user_id, role.role_id).await.is_ok());
    let department_id = DepartmentId::new();
    repository
        .add_department_membership(DepartmentMembership {
            user_id,
            department_id,
        })
        .await;

    let root = document(None, owner);
    let child = document(Some(root.document_id), owner);
    let standard = document(None, owner);
    let standard_child = document(Some(standard.document_id), owner);
    let unrelated = document(None, owner);
    for node in [&root, &child, &standard, &standard_child, &unrelated] {
        repository.save_document(node.clone()).await;
    }
    let granted = repository
        .grant_document_access(DocumentAccessGrant {
            document_id: root.document_id,
            subject: GrantSubject::Role(role.role_id),
            access_level: AccessLevel::Full,
            access_types: BTreeSet::new(),
        })
        .await;
    assert!(granted.is_ok());
    let granted = repository
        .grant_document_access(DocumentAccessGrant {
            document_id: standard.document_id,
            subject: GrantSubject::User(user_id),
            access_level: AccessLevel::Standard,
            access_types: BTreeSet::from([AccessType::Read]),
        })
        .await;
    assert!(granted.is_ok());

    let (assigned_workflow, assigned_step) = seeded_workflow(&repository).await;
    let (other_workflow, _) = seeded_workflow(&repository).await;
    let added = repository
        .add_workflow_assignment(WorkflowAssignment {
            step_id: assigned_step,
            workflow_id: assigned_workflow,
            assignee_type: AssigneeType::Role,
            assignee_ids: Vec::new(),
            selected_roles: vec![role.role_id.as_uuid()],
        })
        .await;
    assert!(added.is_ok());

    let in_assigned = process(assigned_workflow, owner);
    let stepped = process(other_workflow, owner);
    let hidden = process(other_workflow, owner);
    for instance in [&in_assigned, &stepped, &hidden] {
        assert!(repository.save_process(instance.clone()).await.is_ok());
    }
    let step_added = repository
        .add_process_step(ProcessStepInstance {
            step_instance_id: ProcessStepId::new(),
            process_id: stepped.process_id,
            assigned_to: None,
            role_id: None,
            department_id: Some(department_id),
            status: "PENDING".to_owned(),
        })
        .await;
    assert!(step_added.is_ok());

    let service = AccessResolutionService::new(repository);
    let scope = service
        .resolve(user_id)
        .await
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));

    assert!(!scope.is_admin());
    for visible in [root.document_id, child.document_id, standard.document_id] {
        assert!(scope.allows_document(visible));
    }
    assert!(!scope.allows_document(standard_child.document_id));
    assert!(!scope.allows_document(unrelated.document_id));
    assert!(scope.allows_workflow(assigned_workflow));
    assert!(!scope.allows_workflow(other_workflow));
    assert!(scope.allows_process(in_assigned.process_id));
    assert!(scope.allows_process(stepped.process_id));
    assert!(!scope.allows_process(hidden.process_id));

    let scoped = service
        .resolve_for_workflow(user_id, assigned_workflow)
        .await
        .unwrap_or_else(|error| panic!("unexpected error: {error}"));
    assert_eq!(
        scoped.process_ids,
        Some(std::collections::HashSet::from([in_assigned.process_id]))
    );
}
