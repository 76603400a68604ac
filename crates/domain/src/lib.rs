//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod access;
mod document;
mod document_forest;
mod ids;
mod process;
mod user;
mod workflow;

pub use access::{AccessScope, SubjectMemberships, WorkflowProcessScope};
pub use document::{
    AccessLevel, AccessType, DocumentAccessGrant, DocumentLink, DocumentNode, GrantSubject,
};
pub use document_forest::{DEFAULT_MAX_TREE_DEPTH, DocumentForest, TraversalLimits};
pub use ids::{
    DepartmentId, DocumentId, ProcessId, ProcessStepId, RoleId, UserId, WorkflowId,
    WorkflowStepId,
};
pub use process::{ProcessInstance, ProcessStepInstance};
pub use user::{DepartmentMembership, RoleAssignment, RoleProfile, UserProfile};
pub use workflow::{AssigneeType, WorkflowAssignment, WorkflowStep};
