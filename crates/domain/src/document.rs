use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use docflow_core::AppError;
use serde::{Deserialize, Serialize};

use crate::{DocumentId, RoleId, UserId};

/// Read-only projection of a document node in the document forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Stable document identifier.
    pub document_id: DocumentId,
    /// Parent folder or document, `None` for roots.
    pub parent_id: Option<DocumentId>,
    /// Author of the document.
    pub created_by_id: UserId,
    /// Materialized display path.
    pub path: String,
    /// Display name.
    pub name: String,
}

impl DocumentNode {
    /// Returns the hierarchy edge of this node.
    #[must_use]
    pub fn link(&self) -> DocumentLink {
        DocumentLink {
            document_id: self.document_id,
            parent_id: self.parent_id,
        }
    }
}

/// Minimal hierarchy edge loaded in bulk for tree traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentLink {
    /// Document identifier.
    pub document_id: DocumentId,
    /// Parent identifier, `None` for roots.
    pub parent_id: Option<DocumentId>,
}

/// Breadth of a document grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// The document and its whole subtree.
    Full,
    /// Exactly one document, qualified by access types.
    Standard,
}

impl AccessLevel {
    /// Returns the storage value for this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Standard => "STANDARD",
        }
    }
}

impl FromStr for AccessLevel {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "FULL" => Ok(Self::Full),
            "STANDARD" => Ok(Self::Standard),
            _ => Err(AppError::Validation(format!(
                "unknown access level '{value}'"
            ))),
        }
    }
}

/// Operation qualifier on a standard document grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessType {
    /// View the document.
    Read,
    /// Download the document file.
    Download,
    /// Modify the document.
    Edit,
}

impl AccessType {
    /// Returns the storage value for this access type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Download => "DOWNLOAD",
            Self::Edit => "EDIT",
        }
    }
}

impl FromStr for AccessType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "READ" => Ok(Self::Read),
            "DOWNLOAD" => Ok(Self::Download),
            "EDIT" => Ok(Self::Edit),
            _ => Err(AppError::Validation(format!(
                "unknown access type '{value}'"
            ))),
        }
    }
}

/// Subject a document grant is issued to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum GrantSubject {
    /// A single user.
    User(UserId),
    /// Every member of a role.
    Role(RoleId),
}

/// Explicit document grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAccessGrant {
    /// Granted document.
    pub document_id: DocumentId,
    /// Grant holder.
    pub subject: GrantSubject,
    /// Grant breadth.
    pub access_level: AccessLevel,
    /// Operations allowed, meaningful for standard grants only.
    pub access_types: BTreeSet<AccessType>,
}

impl DocumentAccessGrant {
    /// Returns whether the grant reaches the user directly or through a role.
    #[must_use]
    pub fn applies_to(&self, user_id: UserId, role_ids: &HashSet<RoleId>) -> bool {
        match self.subject {
            GrantSubject::User(grantee) => grantee == user_id,
            GrantSubject::Role(role_id) => role_ids.contains(&role_id),
        }
    }

    /// Returns whether the grant covers the document subtree.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.access_level == AccessLevel::Full
    }

    /// Returns whether a standard grant carries at least one usable operation.
    #[must_use]
    pub fn confers_standard_access(&self) -> bool {
        self.access_level == AccessLevel::Standard
            && [AccessType::Read, AccessType::Download, AccessType::Edit]
                .iter()
                .any(|access_type| self.access_types.contains(access_type))
    }
}
