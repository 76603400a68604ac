//! In-memory index over the document hierarchy.
//!
//! The forest is built from a single bulk load of `(id, parent_id)` edges so
//! that subtree and ancestor walks never go back to the store. Both walks
//! treat a revisited node as a corrupted (cyclic) hierarchy and fail instead
//! of looping.

use std::collections::{HashMap, HashSet, VecDeque};

use docflow_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::{DocumentId, DocumentLink};

/// Default bound on the number of levels a single walk may cross.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 1024;

/// Bounds applied to every hierarchy walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalLimits {
    /// Maximum number of levels below (or above) the starting node.
    pub max_depth: usize,
}

impl TraversalLimits {
    /// Creates limits with the provided depth bound.
    pub fn new(max_depth: usize) -> AppResult<Self> {
        if max_depth == 0 {
            return Err(AppError::Validation(
                "maximum tree depth must be greater than zero".to_owned(),
            ));
        }

        Ok(Self { max_depth })
    }
}

impl Default for TraversalLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }
}

/// Parent and children indices over every known document.
///
/// Building the index never fails. Cycles are detected lazily, only when a
/// `subtree` or `ancestors` walk reaches one, so a cycle among documents no
/// walk starts from or passes through goes unnoticed.
#[derive(Debug, Clone, Default)]
pub struct DocumentForest {
    parents: HashMap<DocumentId, DocumentId>,
    children: HashMap<DocumentId, Vec<DocumentId>>,
    node_count: usize,
}

impl DocumentForest {
    /// Builds the indices from bulk-loaded hierarchy edges.
    ///
    /// Repeated edges for the same document keep the first parent seen.
    #[must_use]
    pub fn from_links(links: impl IntoIterator<Item = DocumentLink>) -> Self {
        let mut seen = HashSet::new();
        let mut parents = HashMap::new();
        let mut children: HashMap<DocumentId, Vec<DocumentId>> = HashMap::new();

        for link in links {
            if !seen.insert(link.document_id) {
                continue;
            }

            if let Some(parent_id) = link.parent_id {
                parents.insert(link.document_id, parent_id);
                children.entry(parent_id).or_default().push(link.document_id);
            }
        }

        Self {
            parents,
            children,
            node_count: seen.len(),
        }
    }

    /// Returns the number of indexed documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node_count
    }

    /// Returns whether no document was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Returns the parent of a document, if any.
    #[must_use]
    pub fn parent(&self, document_id: DocumentId) -> Option<DocumentId> {
        self.parents.get(&document_id).copied()
    }

    /// Returns the direct children of a document.
    #[must_use]
    pub fn children(&self, document_id: DocumentId) -> &[DocumentId] {
        self.children
            .get(&document_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the root and every transitive descendant, breadth first.
    pub fn subtree(
        &self,
        root: DocumentId,
        limits: TraversalLimits,
    ) -> AppResult<Vec<DocumentId>> {
        let mut visited = HashSet::from([root]);
        let mut ordered = vec![root];
        let mut queue = VecDeque::from([(root, 0_usize)]);

        while let Some((document_id, depth)) = queue.pop_front() {
            let children = self.children(document_id);
            if children.is_empty() {
                continue;
            }

            let child_depth = depth + 1;
            if child_depth > limits.max_depth {
                return Err(AppError::Internal(format!(
                    "document hierarchy below '{root}' exceeds the maximum depth of {}",
                    limits.max_depth
                )));
            }

            for child_id in children {
                if !visited.insert(*child_id) {
                    return Err(AppError::Internal(format!(
                        "document hierarchy contains a cycle through '{child_id}'"
                    )));
                }

                ordered.push(*child_id);
                queue.push_back((*child_id, child_depth));
            }
        }

        Ok(ordered)
    }

    /// Returns the ancestor chain of a document, nearest parent first.
    pub fn ancestors(
        &self,
        document_id: DocumentId,
        limits: TraversalLimits,
    ) -> AppResult<Vec<DocumentId>> {
        let mut visited = HashSet::from([document_id]);
        let mut chain = Vec::new();
        let mut current = document_id;

        while let Some(parent_id) = self.parent(current) {
            if !visited.insert(parent_id) {
                return Err(AppError::Internal(format!(
                    "document hierarchy contains a cycle through '{parent_id}'"
                )));
            }

            chain.push(parent_id);
            if chain.len() > limits.max_depth {
                return Err(AppError::Internal(format!(
                    "ancestor chain of '{document_id}' exceeds the maximum depth of {}",
                    limits.max_depth
                )));
            }

            current = parent_id;
        }

        Ok(chain)
    }
}
