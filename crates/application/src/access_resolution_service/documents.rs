use docflow_domain::{DocumentForest, DocumentId};

use super::*;

impl AccessResolutionService {
    /// Resolves every document reachable through grants or authorship.
    ///
    /// Only walks starting at granted documents can hit a hierarchy cycle.
    /// Authored documents are added without walking the tree.
    pub(super) async fn resolve_document_ids(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        memberships: &SubjectMemberships,
    ) -> AppResult<HashSet<DocumentId>> {
        let user_id = memberships.user_id;
        let grants: Vec<_> = snapshot
            .list_document_grants(user_id, &memberships.sorted_role_ids())
            .await?
            .into_iter()
            .filter(|grant| grant.applies_to(user_id, &memberships.role_ids))
            .collect();

        let mut document_ids = HashSet::new();

        if !grants.is_empty() {
            let forest = DocumentForest::from_links(snapshot.list_document_links().await?);
            let full_roots: HashSet<DocumentId> = grants
                .iter()
                .filter(|grant| grant.is_full())
                .map(|grant| grant.document_id)
                .collect();

            for root in &full_roots {
                // Already reached from an ancestor's subtree.
                if document_ids.contains(root) {
                    continue;
                }
                document_ids.extend(forest.subtree(*root, self.limits)?);
            }

            let mut subsumed_standard_grants = 0_usize;
            for grant in grants
                .iter()
                .filter(|grant| grant.confers_standard_access())
            {
                document_ids.insert(grant.document_id);

                let ancestors = forest.ancestors(grant.document_id, self.limits)?;
                if ancestors.iter().any(|ancestor| full_roots.contains(ancestor)) {
                    subsumed_standard_grants += 1;
                }
            }

            debug!(
                user_id = %user_id,
                grant_count = grants.len(),
                full_grant_count = full_roots.len(),
                subsumed_standard_grants,
                indexed_documents = forest.len(),
                "document grants expanded"
            );
        }

        document_ids.extend(snapshot.list_documents_created_by(user_id).await?);

        Ok(document_ids)
    }
}
