use super::*;

impl PostgresAccessSnapshot {
    pub(super) async fn list_document_grants_impl(
        &mut self,
        user_id: UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<DocumentAccessGrant>> {
        let rows = sqlx::query_as::<_, DocumentGrantRow>(
            r#"
            SELECT document_id, user_id, role_id, access_level, access_types
            FROM document_access
            WHERE user_id = $1
                OR role_id = ANY($2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role_uuids(role_ids))
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load document grants: {error}")))?;

        rows.into_iter().map(DocumentAccessGrant::try_from).collect()
    }

    pub(super) async fn list_document_links_impl(&mut self) -> AppResult<Vec<DocumentLink>> {
        let rows = sqlx::query_as::<_, DocumentLinkRow>(
            r#"
            SELECT id, parent_id
            FROM documents
            "#,
        )
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load document hierarchy: {error}"))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| DocumentLink {
                document_id: DocumentId::from_uuid(row.id),
                parent_id: row.parent_id.map(DocumentId::from_uuid),
            })
            .collect())
    }

    pub(super) async fn list_documents_created_by_impl(
        &mut self,
        user_id: UserId,
    ) -> AppResult<Vec<DocumentId>> {
        let document_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM documents
            WHERE created_by_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load authored documents: {error}"))
        })?;

        Ok(document_ids.into_iter().map(DocumentId::from_uuid).collect())
    }
}
