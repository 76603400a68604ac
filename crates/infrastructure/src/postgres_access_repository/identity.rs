use super::*;

impl PostgresAccessSnapshot {
    pub(super) async fn find_user_impl(&mut self, user_id: UserId) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, is_admin
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(self.connection()?)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user: {error}")))?;

        Ok(row.map(|row| UserProfile {
            user_id: UserId::from_uuid(row.id),
            is_admin: row.is_admin,
        }))
    }

    pub(super) async fn list_role_assignments_impl(
        &mut self,
        user_id: UserId,
    ) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT
                roles.id AS role_id,
                roles.is_admin,
                roles.is_root_level
            FROM user_roles
            INNER JOIN roles
                ON roles.id = user_roles.role_id
            WHERE user_roles.user_id = $1
            ORDER BY roles.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role assignments: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| RoleAssignment {
                user_id,
                role_id: RoleId::from_uuid(row.role_id),
                role_is_admin: row.is_admin,
                role_is_root_level: row.is_root_level,
            })
            .collect())
    }

    pub(super) async fn list_department_memberships_impl(
        &mut self,
        user_id: UserId,
    ) -> AppResult<Vec<DepartmentMembership>> {
        let department_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT department_id
            FROM user_departments
            WHERE user_id = $1
            ORDER BY department_id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(self.connection()?)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load department memberships: {error}"))
        })?;

        Ok(department_ids
            .into_iter()
            .map(|department_id| DepartmentMembership {
                user_id,
                department_id: DepartmentId::from_uuid(department_id),
            })
            .collect())
    }
}
