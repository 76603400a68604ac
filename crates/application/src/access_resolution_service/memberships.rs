use docflow_domain::DepartmentMembership;

use super::*;

impl AccessResolutionService {
    /// Loads the user record and the user's role and department memberships.
    pub(super) async fn load_memberships(
        &self,
        snapshot: &mut dyn AccessSnapshot,
        user_id: UserId,
    ) -> AppResult<(UserProfile, SubjectMemberships)> {
        let profile = snapshot
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        let role_assignments = snapshot.list_role_assignments(user_id).await?;
        let department_ids = snapshot
            .list_department_memberships(user_id)
            .await?
            .into_iter()
            .map(|membership: DepartmentMembership| membership.department_id);

        Ok((
            profile,
            SubjectMemberships::new(user_id, role_assignments, department_ids),
        ))
    }
}
