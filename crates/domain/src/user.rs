//! User, role, and department projections.

use serde::{Deserialize, Serialize};

use crate::{DepartmentId, RoleId, UserId};

/// Read-only projection of a user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Stable user identifier.
    pub user_id: UserId,
    /// Grants the global bypass on its own.
    pub is_admin: bool,
}

/// Read-only projection of a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleProfile {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Administrative role.
    pub is_admin: bool,
    /// Root-level role.
    pub is_root_level: bool,
}

impl RoleProfile {
    /// Returns the membership record of a user holding this role.
    #[must_use]
    pub fn assignment_for(&self, user_id: UserId) -> RoleAssignment {
        RoleAssignment {
            user_id,
            role_id: self.role_id,
            role_is_admin: self.is_admin,
            role_is_root_level: self.is_root_level,
        }
    }
}

/// Role membership of one user, joined with the role flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Member user.
    pub user_id: UserId,
    /// Assigned role.
    pub role_id: RoleId,
    /// Role carries the administrative flag.
    pub role_is_admin: bool,
    /// Role carries the root-level flag.
    pub role_is_root_level: bool,
}

impl RoleAssignment {
    /// Returns whether holding this role bypasses access resolution.
    ///
    /// Either flag is enough.
    #[must_use]
    pub fn grants_bypass(&self) -> bool {
        self.role_is_admin || self.role_is_root_level
    }
}

/// Department (branch) membership of one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepartmentMembership {
    /// Member user.
    pub user_id: UserId,
    /// Department the user belongs to.
    pub department_id: DepartmentId,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(role_is_admin: bool, role_is_root_level: bool) -> RoleAssignment {
        RoleAssignment {
            user_id: UserId::new(),
            role_id: RoleId::new(),
            role_is_admin,
            role_is_root_level,
        }
    }

    #[test]
    fn role_profile_copies_flags_into_assignment() {
        let user_id = UserId::new();
        let role = RoleProfile {
            role_id: RoleId::new(),
            is_admin: false,
            is_root_level: true,
        };

        let value = role.assignment_for(user_id);

        assert_eq!(value.user_id, user_id);
        assert_eq!(value.role_id, role.role_id);
        assert!(value.grants_bypass());
    }

    #[test]
    fn either_role_flag_grants_bypass() {
        assert!(assignment(true, false).grants_bypass());
        assert!(assignment(false, true).grants_bypass());
        assert!(assignment(true, true).grants_bypass());
        assert!(!assignment(false, false).grants_bypass());
    }
}
