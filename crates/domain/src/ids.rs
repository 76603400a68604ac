//! Typed identifiers for the records the access engine reads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a user record.
    UserId
);
uuid_identifier!(
    /// Unique identifier for a role record.
    RoleId
);
uuid_identifier!(
    /// Unique identifier for a department (branch) record.
    DepartmentId
);
uuid_identifier!(
    /// Unique identifier for a document node.
    DocumentId
);
uuid_identifier!(
    /// Unique identifier for a workflow definition.
    WorkflowId
);
uuid_identifier!(
    /// Unique identifier for a workflow step definition.
    WorkflowStepId
);
uuid_identifier!(
    /// Unique identifier for a process instance.
    ProcessId
);
uuid_identifier!(
    /// Unique identifier for a process step instance.
    ProcessStepId
);

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{DocumentId, UserId};

    #[test]
    fn identifiers_format_as_uuid() {
        assert_eq!(UserId::new().to_string().len(), 36);
    }

    #[test]
    fn identifiers_serialize_transparently() {
        let value = Uuid::new_v4();
        let encoded = serde_json::to_string(&DocumentId::from_uuid(value));
        assert_eq!(
            encoded.unwrap_or_else(|_| panic!("test")),
            format!("\"{value}\"")
        );
    }
}
