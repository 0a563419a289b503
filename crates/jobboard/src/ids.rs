//! String identifiers for stored records.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Time-ordered identifier for a freshly created record.
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

record_id!(
    /// Identifier of a registered applicant or company account.
    UserId
);
record_id!(
    /// Identifier of a job posting.
    JobId
);
record_id!(
    /// Identifier of a submitted application.
    ApplicationId
);
