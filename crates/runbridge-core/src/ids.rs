//! Newtype wrappers for identifiers to ensure type safety.
//!
//! The runner assigns every identifier; the core only compares and forwards
//! them, so they stay opaque strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a new ", stringify!($name), " from a string.")]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the inner string reference.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifier of a test (runnable) in the run tree, e.g. `r3`.
    TestId
);

string_id!(
    /// Identifier of a command log, used for console output and snapshots.
    CommandId
);

string_id!(
    /// Identifier of a log entry. Stable across `reporter:log:state:changed`.
    LogId
);
