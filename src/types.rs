use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl Deref for $name {
            type Target = String;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }
    };
}

string_id! {
    /// Opaque identifier the remote assigns to an asset model
    ModelId
}

string_id! {
    /// Opaque identifier the remote assigns to an asset
    AssetId
}

string_id! {
    /// Opaque identifier the remote assigns to each model property
    PropertyId
}

string_id! {
    /// Key used to authenticate with the remote
    ApiKey
}

string_id! {
    /// Idempotency identifier for a single batch-write entry
    EntryId
}

impl Default for EntryId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

/// Lifecycle state the remote reports for models and assets.
///
/// Deletion has no terminal variant here: a deleted resource stops being
/// returned by describe calls instead of reporting a final status.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    Pending,
    Active,
    Deleting,
    Failed,
}

impl Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceStatus::Pending => "PENDING",
            ResourceStatus::Active => "ACTIVE",
            ResourceStatus::Deleting => "DELETING",
            ResourceStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_ids_are_random() {
        let a = EntryId::default();
        let b = EntryId::default();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn status_uses_screaming_case_on_the_wire() {
        let status: ResourceStatus = serde_json::from_str(r#""ACTIVE""#).unwrap();
        assert_eq!(status, ResourceStatus::Active);
        assert_eq!(
            serde_json::to_string(&ResourceStatus::Deleting).unwrap(),
            r#""DELETING""#
        );
    }
}
