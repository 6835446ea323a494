use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned identifier of a collection entry. Absent while the
/// entry is still pending confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteEntryId(String);

impl RemoteEntryId {
    pub fn new(value: String) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            return Err("Remote entry ID cannot be empty".to_string());
        }
        Ok(())
    }
}

impl fmt::Display for RemoteEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<RemoteEntryId> for String {
    fn from(value: RemoteEntryId) -> Self {
        value.0
    }
}
