use serde::{Deserialize, Serialize};
use std::fmt;

/// Ownership-unique identifier assigned the moment an entry is inserted
/// optimistically, before the server has confirmed anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalEntryId(String);

impl LocalEntryId {
    pub fn new(value: String) -> Result<Self, String> {
        if value.is_empty() {
            return Err("LocalEntryId cannot be empty".to_string());
        }
        uuid::Uuid::parse_str(&value)
            .map_err(|err| format!("Invalid LocalEntryId format: {err}"))?;
        Ok(Self(value))
    }

    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<LocalEntryId> for String {
    fn from(value: LocalEntryId) -> Self {
        value.0
    }
}
