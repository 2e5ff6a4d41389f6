use serde::{Deserialize, Serialize};

use crate::error::{FetchError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub full_name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        let full_name = format!("{}/{}", owner, name);
        Self {
            owner,
            name,
            full_name,
        }
    }

    pub fn from_full_name(full_name: &str) -> Result<Self> {
        let parts: Vec<&str> = full_name.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(FetchError::InvalidRepository(format!(
                "Expected 'owner/name', got: {}",
                full_name
            )));
        }
        Ok(Self::new(parts[0], parts[1]))
    }
}

/// A discussion thread as returned by the GraphQL API. `answer` is the
/// accepted answer and is null for unanswered threads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub title: String,
    pub body_text: String,
    pub answer: Option<Answer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub body_text: String,
}
