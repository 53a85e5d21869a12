use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ShellError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalMethod {
    ListAll,
    GetById,
    Create,
    Update,
    Delete,
}

impl CanonicalMethod {
    pub const ALL: [CanonicalMethod; 5] =
        [Self::ListAll, Self::GetById, Self::Create, Self::Update, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListAll => "list_all",
            Self::GetById => "get_by_id",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Positional arguments the remote call needs, in order.
    pub fn required_positionals(&self) -> &'static [&'static str] {
        match self {
            Self::ListAll | Self::Create => &[],
            Self::GetById | Self::Update | Self::Delete => &["activity id"],
        }
    }

    pub fn consumes_draft(&self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for CanonicalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CanonicalMethod {
    type Err = ShellError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == normalized)
            .ok_or(ShellError::UnknownIntent { name: normalized })
    }
}

/// Positional tokens in parse order plus keyword parameters (last write wins).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamBag {
    pub positional: Vec<String>,
    pub keywords: HashMap<String, String>,
}

impl ParamBag {
    pub fn push_positional(&mut self, token: impl Into<String>) {
        self.positional.push(token.into());
    }

    pub fn insert_keyword(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.keywords.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedIntent {
    pub method: CanonicalMethod,
    pub params: ParamBag,
}
