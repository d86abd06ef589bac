//! Application selection
//!
//! An application is picked either by its configured name or by its position
//! in the workspace's `[[apps]]` list.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Selects one application of the workspace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum AppSelector {
    /// Application with this `name`
    Name(String),
    /// Application at this position
    Index(usize),
}

impl AppSelector {
    /// Parse a selector: all-digit strings are indices, anything else a name
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = raw.parse() {
                return Self::Index(index);
            }
        }
        Self::Name(raw.to_string())
    }
}

impl FromStr for AppSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for AppSelector {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<AppSelector> for String {
    fn from(selector: AppSelector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for AppSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}
