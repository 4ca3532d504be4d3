//! # Query Rows
//!
//! A direct query returns at most one row of named string columns. Which
//! column carries the payload depends on the operation kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared_types::{DelegatedResponse, OperationKind};

/// Column names a signer may return.
pub mod columns {
    pub const RESULT: &str = "result";
    pub const SIGNATURE: &str = "signature";
    pub const EVENT: &str = "event";
    pub const REJECTED: &str = "rejected";
}

/// Projection payload for `GetPublicKey`, which has no body of its own.
pub const LOGIN_PAYLOAD: &str = "login";

/// One result row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRow {
    columns: BTreeMap<String, String>,
}

impl QueryRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Build from a JSON object. Scalars are stringified, `null` is skipped.
    ///
    /// Returns `None` for anything that is not an object.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let columns = object
            .iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    serde_json::Value::Null => return None,
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((name.clone(), text))
            })
            .collect();
        Some(Self { columns })
    }

    /// Classify this row for a request of `kind`.
    ///
    /// A `rejected` column wins regardless of its value.
    #[must_use]
    pub fn classify(&self, kind: OperationKind) -> DelegatedResponse {
        if self.has_column(columns::REJECTED) {
            return DelegatedResponse::Rejected;
        }

        let payload = match kind {
            OperationKind::SignEvent => self
                .column(columns::EVENT)
                .or_else(|| self.column(columns::SIGNATURE))
                .or_else(|| self.column(columns::RESULT)),
            _ => self
                .column(columns::RESULT)
                .or_else(|| self.column(columns::SIGNATURE)),
        };

        match payload {
            Some(payload) => DelegatedResponse::Success(payload.to_string()),
            None => DelegatedResponse::Failed(DelegatedResponse::NO_VALID_RESPONSE.to_string()),
        }
    }
}

/// Classify the outcome of a query call, row or not.
#[must_use]
pub fn classify_outcome<E>(kind: OperationKind, outcome: Result<Option<QueryRow>, E>) -> DelegatedResponse {
    match outcome {
        Ok(Some(row)) => row.classify(kind),
        Ok(None) | Err(_) => DelegatedResponse::Failed(DelegatedResponse::NO_RESPONSE.to_string()),
    }
}
