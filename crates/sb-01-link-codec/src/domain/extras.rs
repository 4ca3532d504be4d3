//! # Result-Extras Replies
//!
//! Besides inbound links, a signer launched for a result can answer directly
//! with a result code and a bag of string extras. Unlike links, the payload
//! field is chosen per operation kind: a signed event is preferred for
//! `SignEvent`, the generic result for everything else.

use std::collections::BTreeMap;

use shared_types::{DelegatedResponse, OperationKind};

use super::reply::params;

/// A result-code + extras answer from the signer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultExtras {
    /// Whether the signer finished with a success result code.
    pub ok: bool,
    /// String extras returned with the result.
    pub fields: BTreeMap<String, String>,
}

impl ResultExtras {
    /// A successful result carrying `fields`.
    #[must_use]
    pub fn ok<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            ok: true,
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The signer was dismissed or returned a failure code.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::default()
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Classify for a request of `kind`.
    ///
    /// `rejected > error > payload > none`; a failure code is `Cancelled`.
    #[must_use]
    pub fn classify(&self, kind: OperationKind) -> DelegatedResponse {
        if !self.ok {
            return DelegatedResponse::Cancelled;
        }
        if self.field(params::REJECTED).is_some() {
            return DelegatedResponse::Rejected;
        }
        if let Some(error) = self.field(params::ERROR) {
            return DelegatedResponse::Failed(error.to_string());
        }

        let result = self
            .field(params::RESULT)
            .or_else(|| self.field(params::SIGNATURE));
        let payload = match kind {
            OperationKind::SignEvent => self.field(params::EVENT).or(result),
            _ => result,
        };

        match payload {
            Some(payload) => DelegatedResponse::Success(payload.to_string()),
            None => DelegatedResponse::Failed(DelegatedResponse::NO_VALID_RESPONSE.to_string()),
        }
    }
}
