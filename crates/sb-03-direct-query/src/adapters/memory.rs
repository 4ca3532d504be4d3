use std::collections::HashMap;

use parking_lot::Mutex;

use crate::domain::errors::EndpointError;
use crate::domain::projection::Projection;
use crate::domain::row::QueryRow;
use crate::ports::outbound::QueryEndpoint;

type Answer = Result<Option<QueryRow>, EndpointError>;

/// Scripted endpoint for tests. Unknown endpoints are `NotInstalled`.
#[derive(Debug, Default)]
pub struct InMemoryQueryEndpoint {
    answers: Mutex<HashMap<String, Answer>>,
    calls: Mutex<Vec<(String, Projection)>>,
}

impl InMemoryQueryEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `endpoint` with `row`.
    pub fn answer_row(&self, endpoint: impl Into<String>, row: QueryRow) {
        self.answers.lock().insert(endpoint.into(), Ok(Some(row)));
    }

    /// Answer `endpoint` with no row.
    pub fn answer_empty(&self, endpoint: impl Into<String>) {
        self.answers.lock().insert(endpoint.into(), Ok(None));
    }

    /// Fail `endpoint` with `error`.
    pub fn answer_error(&self, endpoint: impl Into<String>, error: EndpointError) {
        self.answers.lock().insert(endpoint.into(), Err(error));
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<(String, Projection)> {
        self.calls.lock().clone()
    }
}

impl QueryEndpoint for InMemoryQueryEndpoint {
    fn query(&self, endpoint: &str, projection: &Projection) -> Answer {
        self.calls
            .lock()
            .push((endpoint.to_string(), projection.clone()));
        self.answers
            .lock()
            .get(endpoint)
            .cloned()
            .unwrap_or_else(|| {
                Err(EndpointError::NotInstalled {
                    endpoint: endpoint.to_string(),
                })
            })
    }
}
