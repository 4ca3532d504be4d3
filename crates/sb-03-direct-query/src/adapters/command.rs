//! # Command Query Endpoint
//!
//! Talks to a signer through a helper program:
//!
//! ```text
//! <program> [args..] query <endpoint> <payload> <pubkey> <caller>
//! ```
//!
//! The program prints one JSON object (the row) on stdout. Empty output or
//! `null` means no row. A non-zero exit status is an unavailable endpoint.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::domain::errors::EndpointError;
use crate::domain::projection::Projection;
use crate::domain::row::QueryRow;
use crate::ports::outbound::QueryEndpoint;

#[derive(Debug, Clone)]
pub struct CommandQueryEndpoint {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandQueryEndpoint {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the `query` subcommand.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn parse_stdout(stdout: &[u8]) -> Result<Option<QueryRow>, EndpointError> {
        let text = String::from_utf8_lossy(stdout);
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| EndpointError::MalformedRow {
                reason: e.to_string(),
            })?;
        if value.is_null() {
            return Ok(None);
        }
        QueryRow::from_json(&value)
            .map(Some)
            .ok_or_else(|| EndpointError::MalformedRow {
                reason: "expected a JSON object".to_string(),
            })
    }
}

impl QueryEndpoint for CommandQueryEndpoint {
    fn query(&self, endpoint: &str, projection: &Projection) -> Result<Option<QueryRow>, EndpointError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg("query")
            .arg(endpoint)
            .args(projection.as_array())
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => EndpointError::NotInstalled {
                    endpoint: endpoint.to_string(),
                },
                _ => EndpointError::Unavailable {
                    reason: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(EndpointError::Unavailable {
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        debug!(endpoint, bytes = output.stdout.len(), "Query endpoint answered");
        Self::parse_stdout(&output.stdout)
    }
}
