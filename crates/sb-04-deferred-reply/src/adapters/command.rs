//! # Command Launcher
//!
//! Hands requests to a platform opener program:
//!
//! ```text
//! <program> [args..] launch <target> <address> --extra key=value ...
//! <program> [args..] open <target>
//! <program> [args..] open-url <url>
//! ```
//!
//! The opener must return once the signer has the request.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Command;

use sb_01_link_codec::OutboundRequest;
use tracing::debug;

use crate::domain::errors::LaunchError;
use crate::ports::outbound::SignerLauncher;

#[derive(Debug, Clone)]
pub struct CommandLauncher {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandLauncher {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments placed before the subcommand.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Arguments for a `launch` invocation.
    #[must_use]
    pub fn launch_args(request: &OutboundRequest) -> Vec<String> {
        let mut args = vec![
            "launch".to_string(),
            request.target.clone(),
            request.address.clone(),
        ];
        for (key, value) in &request.extras {
            args.push("--extra".to_string());
            args.push(format!("{key}={value}"));
        }
        args
    }

    fn run(&self, target: &str, args: &[String]) -> Result<(), LaunchError> {
        debug!(program = %self.program.display(), subcommand = ?args.first(), "Running opener");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(args)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => LaunchError::NotInstalled {
                    target: target.to_string(),
                },
                _ => LaunchError::Failed {
                    reason: e.to_string(),
                },
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(LaunchError::Failed {
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            })
        }
    }
}

impl SignerLauncher for CommandLauncher {
    fn launch(&self, request: &OutboundRequest) -> Result<(), LaunchError> {
        self.run(&request.target, &Self::launch_args(request))
    }

    fn open_app(&self, target: &str) -> Result<(), LaunchError> {
        self.run(target, &["open".to_string(), target.to_string()])
    }

    fn open_store_listing(&self, url: &str) -> Result<(), LaunchError> {
        self.run(url, &["open-url".to_string(), url.to_string()])
    }
}
