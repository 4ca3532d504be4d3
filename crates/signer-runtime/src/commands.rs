//! # Commands
//!
//! Each subcommand maps onto one bridge entry point and yields a JSON report.

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use sb_01_link_codec::ResultExtras;
use sb_04_deferred_reply::OpenOutcome;
use sb_05_correlator::{Dispatch, InboundLink, ResolveOutcome, SignerBridgeApi};
use serde_json::{json, Value};
use shared_bus::Subscription;
use shared_types::{DelegatedRequest, DelegatedResponse, Transport};
use tracing::info;

use crate::runtime::RuntimeBridge;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Ask the signer to perform an operation
    Request {
        #[command(subcommand)]
        operation: Operation,

        /// Transport used to reach the signer
        #[arg(short, long, value_enum, default_value_t = TransportArg::Deferred)]
        transport: TransportArg,
    },

    /// Route an inbound reply address
    HandleLink {
        address: String,

        /// Keep the address for a later `resume` instead of routing it now
        #[arg(long)]
        stash: bool,
    },

    /// Route a result-code reply
    HandleResult {
        /// Extras returned with the result, as key=value
        #[arg(short, long = "extra", value_parser = parse_extra)]
        extras: Vec<(String, String)>,

        /// The signer returned a failure code
        #[arg(long)]
        cancelled: bool,
    },

    /// Route a previously stashed inbound address
    Resume,

    /// Show the outstanding deferred request
    Status,

    /// Drop the outstanding deferred request
    Abandon,

    /// Open the signer app, or its store listing when it is missing
    Launch,

    /// Open the signer's store listing
    Store,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Operation {
    /// Request the user's public key
    GetPublicKey {
        /// Permission list (JSON) to request along with the key
        #[arg(long)]
        permissions: Option<String>,
    },

    /// Sign an unsigned event
    SignEvent {
        /// Event JSON
        event: String,
    },

    /// NIP-44 encrypt plaintext for a peer
    Encrypt { plaintext: String, pubkey: String },

    /// NIP-44 decrypt ciphertext from a peer
    Decrypt { ciphertext: String, pubkey: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportArg {
    Direct,
    Deferred,
}

impl From<TransportArg> for Transport {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::Direct => Transport::Direct,
            TransportArg::Deferred => Transport::Deferred,
        }
    }
}

fn parse_extra(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

/// Run `command` against `bridge`.
pub async fn execute(bridge: &RuntimeBridge, command: Command) -> Result<Value> {
    match command {
        Command::Request {
            operation,
            transport,
        } => request(bridge, operation, transport.into()).await,
        Command::HandleLink { address, stash } => {
            if stash {
                let stashed = bridge
                    .stash_inbound(&address)
                    .context("Failed to stash inbound address")?;
                let status = if stashed { "stashed" } else { "ignored" };
                return Ok(json!({ "status": status }));
            }
            let mut link = InboundLink::new(address);
            Ok(route(bridge, |b| b.handle_link(&mut link)))
        }
        Command::HandleResult { extras, cancelled } => {
            let extras = if cancelled {
                ResultExtras::cancelled()
            } else {
                ResultExtras::ok(extras)
            };
            Ok(route(bridge, |b| b.handle_result(&extras)))
        }
        Command::Resume => {
            let subscription = attach(bridge);
            match bridge.resume().context("Failed to resume stashed address")? {
                Some(outcome) => Ok(report(bridge, subscription, outcome)),
                None => {
                    bridge.unsubscribe();
                    Ok(json!({ "status": "nothing_stashed" }))
                }
            }
        }
        Command::Status => {
            let store = bridge
                .correlator()
                .with_store(|store| store.path().display().to_string());
            let mut report = match bridge.pending() {
                Some(pending) => json!({ "status": "awaiting", "pending": pending }),
                None => json!({ "status": "idle" }),
            };
            report["store"] = json!(store);
            Ok(report)
        }
        Command::Abandon => {
            let dropped = bridge.abandon().context("Failed to abandon pending request")?;
            let status = if dropped { "abandoned" } else { "idle" };
            Ok(json!({ "status": status }))
        }
        Command::Launch => {
            let status = match bridge.launch_signer().context("Failed to open signer")? {
                OpenOutcome::Opened => "opened",
                OpenOutcome::SentToStore => "sent_to_store",
            };
            Ok(json!({ "status": status }))
        }
        Command::Store => {
            bridge
                .open_signer_in_store()
                .context("Failed to open store listing")?;
            Ok(json!({ "status": "sent_to_store" }))
        }
    }
}

async fn request(bridge: &RuntimeBridge, operation: Operation, transport: Transport) -> Result<Value> {
    let dispatch = match operation {
        Operation::GetPublicKey {
            permissions: Some(permissions),
        } => {
            bridge
                .dispatch(DelegatedRequest::get_public_key(transport).with_permissions(permissions))
                .await
        }
        Operation::GetPublicKey { permissions: None } => bridge.request_public_key(transport).await,
        Operation::SignEvent { event } => bridge.sign_event(&event, transport).await,
        Operation::Encrypt { plaintext, pubkey } => bridge.encrypt(&plaintext, &pubkey, transport).await,
        Operation::Decrypt { ciphertext, pubkey } => {
            bridge.decrypt(&ciphertext, &pubkey, transport).await
        }
    }
    .context("Request was not issued")?;

    Ok(match dispatch {
        Dispatch::Completed(response) => response_report("completed", &response),
        Dispatch::Awaiting(_handle) => {
            info!("Waiting for the signer to reply through an inbound link");
            json!({ "status": "awaiting", "pending": bridge.pending() })
        }
    })
}

/// Attach a subscriber, route through `resolve`, and report what arrived.
fn route(bridge: &RuntimeBridge, resolve: impl FnOnce(&RuntimeBridge) -> ResolveOutcome) -> Value {
    let subscription = attach(bridge);
    let outcome = resolve(bridge);
    report(bridge, subscription, outcome)
}

fn attach(bridge: &RuntimeBridge) -> Subscription {
    let mut subscription = bridge.subscribe();
    if let Some(stale) = subscription.try_recv() {
        info!(response = %stale, "Delivered a reply buffered by an earlier run");
    }
    subscription
}

fn report(bridge: &RuntimeBridge, mut subscription: Subscription, outcome: ResolveOutcome) -> Value {
    let delivered = subscription.try_recv();
    bridge.unsubscribe();

    match outcome {
        ResolveOutcome::Delivered { path, response } => {
            let mut report = response_report("delivered", delivered.as_ref().unwrap_or(&response));
            report["path"] = json!(format!("{path:?}").to_lowercase());
            report
        }
        ResolveOutcome::DuplicateSuppressed => json!({ "status": "duplicate" }),
        ResolveOutcome::Ignored => json!({ "status": "ignored" }),
    }
}

fn response_report(status: &str, response: &DelegatedResponse) -> Value {
    let mut report = json!({ "status": status, "response": response });
    if let Err(e) = response.clone().into_result() {
        report["error"] = json!(e.to_string());
    }
    report
}
