//! # Runtime Commands
//!
//! `signer-runtime` commands wired to real command adapters: the opener and
//! query programs are stock shell utilities standing in for a platform
//! bridge.

#[cfg(test)]
mod tests {
    use std::path::Path;

    use serde_json::json;
    use signer_runtime::{execute, open_bridge, Command, Operation, RuntimeConfig, TransportArg};

    fn config(data_dir: &Path, extra_toml: &str) -> RuntimeConfig {
        let mut config = RuntimeConfig::parse(&format!(
            r#"
            [identity]
            app_id = "org.example.todo"
            app_name = "Todo"
            account = "npub1alice"

            {extra_toml}
            "#
        ))
        .unwrap();
        config.storage.data_dir = data_dir.to_path_buf();
        config.validate().unwrap();
        config
    }

    #[tokio::test]
    async fn test_direct_request_through_query_program() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            r#"
            [signer]
            query_program = "sh"
            query_args = ["-c", "echo '{\"result\":\"npubhex\"}'"]
            "#,
        );

        let report = execute(
            &open_bridge(&config).unwrap(),
            Command::Request {
                operation: Operation::GetPublicKey { permissions: None },
                transport: TransportArg::Direct,
            },
        )
        .await
        .unwrap();

        assert_eq!(report["status"], "completed");
        assert_eq!(report["response"], json!({ "status": "success", "value": "npubhex" }));
    }

    #[tokio::test]
    async fn test_deferred_request_survives_into_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            r#"
            [signer]
            opener = "true"
            "#,
        );

        let report = execute(
            &open_bridge(&config).unwrap(),
            Command::Request {
                operation: Operation::SignEvent {
                    event: r#"{"kind":1,"content":"hi"}"#.into(),
                },
                transport: TransportArg::Deferred,
            },
        )
        .await
        .unwrap();
        assert_eq!(report["status"], "awaiting");
        assert_eq!(report["pending"]["raw_address"], r#"nostrsigner:{"kind":1,"content":"hi"}"#);

        let report = execute(&open_bridge(&config).unwrap(), Command::Status)
            .await
            .unwrap();
        assert_eq!(report["status"], "awaiting");
        assert_eq!(report["pending"]["handle_attached"], false);

        let report = execute(
            &open_bridge(&config).unwrap(),
            Command::HandleLink {
                address: r#"signerbridge://result{"sig":"abc"}"#.into(),
                stash: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(report["status"], "delivered");
        assert_eq!(
            report["response"],
            json!({ "status": "success", "value": r#"{"sig":"abc"}"# })
        );

        let report = execute(&open_bridge(&config).unwrap(), Command::Status)
            .await
            .unwrap();
        assert_eq!(report["status"], "idle");
    }

    #[tokio::test]
    async fn test_failing_opener_leaves_nothing_pending() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(
            dir.path(),
            r#"
            [signer]
            opener = "false"
            "#,
        );
        let bridge = open_bridge(&config).unwrap();

        let result = execute(
            &bridge,
            Command::Request {
                operation: Operation::Encrypt {
                    plaintext: "hi".into(),
                    pubkey: "02ab".into(),
                },
                transport: TransportArg::Deferred,
            },
        )
        .await;
        assert!(result.is_err());

        let report = execute(&bridge, Command::Status).await.unwrap();
        assert_eq!(report["status"], "idle");
    }

    #[tokio::test]
    async fn test_result_extras_for_recovered_request() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), "");

        execute(
            &open_bridge(&config).unwrap(),
            Command::Request {
                operation: Operation::Decrypt {
                    ciphertext: "ct".into(),
                    pubkey: "02ab".into(),
                },
                transport: TransportArg::Deferred,
            },
        )
        .await
        .unwrap();

        let report = execute(
            &open_bridge(&config).unwrap(),
            Command::HandleResult {
                extras: vec![("rejected".into(), "true".into())],
                cancelled: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(report["status"], "delivered");
        assert_eq!(report["response"], json!({ "status": "rejected" }));
    }
}
