//! # Bridge Flows
//!
//! A caller issues each operation through `SignerBridge` and the reply comes
//! back over the matching channel:
//!
//! 1. **Direct**: query endpoint row → `Dispatch::Completed`
//! 2. **Deferred**: launch → inbound link → completion handle
//! 3. **Result extras**: launch → result-code reply → completion handle
//! 4. **Broadcast**: reply with no handle → buffered → first subscriber only

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sb_01_link_codec::{query_endpoint, ResultExtras, DEFAULT_PERMISSIONS};
    use sb_02_pending_store::InMemoryKVStore;
    use sb_03_direct_query::{DirectQueryChannel, EndpointError, InMemoryQueryEndpoint, QueryRow};
    use sb_04_deferred_reply::{DeferredReplyChannel, LaunchEvent, OpenOutcome, RecordingLauncher};
    use sb_05_correlator::{
        Correlator, Dispatch, InboundLink, ResolveOutcome, SignerBridge, SignerBridgeApi,
    };
    use shared_bus::{CompletionHandle, DeliveryPath};
    use shared_types::{
        BridgeError, CallerIdentity, DelegatedRequest, DelegatedResponse, OperationKind, Transport,
    };

    const SIGNER: &str = "com.greenart7c3.nostrsigner";
    const PEER: &str = "02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5";

    type Bridge = SignerBridge<InMemoryKVStore, RecordingLauncher, InMemoryQueryEndpoint>;

    // =========================================================================
    // FIXTURES
    // =========================================================================

    struct Fixture {
        bridge: Bridge,
        endpoint: Arc<InMemoryQueryEndpoint>,
    }

    impl Fixture {
        fn new() -> Self {
            let endpoint = Arc::new(InMemoryQueryEndpoint::new());
            let correlator = Correlator::new(
                InMemoryKVStore::new(),
                DeferredReplyChannel::new(RecordingLauncher::new(), SIGNER),
                "signerbridge",
            );
            let bridge = SignerBridge::new(
                correlator,
                DirectQueryChannel::from_shared(Arc::clone(&endpoint), SIGNER),
                CallerIdentity::new("org.example.todo", "Todo").with_account("npub1alice"),
            );
            Self { bridge, endpoint }
        }

        fn launcher(&self) -> &RecordingLauncher {
            self.bridge.correlator().channel().launcher()
        }

        fn link(&self, address: &str) -> ResolveOutcome {
            self.bridge.handle_link(&mut InboundLink::new(address))
        }
    }

    fn awaiting(dispatch: Dispatch) -> CompletionHandle {
        match dispatch {
            Dispatch::Awaiting(handle) => handle,
            Dispatch::Completed(response) => panic!("expected a deferred dispatch, got {response}"),
        }
    }

    // =========================================================================
    // DIRECT QUERY CHANNEL
    // =========================================================================

    #[tokio::test]
    async fn test_direct_sign_event_prefers_event_column() {
        let fx = Fixture::new();
        fx.endpoint.answer_row(
            query_endpoint(SIGNER, OperationKind::SignEvent),
            QueryRow::new()
                .with("result", "sig")
                .with("signature", "sig")
                .with("event", r#"{"id":"1","sig":"sig"}"#),
        );

        let response = fx
            .bridge
            .sign_event(r#"{"kind":1}"#, Transport::Direct)
            .await
            .unwrap()
            .into_response()
            .await;

        assert_eq!(response, DelegatedResponse::Success(r#"{"id":"1","sig":"sig"}"#.into()));
        let calls = fx.endpoint.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.as_array(), [r#"{"kind":1}"#, "", "npub1alice"]);
        assert!(fx.launcher().events().is_empty());
    }

    #[tokio::test]
    async fn test_direct_rejected_column_wins() {
        let fx = Fixture::new();
        fx.endpoint.answer_row(
            query_endpoint(SIGNER, OperationKind::Nip44Decrypt),
            QueryRow::new().with("rejected", "true").with("result", "plaintext"),
        );

        let response = fx
            .bridge
            .decrypt("ciphertext", PEER, Transport::Direct)
            .await
            .unwrap()
            .into_response()
            .await;
        assert_eq!(response, DelegatedResponse::Rejected);
    }

    #[tokio::test]
    async fn test_direct_failures_are_no_response() {
        let fx = Fixture::new();
        fx.endpoint.answer_error(
            query_endpoint(SIGNER, OperationKind::Nip44Encrypt),
            EndpointError::Unavailable {
                reason: "signer locked".into(),
            },
        );
        fx.endpoint
            .answer_empty(query_endpoint(SIGNER, OperationKind::Nip44Decrypt));

        let encrypted = fx
            .bridge
            .encrypt("hi", PEER, Transport::Direct)
            .await
            .unwrap()
            .into_response()
            .await;
        let decrypted = fx
            .bridge
            .decrypt("ct", PEER, Transport::Direct)
            .await
            .unwrap()
            .into_response()
            .await;
        let pubkey = fx
            .bridge
            .request_public_key(Transport::Direct)
            .await
            .unwrap()
            .into_response()
            .await;

        for response in [encrypted, decrypted, pubkey] {
            assert_eq!(response, DelegatedResponse::Failed("no response".into()));
        }
        assert_eq!(fx.endpoint.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_direct_row_without_payload() {
        let fx = Fixture::new();
        fx.endpoint.answer_row(
            query_endpoint(SIGNER, OperationKind::GetPublicKey),
            QueryRow::new().with("package", "com.greenart7c3.nostrsigner"),
        );

        let response = fx
            .bridge
            .request_public_key(Transport::Direct)
            .await
            .unwrap()
            .into_response()
            .await;
        assert_eq!(response, DelegatedResponse::Failed("no valid response".into()));
        assert_eq!(fx.endpoint.calls()[0].1.payload, "login");
    }

    // =========================================================================
    // DEFERRED REPLY CHANNEL
    // =========================================================================

    #[tokio::test]
    async fn test_sign_event_fallback_json_reply() {
        let fx = Fixture::new();
        let handle = awaiting(fx.bridge.sign_event(r#"{"kind":1}"#, Transport::Deferred).await.unwrap());

        let launched = fx.launcher().launched();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0].address, r#"nostrsigner:{"kind":1}"#);
        assert_eq!(launched[0].extras["type"], "sign_event");
        assert_eq!(launched[0].extras["package"], "org.example.todo");

        let outcome = fx.link(r#"signerbridge://result{"sig":"abc"}"#);
        assert_eq!(outcome.path(), Some(DeliveryPath::Waiter));
        assert_eq!(handle.wait().await, DelegatedResponse::Success(r#"{"sig":"abc"}"#.into()));
        assert!(fx.bridge.pending().is_none());
    }

    #[tokio::test]
    async fn test_public_key_error_clears_record() {
        let fx = Fixture::new();
        let handle = awaiting(fx.bridge.request_public_key(Transport::Deferred).await.unwrap());
        assert_eq!(fx.launcher().launched()[0].extras["permissions"], DEFAULT_PERMISSIONS);
        assert_eq!(fx.bridge.pending().unwrap().kind, OperationKind::GetPublicKey);

        fx.link("signerbridge://result?error=denied");

        assert_eq!(handle.wait().await, DelegatedResponse::Failed("denied".into()));
        assert!(fx.bridge.pending().is_none());
    }

    #[tokio::test]
    async fn test_fallback_hex_pubkey_reply() {
        let fx = Fixture::new();
        let handle = awaiting(fx.bridge.request_public_key(Transport::Deferred).await.unwrap());

        let hex = "a".repeat(64);
        fx.link(&format!("signerbridge://result{hex}"));
        assert_eq!(handle.wait().await, DelegatedResponse::Success(hex));
    }

    #[tokio::test]
    async fn test_malformed_reply_is_delivered_as_failure() {
        let fx = Fixture::new();
        let handle = awaiting(fx.bridge.encrypt("hi", PEER, Transport::Deferred).await.unwrap());

        let outcome = fx.link("signerbridge://result");
        assert!(matches!(outcome, ResolveOutcome::Delivered { .. }));

        match handle.wait().await {
            DelegatedResponse::Failed(message) => assert!(!message.is_empty()),
            other => panic!("expected a failure, got {other}"),
        }
        assert!(fx.bridge.pending().is_none());
    }

    #[tokio::test]
    async fn test_explicit_permissions_are_forwarded() {
        let fx = Fixture::new();
        let permissions = r#"[{"type":"sign_event","kind":1}]"#;
        let dispatch = fx
            .bridge
            .dispatch(DelegatedRequest::get_public_key(Transport::Deferred).with_permissions(permissions))
            .await
            .unwrap();
        let _handle = awaiting(dispatch);

        assert_eq!(fx.launcher().launched()[0].extras["permissions"], permissions);
    }

    // =========================================================================
    // RESULT EXTRAS
    // =========================================================================

    #[tokio::test]
    async fn test_result_extras_route_to_handle() {
        let fx = Fixture::new();
        let handle = awaiting(fx.bridge.sign_event("{}", Transport::Deferred).await.unwrap());

        let outcome = fx.bridge.handle_result(&ResultExtras::ok([
            ("result", "sig"),
            ("event", r#"{"sig":"sig"}"#),
        ]));
        assert_eq!(outcome.path(), Some(DeliveryPath::Waiter));
        assert_eq!(handle.wait().await, DelegatedResponse::Success(r#"{"sig":"sig"}"#.into()));
    }

    #[tokio::test]
    async fn test_result_failure_code_cancels() {
        let fx = Fixture::new();
        let handle = awaiting(fx.bridge.decrypt("ct", PEER, Transport::Deferred).await.unwrap());

        fx.bridge.handle_result(&ResultExtras::cancelled());
        assert_eq!(handle.wait().await, DelegatedResponse::Cancelled);
        assert_eq!(
            fx.bridge.handle_result(&ResultExtras::ok([("result", "late")])),
            ResolveOutcome::Ignored
        );
    }

    // =========================================================================
    // SINGLE-SLOT CORRELATION
    // =========================================================================

    #[tokio::test]
    async fn test_superseded_handle_observes_cancelled() {
        let fx = Fixture::new();
        let first = awaiting(fx.bridge.request_public_key(Transport::Deferred).await.unwrap());
        let second = awaiting(fx.bridge.sign_event("{}", Transport::Deferred).await.unwrap());

        assert_eq!(first.wait().await, DelegatedResponse::Cancelled);
        assert_eq!(fx.bridge.pending().unwrap().kind, OperationKind::SignEvent);

        fx.link("signerbridge://result?event=signed");
        assert_eq!(second.wait().await, DelegatedResponse::Success("signed".into()));
    }

    #[tokio::test]
    async fn test_launch_failure_leaves_no_record() {
        let fx = Fixture::new();
        fx.launcher().fail_next("activity not found");

        let err = fx.bridge.sign_event("{}", Transport::Deferred).await.unwrap_err();
        assert!(err.is_unreachable());
        assert!(fx.bridge.pending().is_none());

        fx.launcher().set_installed(false);
        assert!(matches!(
            fx.bridge.request_public_key(Transport::Deferred).await,
            Err(BridgeError::Unreachable { .. })
        ));
        assert!(fx.bridge.pending().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_links_are_suppressed() {
        let fx = Fixture::new();
        let mut handle = awaiting(fx.bridge.encrypt("hi", PEER, Transport::Deferred).await.unwrap());

        let address = "signerbridge://result?result=ciphertext";
        let mut link = InboundLink::new(address);
        assert!(matches!(fx.bridge.handle_link(&mut link), ResolveOutcome::Delivered { .. }));
        assert!(link.is_processed());

        // Same physical link handed over again, then the same address as a new link.
        assert_eq!(fx.bridge.handle_link(&mut link), ResolveOutcome::DuplicateSuppressed);
        assert_eq!(fx.link(address), ResolveOutcome::DuplicateSuppressed);

        assert_eq!(handle.try_take(), Some(DelegatedResponse::Success("ciphertext".into())));
        let mut subscription = fx.bridge.subscribe();
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_unrelated_link_does_not_consume_pending_request() {
        let fx = Fixture::new();
        let handle = awaiting(fx.bridge.request_public_key(Transport::Deferred).await.unwrap());
        let mut subscription = fx.bridge.subscribe();

        assert_eq!(fx.link("https://example.com/share?x=1"), ResolveOutcome::Ignored);
        assert!(!fx.bridge.stash_inbound("https://example.com/share?x=1").unwrap());
        assert_eq!(subscription.try_recv(), None);
        assert_eq!(
            fx.bridge.pending().map(|p| p.kind),
            Some(OperationKind::GetPublicKey)
        );

        let outcome = fx.link(&format!("signerbridge://result?pubkey={PEER}"));
        assert_eq!(outcome.path(), Some(DeliveryPath::Waiter));
        assert_eq!(handle.wait().await, DelegatedResponse::Success(PEER.into()));
        assert_eq!(subscription.try_recv(), None);
    }

    // =========================================================================
    // BROADCAST
    // =========================================================================

    #[tokio::test]
    async fn test_dropped_handle_falls_back_to_broadcast() {
        let fx = Fixture::new();
        drop(awaiting(fx.bridge.sign_event("{}", Transport::Deferred).await.unwrap()));

        let outcome = fx.link("signerbridge://result?event=signed");
        assert_eq!(outcome.path(), Some(DeliveryPath::Buffered));

        let mut first = fx.bridge.subscribe();
        assert_eq!(first.try_recv(), Some(DelegatedResponse::Success("signed".into())));
        fx.bridge.unsubscribe();

        let mut second = fx.bridge.subscribe();
        assert_eq!(second.try_recv(), None);
    }

    #[tokio::test]
    async fn test_attached_subscriber_receives_unowned_reply() {
        let fx = Fixture::new();
        let mut subscription = fx.bridge.subscribe();

        let outcome = fx.link("signerbridge://result?rejected=true");
        assert_eq!(outcome.path(), Some(DeliveryPath::Subscriber));
        assert_eq!(subscription.recv().await, Some(DelegatedResponse::Rejected));
    }

    #[test]
    fn test_open_signer_falls_back_to_store() {
        let fx = Fixture::new();
        fx.launcher().set_installed(false);

        assert_eq!(fx.bridge.launch_signer(), Ok(OpenOutcome::SentToStore));
        assert_eq!(
            fx.launcher().events(),
            vec![LaunchEvent::OpenedStore(
                "https://play.google.com/store/apps/details?id=com.greenart7c3.nostrsigner".into()
            )]
        );
    }
}
