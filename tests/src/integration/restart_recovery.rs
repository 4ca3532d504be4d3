//! # Restart Recovery
//!
//! The host process may be killed while the signer is in the foreground.
//! These scenarios drop every in-memory structure between steps and rebuild
//! the correlator from the same file-backed store, the way a recreated
//! process would.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use sb_02_pending_store::domain::keys;
    use sb_02_pending_store::{FileBackedKVStore, KVStoreError, KeyValueStore, PendingRequestStore};
    use sb_04_deferred_reply::{DeferredReplyChannel, RecordingLauncher};
    use sb_05_correlator::{Correlator, CorrelatorState, ResolveOutcome};
    use shared_bus::DeliveryPath;
    use shared_types::{
        CallerIdentity, DelegatedRequest, DelegatedResponse, OperationKind, PendingRecord, Transport,
    };

    type FileCorrelator = Correlator<FileBackedKVStore, RecordingLauncher>;

    fn identity() -> CallerIdentity {
        CallerIdentity::new("org.example.todo", "Todo")
    }

    /// A fresh "process": new store handle, new launcher, empty hub.
    fn boot(path: &Path) -> FileCorrelator {
        boot_with(path, Arc::new(RecordingLauncher::new()))
    }

    fn boot_with(path: &Path, launcher: Arc<RecordingLauncher>) -> FileCorrelator {
        let store = FileBackedKVStore::open(path).unwrap();
        Correlator::new(
            store,
            DeferredReplyChannel::from_shared(launcher, "com.greenart7c3.nostrsigner"),
            "signerbridge",
        )
    }

    #[tokio::test]
    async fn test_reply_after_restart_is_buffered_for_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        {
            let correlator = boot(&path);
            let _handle = correlator
                .begin(&DelegatedRequest::sign_event("{}", Transport::Deferred), &identity())
                .unwrap();
        }

        let correlator = boot(&path);
        match correlator.state() {
            CorrelatorState::AwaitingReply {
                record,
                handle_attached,
            } => {
                assert_eq!(record.kind, OperationKind::SignEvent);
                assert_eq!(record.raw_address, "nostrsigner:{}");
                assert!(!handle_attached);
            }
            CorrelatorState::Idle => panic!("pending request was not recovered"),
        }

        let outcome = correlator.resolve_address("signerbridge://result?event=%7B%22sig%22%3A%22abc%22%7D");
        assert_eq!(outcome.path(), Some(DeliveryPath::Buffered));
        assert!(correlator.state().is_idle());

        let mut subscription = correlator.attach();
        assert_eq!(
            subscription.recv().await,
            Some(DelegatedResponse::Success(r#"{"sig":"abc"}"#.into()))
        );

        // The record is gone from disk as well.
        assert!(boot(&path).state().is_idle());
    }

    #[tokio::test]
    async fn test_inbound_stash_survives_restart_and_resolves_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        {
            let correlator = boot(&path);
            let _handle = correlator
                .begin(&DelegatedRequest::encrypt("hi", "02ab", Transport::Deferred), &identity())
                .unwrap();
        }
        {
            // Process recreated by the inbound link; it stashes and dies again.
            let correlator = boot(&path);
            assert!(correlator
                .stash_inbound("signerbridge://result?result=ciphertext")
                .unwrap());
        }

        let correlator = boot(&path);
        let mut subscription = correlator.attach();
        let outcome = correlator.resume().unwrap().unwrap();
        assert_eq!(outcome.path(), Some(DeliveryPath::Subscriber));
        assert_eq!(
            subscription.recv().await,
            Some(DelegatedResponse::Success("ciphertext".into()))
        );

        assert_eq!(correlator.resume().unwrap(), None);
        let store = PendingRequestStore::new(FileBackedKVStore::open(&path).unwrap());
        assert_eq!(store.peek_inbound().unwrap(), None);
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_redelivered_link_after_restart_is_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");
        let address = "signerbridge://result?pubkey=abc";

        let correlator = boot(&path);
        let _handle = correlator
            .begin(&DelegatedRequest::get_public_key(Transport::Deferred), &identity())
            .unwrap();
        drop(correlator);

        let correlator = boot(&path);
        assert!(matches!(correlator.resolve_address(address), ResolveOutcome::Delivered { .. }));
        assert_eq!(correlator.resolve_address(address), ResolveOutcome::DuplicateSuppressed);

        let mut subscription = correlator.attach();
        assert_eq!(subscription.try_recv(), Some(DelegatedResponse::Success("abc".into())));
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_new_request_after_restart_supersedes_recovered_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        drop(
            boot(&path)
                .begin(&DelegatedRequest::get_public_key(Transport::Deferred), &identity())
                .unwrap(),
        );

        let launcher = Arc::new(RecordingLauncher::new());
        let correlator = boot_with(&path, Arc::clone(&launcher));
        let handle = correlator
            .begin(&DelegatedRequest::decrypt("ct", "02ab", Transport::Deferred), &identity())
            .unwrap();
        assert_eq!(launcher.launched().len(), 1);
        assert_eq!(boot(&path).state().kind(), Some(OperationKind::Nip44Decrypt));

        correlator.resolve_address("signerbridge://result?result=plaintext");
        assert_eq!(handle.wait().await, DelegatedResponse::Success("plaintext".into()));
    }

    #[test]
    fn test_launch_failure_is_not_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        let launcher = Arc::new(RecordingLauncher::new());
        launcher.set_installed(false);
        let correlator = boot_with(&path, launcher);
        assert!(correlator
            .begin(&DelegatedRequest::sign_event("{}", Transport::Deferred), &identity())
            .is_err());
        drop(correlator);

        assert!(boot(&path).state().is_idle());
    }

    #[test]
    fn test_abandon_clears_record_and_stash_for_next_process() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        drop(
            boot(&path)
                .begin(&DelegatedRequest::sign_event("{}", Transport::Deferred), &identity())
                .unwrap(),
        );
        assert!(boot(&path)
            .stash_inbound("signerbridge://result?event=signed")
            .unwrap());

        assert!(boot(&path).abandon().unwrap());

        let correlator = boot(&path);
        assert!(correlator.state().is_idle());
        assert_eq!(correlator.resume().unwrap(), None);
    }

    #[test]
    fn test_truncated_store_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        {
            let mut store = PendingRequestStore::new(FileBackedKVStore::open(&path).unwrap());
            store
                .save(&PendingRecord::new(OperationKind::SignEvent, "nostrsigner:{}"))
                .unwrap();
        }
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 3]).unwrap();

        assert!(matches!(
            FileBackedKVStore::open(&path),
            Err(KVStoreError::CorruptionError { .. })
        ));
    }

    #[test]
    fn test_unreadable_record_is_discarded_on_boot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        {
            let mut store = FileBackedKVStore::open(&path).unwrap();
            store.put(keys::PENDING_RECORD, b"{not json").unwrap();
            store.put(keys::INBOUND_LINK, b"signerbridge://result?result=x").unwrap();
        }

        assert!(boot(&path).state().is_idle());

        let store = FileBackedKVStore::open(&path).unwrap();
        assert_eq!(store.get(keys::PENDING_RECORD).unwrap(), None);
        assert!(store.exists(keys::INBOUND_LINK).unwrap());
    }
}
