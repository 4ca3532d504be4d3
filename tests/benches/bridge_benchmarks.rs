//! # Signer Bridge Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | sb-01 Link Codec | decode query-form and fallback replies |
//! | sb-05 Correlator | begin → resolve round trip (in-memory store) |
//! | shared-bus | duplicate check over a warm processed-link cache |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use sb_01_link_codec::decode;
use sb_02_pending_store::InMemoryKVStore;
use sb_04_deferred_reply::{DeferredReplyChannel, RecordingLauncher};
use sb_05_correlator::Correlator;
use shared_bus::ProcessedLinkCache;
use shared_types::{CallerIdentity, DelegatedRequest, Transport};

// ============================================================================
// sb-01: Link decoding
// ============================================================================

fn bench_link_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("sb-01-link-decode");

    let signed_event = format!(
        r#"{{"id":"{id}","pubkey":"{id}","kind":1,"content":"{content}","sig":"{sig}"}}"#,
        id = "a".repeat(64),
        content = "x".repeat(512),
        sig = "b".repeat(128),
    );
    let encoded: String = url::form_urlencoded::byte_serialize(signed_event.as_bytes()).collect();

    let cases = [
        ("pubkey_query", format!("signerbridge://result?pubkey={}", "c".repeat(64))),
        ("event_query", format!("signerbridge://result?event={encoded}")),
        ("fallback_json", format!("signerbridge://result{signed_event}")),
        ("error_query", "signerbridge://result?error=user%20denied".to_string()),
    ];

    for (name, address) in &cases {
        group.throughput(Throughput::Bytes(address.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), address, |b, address| {
            b.iter(|| decode(black_box(address), "signerbridge"))
        });
    }
    group.finish();
}

// ============================================================================
// sb-05: Correlator round trip
// ============================================================================

fn bench_correlator_round_trip(c: &mut Criterion) {
    let identity = CallerIdentity::new("org.example.todo", "Todo");
    let request = DelegatedRequest::sign_event(r#"{"kind":1}"#, Transport::Deferred);

    c.bench_function("sb-05-begin-resolve", |b| {
        let correlator = Correlator::new(
            InMemoryKVStore::new(),
            DeferredReplyChannel::new(RecordingLauncher::new(), "com.signer"),
            "signerbridge",
        );
        let mut n = 0u64;
        b.iter(|| {
            let mut handle = correlator.begin(&request, &identity).ok();
            n += 1;
            correlator.resolve_address(&format!("signerbridge://result?event=signed-{n}"));
            black_box(handle.as_mut().and_then(|h| h.try_take()))
        })
    });
}

// ============================================================================
// shared-bus: Duplicate suppression
// ============================================================================

fn bench_processed_links(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-bus-processed-links");

    for warm in [16usize, 1_024] {
        let mut cache = ProcessedLinkCache::new();
        for i in 0..warm {
            let _ = cache.check_and_mark(&format!("signerbridge://result?result={i}"));
        }
        group.bench_with_input(BenchmarkId::new("contains", warm), &warm, |b, _| {
            b.iter(|| cache.contains(black_box("signerbridge://result?result=7")))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_link_decode,
    bench_correlator_round_trip,
    bench_processed_links
);
criterion_main!(benches);
