//! Property tests for the sync engine's request bookkeeping.

use padsync_engine::{Identity, MockTransport, SyncConfig, SyncEngine};
use padsync_protocol::{parse_response, Method, STATUS_OK};
use padsync_store::{LocalRecord, LocalStore, MemoryStore, NoLocalStore};
use padsync_testkit::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn only_the_current_request_reports(ops in engine_ops_strategy(40)) {
        let transport = Arc::new(MockTransport::new());
        let sink = RecordingSink::new();
        let engine = SyncEngine::new(
            SyncConfig::default(),
            &Identity::new("42"),
            Arc::clone(&transport),
            NoLocalStore,
            sink.callback(),
        )
        .unwrap();

        for op in ops {
            match op {
                EngineOp::Sync(update) => {
                    engine.sync(update);
                    prop_assert!(engine.has_pending_request());
                }
                EngineOp::Complete { index, response } => {
                    let count = transport.request_count();
                    if count == 0 {
                        continue;
                    }
                    let index = index % count;
                    let before = engine.state();
                    let reported = sink.len();
                    let failed = parse_response(&response, STATUS_OK).is_err();

                    let delivered = transport.complete(index, response);

                    if delivered && index + 1 == count {
                        prop_assert_eq!(sink.len(), reported + 1);
                        prop_assert!(!engine.has_pending_request());
                        if failed {
                            prop_assert_eq!(engine.version(), before.version);
                            prop_assert_eq!(engine.dirty(), before.dirty);
                        }
                    } else {
                        prop_assert_eq!(sink.len(), reported);
                        prop_assert_eq!(engine.state(), before);
                    }
                }
            }
        }

        prop_assert_eq!(engine.stats().results_reported as usize, sink.len());
        if let Some(first) = transport.requests().first() {
            prop_assert_eq!(first.method, Method::Get);
        }
    }

    #[test]
    fn failures_never_touch_the_mirror(
        version in version_strategy(),
        content in content_strategy(),
        failure in failure_strategy(),
    ) {
        let store = Arc::new(MemoryStore::with_record("42", LocalRecord::new(version, content.clone())));
        let transport = Arc::new(MockTransport::new());
        let sink = RecordingSink::new();
        let engine = SyncEngine::new(
            SyncConfig::default(),
            &Identity::new("42"),
            Arc::clone(&transport),
            Arc::clone(&store),
            sink.callback(),
        )
        .unwrap();

        engine.sync(None);
        transport.complete_last(failure);

        prop_assert_eq!(store.get("42").unwrap(), Some(LocalRecord::new(version, content)));
        prop_assert_eq!(store.write_count(), 0);
        prop_assert_eq!(sink.results(), vec![None]);
        prop_assert!(!engine.online());
    }
}
