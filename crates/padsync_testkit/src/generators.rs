//! Property-based test generators using proptest.
//!
//! Provides strategies for generating versions, record content, server
//! responses and sequences of engine operations.

use padsync_protocol::{ServerResponse, TransportResponse};
use proptest::prelude::*;

/// Strategy for generating record versions.
pub fn version_strategy() -> impl Strategy<Value = u64> {
    prop_oneof![0u64..16, any::<u64>()]
}

/// Strategy for generating record content, including multi-line and empty
/// text.
pub fn content_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9 .,!?-]{0,24}", 0..5).prop_map(|lines| lines.join("\n"))
}

/// Strategy for generating parsed server responses.
pub fn server_response_strategy() -> impl Strategy<Value = ServerResponse> {
    (
        prop::option::of(version_strategy()),
        prop::option::of(content_strategy()),
    )
        .prop_map(|(version, content)| ServerResponse::new(version, content))
}

/// Strategy for generating transport failures.
pub fn failure_strategy() -> impl Strategy<Value = TransportResponse> {
    prop_oneof![
        Just(TransportResponse::unreachable()),
        (400u16..600).prop_map(|status| TransportResponse::with_status(status, "Error", "")),
    ]
}

/// An operation applied to an engine under a mock transport.
#[derive(Debug, Clone)]
pub enum EngineOp {
    /// Call `sync` with an optional edit.
    Sync(Option<String>),
    /// Complete the request at this index (modulo the requests issued).
    Complete {
        /// Request index.
        index: usize,
        /// Response to deliver.
        response: TransportResponse,
    },
}

/// Strategy for generating engine operations.
pub fn engine_op_strategy() -> impl Strategy<Value = EngineOp> {
    let response = prop_oneof![
        3 => server_response_strategy().prop_map(|r| TransportResponse::ok(r.encode())),
        1 => failure_strategy(),
    ];
    prop_oneof![
        prop::option::of(content_strategy()).prop_map(EngineOp::Sync),
        (any::<usize>(), response).prop_map(|(index, response)| EngineOp::Complete { index, response }),
    ]
}

/// Strategy for generating sequences of engine operations.
pub fn engine_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<EngineOp>> {
    prop::collection::vec(engine_op_strategy(), 1..max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn generated_responses_encode_and_parse(response in server_response_strategy()) {
            let parsed = ServerResponse::parse_body(&response.encode()).unwrap();
            prop_assert_eq!(parsed, response);
        }

        #[test]
        fn failures_are_not_success(response in failure_strategy()) {
            prop_assert_ne!(response.status, Some(200));
        }
    }
}
