//! HTTP-based integration tests for the wallet JSON-RPC transport and the
//! ENS name resolver.
//!
//! Uses `wiremock` to stand in for a desktop wallet's local RPC port.

use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

use tipsy::domain::WalletProvider;
use tipsy::infra::{HttpWalletConfig, HttpWalletProvider};

fn rpc_result(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result
    }))
}

fn rpc_error(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message }
    }))
}

fn rpc_method(name: &str) -> impl Match {
    body_partial_json(json!({ "method": name }))
}

fn provider_for(server: &MockServer) -> Arc<HttpWalletProvider> {
    Arc::new(HttpWalletProvider::new(HttpWalletConfig {
        rpc_url: server.uri(),
        ..Default::default()
    }))
}

/// Matches an `eth_call` whose target is `to` (checksummed).
struct CallTo(String);

impl Match for CallTo {
    fn matches(&self, request: &Request) -> bool {
        serde_json::from_slice::<Value>(&request.body)
            .map(|body| body["method"] == "eth_call" && body["params"][0]["to"] == self.0.as_str())
            .unwrap_or(false)
    }
}

fn address_word(address: Address) -> String {
    format!("0x{}{}", "00".repeat(12), alloy_primitives::hex::encode(address))
}

// ============================================================================
// TRANSPORT TESTS
// ============================================================================

mod transport_tests {
    use super::*;
    use tipsy::app::query_chain_id;
    use tipsy::domain::WalletError;

    #[tokio::test]
    async fn test_request_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "jsonrpc": "2.0",
                "method": "eth_accounts",
                "params": []
            })))
            .respond_with(rpc_result(json!(["0xabc"])))
            .expect(1)
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let result = wallet.request("eth_accounts", json!([])).await.unwrap();

        assert_eq!(result, json!(["0xabc"]));
    }

    #[tokio::test]
    async fn test_chain_id_is_parsed_from_hex() {
        let server = MockServer::start().await;
        Mock::given(rpc_method("eth_chainId"))
            .respond_with(rpc_result(json!("0x2105")))
            .mount(&server)
            .await;

        let wallet = provider_for(&server);

        assert_eq!(query_chain_id(wallet.as_ref()).await.unwrap(), 8453);
    }

    #[tokio::test]
    async fn test_error_codes_map_to_wallet_errors() {
        let cases = [
            (4001, WalletError::UserRejected),
            (-32002, WalletError::RequestPending),
            (
                4902,
                WalletError::UnrecognizedChain("Unrecognized chain".to_string()),
            ),
            (
                -32000,
                WalletError::Rpc {
                    code: -32000,
                    message: "Unrecognized chain".to_string(),
                },
            ),
        ];

        for (code, expected) in cases {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(rpc_error(code, "Unrecognized chain"))
                .mount(&server)
                .await;

            let wallet = provider_for(&server);
            let err = wallet
                .request("wallet_switchEthereumChain", json!([{ "chainId": "0x2105" }]))
                .await
                .unwrap_err();

            assert_eq!(err, expected, "code {code}");
        }
    }

    #[tokio::test]
    async fn test_missing_result_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1 })),
            )
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let result = wallet
            .request("wallet_addEthereumChain", json!([]))
            .await
            .unwrap();

        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_http_500_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let err = wallet.request("eth_chainId", json!([])).await.unwrap_err();

        assert!(matches!(err, WalletError::Transport(ref m) if m.contains("500")));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let err = wallet.request("eth_chainId", json!([])).await.unwrap_err();

        assert!(matches!(err, WalletError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_wallet_is_transport_error() {
        let wallet = HttpWalletProvider::new(HttpWalletConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        });

        let err = wallet.request("eth_chainId", json!([])).await.unwrap_err();

        assert!(matches!(err, WalletError::Transport(_)));
    }
}

// ============================================================================
// NAME RESOLUTION TESTS
// ============================================================================

mod ens_resolver_tests {
    use super::*;
    use tipsy::domain::NameResolver;
    use tipsy::infra::{BASENAME_REGISTRY, EnsNameResolver, namehash};

    #[tokio::test]
    async fn test_resolves_through_registry_and_resolver() {
        let server = MockServer::start().await;
        let resolver = Address::repeat_byte(0x42);
        let owner = Address::repeat_byte(0x77);
        let node = namehash("alice.base.eth");

        Mock::given(CallTo(BASENAME_REGISTRY.to_checksum(None)))
            .and(body_partial_json(json!({
                "params": [{ "data": format!("0x0178b8bf{}", alloy_primitives::hex::encode(node)) }]
            })))
            .respond_with(rpc_result(json!(address_word(resolver))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(CallTo(resolver.to_checksum(None)))
            .respond_with(rpc_result(json!(address_word(owner))))
            .expect(1)
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let resolved = EnsNameResolver::default()
            .resolve_name(wallet.as_ref(), "alice.base.eth")
            .await
            .unwrap();

        assert_eq!(resolved, Some(owner.to_checksum(None)));
    }

    #[tokio::test]
    async fn test_name_without_resolver_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(CallTo(BASENAME_REGISTRY.to_checksum(None)))
            .respond_with(rpc_result(json!(address_word(Address::ZERO))))
            .expect(1)
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let resolved = EnsNameResolver::default()
            .resolve_name(wallet.as_ref(), "nobody.base.eth")
            .await
            .unwrap();

        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_resolver_without_code_is_not_found() {
        let server = MockServer::start().await;
        let resolver = Address::repeat_byte(0x42);
        Mock::given(CallTo(BASENAME_REGISTRY.to_checksum(None)))
            .respond_with(rpc_result(json!(address_word(resolver))))
            .mount(&server)
            .await;
        Mock::given(CallTo(resolver.to_checksum(None)))
            .respond_with(rpc_result(json!("0x")))
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let resolved = EnsNameResolver::default()
            .resolve_name(wallet.as_ref(), "ghost.base.eth")
            .await
            .unwrap();

        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_custom_registry_is_queried() {
        let server = MockServer::start().await;
        let registry = Address::repeat_byte(0x99);
        Mock::given(CallTo(registry.to_checksum(None)))
            .respond_with(rpc_result(json!(address_word(Address::ZERO))))
            .expect(1)
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let resolved = EnsNameResolver::new(registry)
            .resolve_name(wallet.as_ref(), "alice.base.eth")
            .await
            .unwrap();

        assert_eq!(resolved, None);
    }

    #[tokio::test]
    async fn test_call_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(rpc_error(-32603, "execution reverted"))
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let result = EnsNameResolver::default()
            .resolve_name(wallet.as_ref(), "alice.base.eth")
            .await;

        assert!(result.is_err());
    }
}

// ============================================================================
// EVENT WATCHER TESTS
// ============================================================================

mod watcher_tests {
    use super::*;
    use tipsy::domain::ProviderEvent;
    use tipsy::infra::{WatcherConfig, spawn_event_watcher};

    fn fast_watcher() -> WatcherConfig {
        WatcherConfig {
            poll_interval: Duration::from_millis(10),
            enabled: true,
        }
    }

    #[tokio::test]
    async fn test_watcher_reports_account_disconnect() {
        let server = MockServer::start().await;
        Mock::given(rpc_method("eth_accounts"))
            .respond_with(rpc_result(json!(["0xabc"])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(rpc_method("eth_accounts"))
            .respond_with(rpc_result(json!([])))
            .mount(&server)
            .await;
        Mock::given(rpc_method("eth_chainId"))
            .respond_with(rpc_result(json!("0x2105")))
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let mut events = wallet.subscribe();
        let (handle, shutdown_tx) = spawn_event_watcher(Arc::clone(&wallet), fast_watcher());

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, ProviderEvent::AccountsChanged(vec![]));

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_watcher_reports_chain_change() {
        let server = MockServer::start().await;
        Mock::given(rpc_method("eth_accounts"))
            .respond_with(rpc_result(json!(["0xabc"])))
            .mount(&server)
            .await;
        Mock::given(rpc_method("eth_chainId"))
            .respond_with(rpc_result(json!("0x2105")))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(rpc_method("eth_chainId"))
            .respond_with(rpc_result(json!("0x1")))
            .mount(&server)
            .await;

        let wallet = provider_for(&server);
        let mut events = wallet.subscribe();
        let (handle, shutdown_tx) = spawn_event_watcher(Arc::clone(&wallet), fast_watcher());

        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, ProviderEvent::ChainChanged(1));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_disabled_watcher_exits_immediately() {
        let server = MockServer::start().await;
        let wallet = provider_for(&server);

        let (handle, _shutdown_tx) = spawn_event_watcher(
            wallet,
            WatcherConfig {
                enabled: false,
                ..fast_watcher()
            },
        );

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
