//! Explorer history client against a mock HTTP server.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | GET    | `/api/unchained/user/{public_key}` | `history_*` |

use unchained_signer::{ExplorerClient, ExplorerError, PrivateKey, SignerConfig};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(mock_server: &MockServer) -> ExplorerClient {
    let mut config = SignerConfig::local_mock(19000).unwrap();
    config.explorer_url = Url::parse(&mock_server.uri()).unwrap();
    ExplorerClient::new(&config).unwrap()
}

#[tokio::test]
async fn history_maps_records() {
    let mock_server = MockServer::start().await;
    let pk = unchained_signer::public_key_hex(&PrivateKey::generate());

    Mock::given(method("GET"))
        .and(path(format!("/api/unchained/user/{pk}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "_id": "6650a1",
                "hash": "0xdead",
                "topic": "0x1ce3",
                "timestamp": "2024-05-24T10:00:00Z",
                "data": {
                    "consensus": true,
                    "hash": "0xdead",
                    "signature": "abcd",
                    "signers_count": 4,
                    "timestamp": 1716544800,
                    "topic": "0x1ce3",
                    "voted": 1,
                    "meta": { "correct": true }
                }
            },
            {
                "_id": "6650a2",
                "hash": "0xbeef",
                "topic": "0x1ce3",
                "timestamp": "2024-05-25T10:00:00Z",
                "data": { "signers_count": 1, "meta": { "correct": false } }
            }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = client(&mock_server).signatures(&pk).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "6650a1");
    assert_eq!(records[0].signers_count, 4);
    assert!(records[0].correct);
    assert_eq!(records[1].timestamp, "2024-05-25T10:00:00Z");
    assert!(!records[1].correct);
}

#[tokio::test]
async fn history_empty_list() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/unchained/user/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    assert!(client(&mock_server).signatures("abc").await.unwrap().is_empty());
}

#[tokio::test]
async fn history_server_error_is_reported() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = client(&mock_server).signatures("abc").await.unwrap_err();
    assert!(matches!(err, ExplorerError::Http(_)));
}
