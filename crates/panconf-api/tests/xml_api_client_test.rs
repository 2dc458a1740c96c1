#![allow(clippy::unwrap_used)]
// Integration tests for `XmlApiClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use url::Url;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use panconf_api::{Error, TransportConfig, XmlApiClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, XmlApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let key = SecretString::from("LUFRPT1-test-key".to_string());
    let client = XmlApiClient::with_api_key(base_url, &key, &TransportConfig::default()).unwrap();
    (server, client)
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/xml")
        .set_body_string(body)
}

const VSYS1_ADDRESS: &str =
    "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='vsys1']/address";

// ── Key generation ──────────────────────────────────────────────────

#[tokio::test]
async fn test_generate_api_key() {
    let server = MockServer::start().await;
    let client =
        XmlApiClient::new(Url::parse(&server.uri()).unwrap(), &TransportConfig::default())
            .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/"))
        .and(body_string_contains("type=keygen"))
        .and(body_string_contains("user=admin"))
        .respond_with(xml(
            r#"<response status="success"><result><key>LUFRPT1-generated</key></result></response>"#,
        ))
        .mount(&server)
        .await;

    let secret = SecretString::from("hunter2".to_string());
    let key = client.generate_api_key("admin", &secret).await.unwrap();
    assert_eq!(key.expose_secret(), "LUFRPT1-generated");
}

#[tokio::test]
async fn test_generate_api_key_bad_credentials() {
    let server = MockServer::start().await;
    let client =
        XmlApiClient::new(Url::parse(&server.uri()).unwrap(), &TransportConfig::default())
            .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_string(
                r#"<response status="error" code="403"><result><msg>Invalid Credential</msg></result></response>"#,
            ),
        )
        .mount(&server)
        .await;

    let secret = SecretString::from("wrong".to_string());
    let result = client.generate_api_key("admin", &secret).await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

// ── Config reads ────────────────────────────────────────────────────

#[tokio::test]
async fn test_show_config_sends_key_and_returns_result() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(header("X-PAN-KEY", "LUFRPT1-test-key"))
        .and(query_param("type", "config"))
        .and(query_param("action", "show"))
        .and(query_param("xpath", VSYS1_ADDRESS))
        .respond_with(xml(
            r#"<response status="success"><result total-count="1" count="1">
                 <address><entry name="dns-1"><ip-netmask>9.9.9.9</ip-netmask></entry></address>
               </result></response>"#,
        ))
        .mount(&server)
        .await;

    let result = client.show_config(VSYS1_ADDRESS).await.unwrap();
    let entries = result.entries_at("address");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entry_name(), Some("dns-1"));
}

#[tokio::test]
async fn test_show_config_empty_result() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(xml(r#"<response status="success"><result/></response>"#))
        .mount(&server)
        .await;

    let result = client.show_config(VSYS1_ADDRESS).await.unwrap();
    assert_eq!(result.name, "result");
    assert!(result.children.is_empty());
}

#[tokio::test]
async fn test_show_config_no_such_node_is_empty_result() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(xml(
            r#"<response status="error" code="7"><msg><line>No such node</line></msg></response>"#,
        ))
        .mount(&server)
        .await;

    let result = client.show_config(VSYS1_ADDRESS).await.unwrap();
    assert_eq!(result.name, "result");
    assert!(result.children.is_empty());
}

#[tokio::test]
async fn test_op_no_such_node_stays_an_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(xml(
            r#"<response status="error" code="7"><msg><line>No such node</line></msg></response>"#,
        ))
        .mount(&server)
        .await;

    let err = client.op("<show><nothing/></show>").await.unwrap_err();
    assert!(err.is_no_such_node(), "got {err:?}");
}

#[tokio::test]
async fn test_error_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(xml(
            r#"<response status="error" code="12"><msg><line>Invalid object</line></msg></response>"#,
        ))
        .mount(&server)
        .await;

    let err = client.show_config("/config/nope").await.unwrap_err();
    match err {
        Error::Api { message, code } => {
            assert_eq!(message, "Invalid object");
            assert_eq!(code, Some(12));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_is_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let err = client.show_config(VSYS1_ADDRESS).await.unwrap_err();
    assert!(matches!(err, Error::InvalidApiKey), "got {err:?}");
}

#[tokio::test]
async fn test_server_error_without_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.show_config(VSYS1_ADDRESS).await.unwrap_err();
    assert!(
        matches!(err, Error::Http { status: 502, .. }),
        "got {err:?}"
    );
}

// ── Operational commands ────────────────────────────────────────────

#[tokio::test]
async fn test_system_info() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("type", "op"))
        .respond_with(xml(
            r#"<response status="success"><result><system>
                 <hostname>fw01</hostname>
                 <model>PA-3220</model>
                 <serial>0123456789</serial>
                 <sw-version>10.2.4</sw-version>
                 <multi-vsys>on</multi-vsys>
               </system></result></response>"#,
        ))
        .mount(&server)
        .await;

    let info = client.system_info().await.unwrap();
    assert_eq!(info.hostname.as_deref(), Some("fw01"));
    assert_eq!(info.model.as_deref(), Some("PA-3220"));
    assert_eq!(info.sw_version.as_deref(), Some("10.2.4"));
    assert!(info.multi_vsys);
}
