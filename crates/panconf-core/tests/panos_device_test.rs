#![allow(clippy::unwrap_used)]
// `PanosDevice` and `PanosConnector` against a mocked XML API.

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use panconf_api::{TransportConfig, XmlApiClient};
use panconf_core::{
    ConnectError, Connector, CredentialError, CredentialProvider, DeviceClient, HostContext,
    HostSpec, PanosConnector, PanosDevice, SchemaRegistry, Value, catalog, extract,
};

const KEY: &str = "LUFRPT1-test-key";
const VSYS1: &str = "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='vsys1']";
const DEVICE: &str = "/config/devices/entry[@name='localhost.localdomain']";

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "application/xml")
        .set_body_string(body)
}

async fn device(server: &MockServer) -> PanosDevice {
    let key = SecretString::from(KEY.to_string());
    let client = XmlApiClient::with_api_key(
        Url::parse(&server.uri()).unwrap(),
        &key,
        &TransportConfig::default(),
    )
    .unwrap();
    PanosDevice::new(client, "vsys1")
}

async fn mount_show(server: &MockServer, xpath: &str, result: &str) {
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("type", "config"))
        .and(query_param("action", "show"))
        .and(query_param("xpath", xpath))
        .and(header("X-PAN-KEY", KEY))
        .respond_with(xml(&format!(
            r#"<response status="success"><result total-count="1" count="1">{result}</result></response>"#
        )))
        .expect(1)
        .mount(server)
        .await;
}

// ── Fetching ────────────────────────────────────────────────────────

#[tokio::test]
async fn fetches_vsys_objects() {
    let server = MockServer::start().await;
    mount_show(
        &server,
        &format!("{VSYS1}/address"),
        r#"<address>
             <entry name="web"><ip-netmask>10.0.0.80/32</ip-netmask><description>web tier</description></entry>
             <entry name="corp"><fqdn>corp.example.net</fqdn></entry>
           </address>"#,
    )
    .await;

    let dev = device(&server).await;
    let ty = catalog::lookup("AddressObject").unwrap();
    let instances = dev
        .fetch_children(panconf_core::Parent::Container(panconf_core::Container::Firewall), ty)
        .await
        .unwrap();

    assert_eq!(instances.len(), 2);
    assert_eq!(instances[0].name(), Some("web"));
    assert_eq!(instances[0].field("description"), Value::from("web tier"));
    assert_eq!(instances[1].field("type"), Value::from("fqdn"));
    assert_eq!(instances[1].field("value"), Value::from("corp.example.net"));
}

#[tokio::test]
async fn missing_node_yields_no_instances() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(xml(
            r#"<response status="error" code="7"><msg><line>No such node</line></msg></response>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let dev = device(&server).await;
    let ty = catalog::lookup("AddressGroup").unwrap();
    let instances = dev
        .fetch_children(panconf_core::Parent::Container(panconf_core::Container::Firewall), ty)
        .await
        .unwrap();
    assert!(instances.is_empty());
}

#[tokio::test]
async fn extracts_nested_children_with_one_request() {
    let server = MockServer::start().await;
    mount_show(
        &server,
        &format!("{DEVICE}/network/virtual-router"),
        r#"<virtual-router>
             <entry name="default">
               <interface><member>ethernet1/1</member></interface>
               <routing-table><ip><static-route>
                 <entry name="to-lan"><destination>10.0.0.0/8</destination><nexthop><ip-address>10.1.1.254</ip-address></nexthop><metric>10</metric></entry>
                 <entry name="blackhole"><destination>192.0.2.0/24</destination><nexthop><discard/></nexthop></entry>
               </static-route></ip></routing-table>
             </entry>
           </virtual-router>"#,
    )
    .await;

    let registry = SchemaRegistry::from_yaml_str(
        r"
modules:
  network:
    virtual_router:
      class: VirtualRouter
      parent: firewall
      params: [name, interface]
      sort_param: name
      children:
        - name: static_route
children:
  static_route:
    class: StaticRoute
    params: [name, destination, nexthop_type, nexthop, metric]
    sort_param: name
",
    )
    .unwrap();

    let ctx = HostContext::new("fw01", "vsys1", device(&server).await);
    let records = extract(&ctx, registry.lookup("network/virtual_router").unwrap())
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].get("interface"),
        Some(&Value::List(vec![Value::from("ethernet1/1")]))
    );
    let routes = records[0].child("static_route").unwrap();
    assert_eq!(routes[0].get("name"), Some(&Value::from("blackhole")));
    assert_eq!(routes[0].get("nexthop_type"), Some(&Value::from("discard")));
    assert!(!routes[0].contains_key("nexthop"));
    assert_eq!(routes[1].get("nexthop"), Some(&Value::from("10.1.1.254")));
    assert_eq!(routes[1].get("metric"), Some(&Value::Int(10)));
}

// ── Connecting ──────────────────────────────────────────────────────

struct StaticKey(Option<&'static str>);

impl CredentialProvider for StaticKey {
    fn api_key(&self, host: &HostSpec) -> Result<SecretString, CredentialError> {
        self.0
            .map(|key| SecretString::from(key.to_string()))
            .ok_or_else(|| CredentialError::NoCredentials {
                host: host.hostname.clone(),
            })
    }
}

#[tokio::test]
async fn connector_probes_system_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .and(query_param("type", "op"))
        .and(header("X-PAN-KEY", KEY))
        .respond_with(xml(
            r#"<response status="success"><result><system>
                 <hostname>fw01</hostname><model>PA-440</model><sw-version>11.1.2</sw-version>
               </system></result></response>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;

    let connector = PanosConnector::new(StaticKey(Some(KEY)));
    let host = HostSpec::new("fw01", Url::parse(&server.uri()).unwrap());

    let device = connector.connect(&host, Some("vsys2")).await.unwrap();
    assert_eq!(device.vsys(), "vsys2");

    let device = connector.connect(&host, None).await.ok().unwrap();
    assert_eq!(device.vsys(), "vsys1");
}

#[tokio::test]
async fn connector_without_credentials_fails_before_any_request() {
    let server = MockServer::start().await;
    let connector = PanosConnector::new(StaticKey(None));
    let host = HostSpec::new("fw01", Url::parse(&server.uri()).unwrap());

    let err = connector.connect(&host, None).await.err().unwrap();
    assert!(matches!(err, ConnectError::Credential(CredentialError::NoCredentials { .. })));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn connector_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"<response status="error" code="403"><result><msg>Invalid Credential</msg></result></response>"#,
        ))
        .mount(&server)
        .await;

    let connector = PanosConnector::new(StaticKey(Some("stale")));
    let host = HostSpec::new("fw01", Url::parse(&server.uri()).unwrap());

    let err = connector.connect(&host, None).await.err().unwrap();
    assert!(matches!(
        err,
        ConnectError::Api {
            source: panconf_api::Error::InvalidApiKey,
            ..
        }
    ));
}
