// PAN-OS XML API HTTP client
//
// Wraps `reqwest::Client` with the `/api/` endpoint, `X-PAN-KEY` header
// injection, and `<response status="...">` envelope unwrapping. Endpoint
// groups (key generation) live in separate files as inherent methods so
// this module stays focused on transport mechanics.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::xml::{self, XmlElement};

/// Raw HTTP client for the PAN-OS XML API.
///
/// Every method returns the unwrapped `<result>` element; the
/// `<response>` envelope is checked and stripped before the caller
/// sees it.
pub struct XmlApiClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Identity reported by `show system info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemInfo {
    pub hostname: Option<String>,
    pub model: Option<String>,
    pub serial: Option<String>,
    pub sw_version: Option<String>,
    pub multi_vsys: bool,
}

impl XmlApiClient {
    /// Create a client without credentials (key generation only).
    ///
    /// `base_url` is the management interface root, e.g. `https://fw01.example.net`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client that authenticates every request with an API key.
    pub fn with_api_key(
        base_url: Url,
        api_key: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut value = HeaderValue::from_str(api_key.expose_secret())
            .map_err(|_| Error::InvalidApiKey)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-PAN-KEY", value);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, base_url })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// `{base}/api/`
    pub(crate) fn api_url(&self) -> Result<Url, Error> {
        Ok(self.base_url.join("/api/")?)
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Read a node of the running configuration.
    ///
    /// `GET /api/?type=config&action=show&xpath={xpath}`
    ///
    /// Returns the `<result>` element. A node that does not exist (error
    /// code 7) yields an empty `<result/>` rather than an error.
    pub async fn show_config(&self, xpath: &str) -> Result<XmlElement, Error> {
        debug!(xpath, "show config");
        match self
            .get(&[("type", "config"), ("action", "show"), ("xpath", xpath)])
            .await
        {
            Err(e) if e.is_no_such_node() => {
                trace!(xpath, "no such node");
                Ok(XmlElement::new("result"))
            }
            other => other,
        }
    }

    /// Run an operational command, e.g. `<show><system><info></info></system></show>`.
    pub async fn op(&self, cmd: &str) -> Result<XmlElement, Error> {
        debug!(cmd, "op command");
        self.get(&[("type", "op"), ("cmd", cmd)]).await
    }

    /// `show system info`, used as the connection probe.
    pub async fn system_info(&self) -> Result<SystemInfo, Error> {
        let result = self
            .op("<show><system><info></info></system></show>")
            .await?;
        let system = result
            .child("system")
            .ok_or_else(|| Error::UnexpectedResponse("missing <system> in system info".into()))?;

        let text = |tag: &str| system.text_at(tag).map(String::from);
        Ok(SystemInfo {
            hostname: text("hostname"),
            model: text("model"),
            serial: text("serial"),
            sw_version: text("sw-version"),
            multi_vsys: system.text_at("multi-vsys") == Some("on"),
        })
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get(&self, query: &[(&str, &str)]) -> Result<XmlElement, Error> {
        let url = self.api_url()?;
        trace!("GET {url}");
        let resp = self.http.get(url).query(query).send().await?;
        parse_envelope(resp).await
    }
}

/// Check the `<response status="...">` envelope, returning `<result>` on
/// success or the mapped error otherwise.
pub(crate) async fn parse_envelope(resp: reqwest::Response) -> Result<XmlElement, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    let root = match xml::parse(&body) {
        Ok(root) if root.name == "response" => root,
        Ok(_) | Err(_) if !status.is_success() => {
            if status == reqwest::StatusCode::FORBIDDEN {
                return Err(Error::InvalidApiKey);
            }
            return Err(Error::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }
        Ok(other) => {
            return Err(Error::UnexpectedResponse(format!(
                "expected <response>, got <{}>",
                other.name
            )));
        }
        Err(e) => return Err(e),
    };

    if root.attr("status") == Some("success") {
        return Ok(root
            .child("result")
            .cloned()
            .unwrap_or_else(|| XmlElement::new("result")));
    }

    let code = root.attr("code").and_then(|c| c.parse::<u16>().ok());
    if code == Some(403) || status == reqwest::StatusCode::FORBIDDEN {
        return Err(Error::InvalidApiKey);
    }
    Err(Error::Api {
        message: error_message(&root),
        code,
    })
}

/// PAN-OS puts error text in `msg`, `msg/line`, or `result/msg`.
fn error_message(root: &XmlElement) -> String {
    let Some(msg) = root.child("msg").or_else(|| root.find("result/msg")) else {
        return "unknown error".into();
    };

    let lines: Vec<&str> = msg
        .children_named("line")
        .filter_map(|line| line.text().or_else(|| line.children.first()?.text()))
        .collect();

    if lines.is_empty() {
        msg.text().unwrap_or("unknown error").to_owned()
    } else {
        lines.join("; ")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn error_message_joins_lines() {
        let root = xml::parse(
            r#"<response status="error"><msg><line>first</line><line><![CDATA[second]]></line></msg></response>"#,
        )
        .unwrap();
        assert_eq!(error_message(&root), "first; second");
    }

    #[test]
    fn error_message_reads_result_msg() {
        let root = xml::parse(
            r#"<response status="error" code="400"><result><msg>Bad xpath</msg></result></response>"#,
        )
        .unwrap();
        assert_eq!(error_message(&root), "Bad xpath");
    }

    #[test]
    fn error_message_defaults() {
        let root = xml::parse(r#"<response status="error"/>"#).unwrap();
        assert_eq!(error_message(&root), "unknown error");
    }
}
