// ── PAN-OS device adapter ──
//
// Implements `DeviceClient` over the XML API. Top-level types are read with
// one `show` per (container, type); child types are already inside the
// fetched entries, so reading them is local.

use panconf_api::XmlApiClient;
use secrecy::SecretString;
use tracing::{debug, info};

use crate::catalog::{Location, TypeDescriptor};
use crate::config::HostSpec;
use crate::context::Container;
use crate::device::{DeviceClient, Instance, Parent};
use crate::error::{ConnectError, CredentialError, DeviceError};
use crate::run::Connector;

const DEVICE_XPATH: &str = "/config/devices/entry[@name='localhost.localdomain']";
const SHARED_XPATH: &str = "/config/shared";
const DEFAULT_VSYS: &str = "vsys1";

/// Supplies the API key for a host.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self, host: &HostSpec) -> Result<SecretString, CredentialError>;
}

/// A live session with one firewall, scoped to one virtual system.
pub struct PanosDevice {
    client: XmlApiClient,
    vsys: String,
}

impl PanosDevice {
    pub fn new(client: XmlApiClient, vsys: impl Into<String>) -> Self {
        Self {
            client,
            vsys: vsys.into(),
        }
    }

    pub fn vsys(&self) -> &str {
        &self.vsys
    }

    fn vsys_xpath(&self) -> String {
        format!("{DEVICE_XPATH}/vsys/entry[@name='{}']", self.vsys)
    }

    /// The xpath of the element holding `ty`'s entries inside `container`.
    pub fn xpath(&self, container: Container, ty: &TypeDescriptor) -> Option<String> {
        let base = match (container, ty.location) {
            (Container::Firewall, Location::Vsys(_)) => self.vsys_xpath(),
            (Container::Firewall, Location::Device(_)) => DEVICE_XPATH.to_owned(),
            (Container::Rulebase, Location::Rulebase(_)) => format!("{}/rulebase", self.vsys_xpath()),
            (Container::Shared, Location::Vsys(_)) => SHARED_XPATH.to_owned(),
            _ => return None,
        };
        Some(format!("{base}/{}", ty.location.path()))
    }
}

impl DeviceClient for PanosDevice {
    async fn fetch_children(
        &self,
        parent: Parent<'_>,
        ty: &'static TypeDescriptor,
    ) -> Result<Vec<Instance>, DeviceError> {
        let container = match parent {
            Parent::Instance(instance) => return Ok(instance.children_of(ty)),
            Parent::Container(container) => container,
        };

        let xpath = self
            .xpath(container, ty)
            .ok_or(DeviceError::Placement {
                object_type: ty.name,
                container,
            })?;

        let result = self.client.show_config(&xpath).await?;
        let instances: Vec<Instance> = result
            .entries_at(ty.location.leaf())
            .into_iter()
            .map(|entry| Instance::from_element(ty, entry.clone()))
            .collect();

        debug!(object_type = ty.name, %container, count = instances.len(), "fetched");
        Ok(instances)
    }
}

/// Opens `PanosDevice` sessions, resolving credentials through `P`.
pub struct PanosConnector<P> {
    credentials: P,
}

impl<P: CredentialProvider> PanosConnector<P> {
    pub fn new(credentials: P) -> Self {
        Self { credentials }
    }
}

impl<P: CredentialProvider> Connector for PanosConnector<P> {
    type Client = PanosDevice;

    async fn connect(&self, host: &HostSpec, vsys: Option<&str>) -> Result<PanosDevice, ConnectError> {
        let api_key = self.credentials.api_key(host)?;
        let api_error = |source: panconf_api::Error| ConnectError::Api {
            url: host.url.to_string(),
            source,
        };

        let client = XmlApiClient::with_api_key(host.url.clone(), &api_key, &host.transport())
            .map_err(api_error)?;
        let system = client.system_info().await.map_err(api_error)?;

        debug!(
            host = %host.hostname,
            device_hostname = system.hostname.as_deref().unwrap_or("?"),
            model = system.model.as_deref().unwrap_or("?"),
            sw_version = system.sw_version.as_deref().unwrap_or("?"),
            "connected"
        );
        let vsys = vsys.unwrap_or(DEFAULT_VSYS);
        info!(host = %host.hostname, vsys, "session open");

        Ok(PanosDevice::new(client, vsys))
    }
}
