// Shared test doubles: an in-memory device and connector.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use panconf_api::XmlElement;
use panconf_core::catalog::{self, TypeDescriptor};
use panconf_core::device::placement_allowed;
use panconf_core::{
    ConnectError, Connector, Container, CredentialError, DeviceClient, DeviceError, HostSpec,
    Instance, Parent,
};

// ── Instance builders ───────────────────────────────────────────────

pub fn ty(name: &str) -> &'static TypeDescriptor {
    catalog::lookup(name).unwrap()
}

pub fn entry(name: &str) -> XmlElement {
    XmlElement::new("entry").with_attr("name", name)
}

pub fn text(tag: &str, value: &str) -> XmlElement {
    XmlElement::new(tag).with_text(value)
}

pub fn address(name: &str, value: &str) -> Instance {
    Instance::from_element(ty("AddressObject"), entry(name).with_child(text("ip-netmask", value)))
}

pub fn security_rule(name: &str) -> Instance {
    Instance::from_element(ty("SecurityRule"), entry(name).with_child(text("action", "allow")))
}

/// A log forwarding profile with one match list per name.
pub fn log_profile(name: &str, match_lists: &[&str]) -> Instance {
    let mut lists = XmlElement::new("match-list");
    for list in match_lists {
        lists = lists.with_child(entry(list).with_child(text("log-type", "traffic")));
    }
    Instance::from_element(ty("LogForwardingProfile"), entry(name).with_child(lists))
}

/// A virtual router with one static route per `(name, destination)`.
pub fn virtual_router(name: &str, routes: &[(&str, &str)]) -> Instance {
    let mut static_route = XmlElement::new("static-route");
    for (route, destination) in routes {
        static_route = static_route.with_child(entry(route).with_child(text("destination", destination)));
    }
    let table = XmlElement::new("routing-table")
        .with_child(XmlElement::new("ip").with_child(static_route));
    Instance::from_element(ty("VirtualRouter"), entry(name).with_child(table))
}

pub fn vsys(name: &str) -> Instance {
    Instance::from_element(ty("Vsys"), entry(name))
}

// ── MockDevice ──────────────────────────────────────────────────────

/// Serves fixed instances per (container, type) and counts every fetch.
#[derive(Clone, Default)]
pub struct MockDevice {
    top: HashMap<(Container, &'static str), Vec<Instance>>,
    failing: HashSet<&'static str>,
    calls: Arc<AtomicUsize>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, container: Container, type_name: &str, instances: Vec<Instance>) -> Self {
        self.top.insert((container, ty(type_name).name), instances);
        self
    }

    /// Every fetch of `type_name` fails with an API error.
    pub fn failing(mut self, type_name: &str) -> Self {
        self.failing.insert(ty(type_name).name);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DeviceClient for MockDevice {
    async fn fetch_children(
        &self,
        parent: Parent<'_>,
        ty: &'static TypeDescriptor,
    ) -> Result<Vec<Instance>, DeviceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(ty.name) {
            return Err(DeviceError::Api(panconf_api::Error::Api {
                message: format!("simulated failure reading {}", ty.name),
                code: Some(13),
            }));
        }

        match parent {
            Parent::Instance(instance) => Ok(instance.children_of(ty)),
            Parent::Container(container) if placement_allowed(ty, container) => Ok(self
                .top
                .get(&(container, ty.name))
                .cloned()
                .unwrap_or_default()),
            Parent::Container(container) => Err(DeviceError::Placement {
                object_type: ty.name,
                container,
            }),
        }
    }
}

// ── MockConnector ───────────────────────────────────────────────────

/// Hands out a clone of the host's `MockDevice`; unknown hosts fail to connect.
#[derive(Default)]
pub struct MockConnector {
    devices: HashMap<String, MockDevice>,
    connects: Mutex<Vec<(String, Option<String>)>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, hostname: &str, device: MockDevice) -> Self {
        self.devices.insert(hostname.to_owned(), device);
        self
    }

    /// Every `(host, vsys selector)` passed to `connect`, in call order.
    pub fn connects(&self) -> Vec<(String, Option<String>)> {
        self.connects.lock().unwrap().clone()
    }
}

impl Connector for MockConnector {
    type Client = MockDevice;

    async fn connect(&self, host: &HostSpec, vsys: Option<&str>) -> Result<MockDevice, ConnectError> {
        self.connects
            .lock()
            .unwrap()
            .push((host.hostname.clone(), vsys.map(str::to_owned)));

        self.devices.get(&host.hostname).cloned().ok_or_else(|| {
            ConnectError::Credential(CredentialError::NoCredentials {
                host: host.hostname.clone(),
            })
        })
    }
}

pub fn host(hostname: &str) -> HostSpec {
    HostSpec::new(
        hostname,
        url::Url::parse(&format!("https://{hostname}")).unwrap(),
    )
}
