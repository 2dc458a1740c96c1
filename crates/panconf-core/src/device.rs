// ── Device abstraction ──
//
// `DeviceClient` is the only way the engine talks to an appliance.
// `PanosDevice` implements it over the XML API; tests use an in-memory map.

use std::future::Future;

use panconf_api::XmlElement;

use crate::catalog::{self, Location, TypeDescriptor};
use crate::context::Container;
use crate::error::DeviceError;
use crate::record::Value;

/// One object read from the device, with the child objects nested inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    descriptor: &'static TypeDescriptor,
    element: XmlElement,
    children: Vec<Instance>,
}

impl Instance {
    /// Build an instance from its `<entry>` element, materializing every
    /// catalog child type found inside it.
    pub fn from_element(descriptor: &'static TypeDescriptor, element: XmlElement) -> Self {
        let children = descriptor
            .children
            .iter()
            .filter_map(|name| catalog::lookup(name))
            .flat_map(|child_ty| {
                element
                    .entries_at(child_ty.location.path())
                    .into_iter()
                    .map(move |entry| Self::from_element(child_ty, entry.clone()))
            })
            .collect();

        Self {
            descriptor,
            element,
            children,
        }
    }

    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    pub fn name(&self) -> Option<&str> {
        self.element.entry_name()
    }

    /// Read a field through its catalog accessor. Unknown fields read as null.
    pub fn field(&self, name: &str) -> Value {
        self.descriptor
            .field(name)
            .map_or(Value::Null, |spec| spec.source.read(&self.element))
    }

    /// Every child instance, of any type.
    pub fn children(&self) -> &[Instance] {
        &self.children
    }

    /// Child instances of exactly `ty`.
    pub fn children_of(&self, ty: &TypeDescriptor) -> Vec<Instance> {
        self.children
            .iter()
            .filter(|child| child.descriptor.is(ty))
            .cloned()
            .collect()
    }
}

/// What to fetch children from.
#[derive(Debug, Clone, Copy)]
pub enum Parent<'a> {
    Container(Container),
    Instance(&'a Instance),
}

/// The seam to a live (or simulated) device.
pub trait DeviceClient: Send + Sync {
    /// All instances of `ty` directly under `parent`, in device order.
    fn fetch_children(
        &self,
        parent: Parent<'_>,
        ty: &'static TypeDescriptor,
    ) -> impl Future<Output = Result<Vec<Instance>, DeviceError>> + Send;
}

/// Whether `ty` can be read directly from `container`.
pub fn placement_allowed(ty: &TypeDescriptor, container: Container) -> bool {
    matches!(
        (container, ty.location),
        (Container::Firewall, Location::Vsys(_) | Location::Device(_))
            | (Container::Rulebase, Location::Rulebase(_))
            | (Container::Shared, Location::Vsys(_))
    )
}
