// ── Per-host extraction context ──

use std::collections::HashMap;
use std::fmt;

/// A root container of the PAN-OS config tree that top-level types are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// The firewall itself, scoped to the selected virtual system.
    Firewall,
    /// The security/NAT rulebase of the selected virtual system.
    Rulebase,
    /// Objects shared by every virtual system.
    Shared,
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Firewall => "firewall",
            Self::Rulebase => "rulebase",
            Self::Shared => "shared",
        })
    }
}

/// Everything an extraction needs to know about one connected (host, vsys) pair.
///
/// Owns the device session and the relation table that maps schema
/// `parent` names onto containers.
pub struct HostContext<C> {
    pub host: String,
    pub vsys: String,
    pub client: C,
    /// Omit fields whose value is absent instead of emitting `null`.
    pub drop_absent: bool,
    containers: HashMap<String, Container>,
}

impl<C> HostContext<C> {
    pub fn new(host: impl Into<String>, vsys: impl Into<String>, client: C) -> Self {
        let containers = [
            ("firewall", Container::Firewall),
            ("device", Container::Firewall),
            ("vsys", Container::Firewall),
            ("rulebase", Container::Rulebase),
            ("shared", Container::Shared),
        ]
        .into_iter()
        .map(|(name, container)| (name.to_owned(), container))
        .collect();

        Self {
            host: host.into(),
            vsys: vsys.into(),
            client,
            drop_absent: true,
            containers,
        }
    }

    pub fn with_drop_absent(mut self, drop_absent: bool) -> Self {
        self.drop_absent = drop_absent;
        self
    }

    /// Resolve a schema parent relation to a container, if this host defines it.
    pub fn resolve(&self, relation: &str) -> Option<Container> {
        self.containers.get(relation).copied()
    }

    /// Remove a relation, e.g. when a device has no shared scope.
    pub fn without_relation(mut self, relation: &str) -> Self {
        self.containers.remove(relation);
        self
    }
}
