// ── Type catalog ──
//
// Every PAN-OS object type panconf can export, with its location in the
// config tree, its field accessors, and the child types nested inside it.
// The schema refers to these by `class` name; unknown names are rejected
// at schema load.

use std::fmt;

use panconf_api::XmlElement;

use crate::record::Value;

/// Where entries of a type live, relative to the container they are read from.
///
/// The path names the element whose `<entry>` children are the instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Under a virtual system (or `shared`), e.g. `address`.
    Vsys(&'static str),
    /// Under the device root, e.g. `network/interface/ethernet`.
    Device(&'static str),
    /// Under a vsys rulebase, e.g. `security/rules`.
    Rulebase(&'static str),
    /// Under another instance of a parent type.
    Child(&'static str),
}

impl Location {
    pub fn path(self) -> &'static str {
        match self {
            Self::Vsys(p) | Self::Device(p) | Self::Rulebase(p) | Self::Child(p) => p,
        }
    }

    /// The tag of the element holding the entries (last path segment).
    pub fn leaf(self) -> &'static str {
        let path = self.path();
        path.rsplit('/').next().unwrap_or(path)
    }
}

/// How a field value is read off an `<entry>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The entry's `name` attribute.
    Name,
    /// Another attribute of the entry itself.
    Attr(&'static str),
    /// Text at a child path.
    Text(&'static str),
    /// Integer text at a child path.
    Int(&'static str),
    /// `yes`/`no` text at a child path.
    YesNo(&'static str),
    /// `<member>` texts under a child path.
    Members(&'static str),
    /// `<member>` texts under the first of several child paths that exists.
    FirstMembers(&'static [&'static str]),
    /// Text of the first of several child paths that has text.
    Choice(&'static [&'static str]),
    /// Which of several tags is present under a child path (`""` = the entry).
    ChoiceTag(&'static str, &'static [&'static str]),
    /// `name` attributes of the `<entry>` children under a child path.
    Entries(&'static str),
}

impl Source {
    /// Read this field from `entry`. Anything not present reads as [`Value::Null`].
    pub fn read(self, entry: &XmlElement) -> Value {
        match self {
            Self::Name => entry.entry_name().into(),
            Self::Attr(name) => entry.attr(name).into(),
            Self::Text(path) => entry.text_at(path).into(),
            Self::Int(path) => match entry.text_at(path) {
                Some(text) => text
                    .trim()
                    .parse::<i64>()
                    .map_or_else(|_| Value::from(text), Value::Int),
                None => Value::Null,
            },
            Self::YesNo(path) => match entry.text_at(path) {
                Some("yes") => Value::Bool(true),
                Some("no") => Value::Bool(false),
                other => other.into(),
            },
            Self::Members(path) => entry.find(path).map_or(Value::Null, members),
            Self::FirstMembers(paths) => paths
                .iter()
                .find_map(|path| entry.find(path))
                .map_or(Value::Null, members),
            Self::Choice(paths) => paths.iter().find_map(|path| entry.text_at(path)).into(),
            Self::ChoiceTag(path, tags) => entry
                .find(path)
                .and_then(|node| tags.iter().copied().find(|tag| node.child(tag).is_some()))
                .into(),
            Self::Entries(path) => {
                let names: Vec<Value> = entry
                    .entries_at(path)
                    .into_iter()
                    .filter_map(|e| e.entry_name().map(Value::from))
                    .collect();
                if names.is_empty() {
                    Value::Null
                } else {
                    Value::List(names)
                }
            }
        }
    }
}

fn members(node: &XmlElement) -> Value {
    let list: Vec<Value> = node
        .children_named("member")
        .filter_map(|m| m.text().map(Value::from))
        .collect();
    if list.is_empty() {
        Value::Null
    } else {
        Value::List(list)
    }
}

/// A named field accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub source: Source,
}

const fn field(name: &'static str, source: Source) -> FieldSpec {
    FieldSpec { name, source }
}

/// One exportable object type.
#[derive(Debug, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub location: Location,
    pub fields: &'static [FieldSpec],
    /// Catalog names of the types nested inside instances of this type.
    pub children: &'static [&'static str],
}

impl TypeDescriptor {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether `child` is declared as nested inside this type.
    pub fn has_child_type(&self, child: &TypeDescriptor) -> bool {
        self.children.contains(&child.name)
    }

    /// Type identity: descriptors are equal by catalog name.
    pub fn is(&self, other: &TypeDescriptor) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Look up a type by catalog name.
pub fn lookup(name: &str) -> Option<&'static TypeDescriptor> {
    CATALOG.iter().find(|t| t.name == name)
}

/// All known types.
pub fn all() -> &'static [TypeDescriptor] {
    CATALOG
}

// ── Shared field sets ───────────────────────────────────────────────

const ADDRESS_KINDS: &[&str] = &["ip-netmask", "ip-range", "fqdn", "ip-wildcard"];
const ZONE_MODES: &[&str] = &[
    "layer3",
    "layer2",
    "virtual-wire",
    "tap",
    "tunnel",
    "external",
];
const ZONE_MODE_PATHS: &[&str] = &[
    "network/layer3",
    "network/layer2",
    "network/virtual-wire",
    "network/tap",
    "network/external",
];
const INTERFACE_MODES: &[&str] = &[
    "layer3",
    "layer2",
    "virtual-wire",
    "tap",
    "ha",
    "decrypt-mirror",
    "aggregate-group",
];

// ── Catalog ─────────────────────────────────────────────────────────

static CATALOG: &[TypeDescriptor] = &[
    // Objects
    TypeDescriptor {
        name: "AddressObject",
        location: Location::Vsys("address"),
        fields: &[
            field("name", Source::Name),
            field("value", Source::Choice(ADDRESS_KINDS)),
            field("type", Source::ChoiceTag("", ADDRESS_KINDS)),
            field("description", Source::Text("description")),
            field("tag", Source::Members("tag")),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "AddressGroup",
        location: Location::Vsys("address-group"),
        fields: &[
            field("name", Source::Name),
            field("static_value", Source::Members("static")),
            field("dynamic_value", Source::Text("dynamic/filter")),
            field("description", Source::Text("description")),
            field("tag", Source::Members("tag")),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "ServiceObject",
        location: Location::Vsys("service"),
        fields: &[
            field("name", Source::Name),
            field("protocol", Source::ChoiceTag("protocol", &["tcp", "udp", "sctp"])),
            field(
                "source_port",
                Source::Choice(&[
                    "protocol/tcp/source-port",
                    "protocol/udp/source-port",
                    "protocol/sctp/source-port",
                ]),
            ),
            field(
                "destination_port",
                Source::Choice(&["protocol/tcp/port", "protocol/udp/port", "protocol/sctp/port"]),
            ),
            field("description", Source::Text("description")),
            field("tag", Source::Members("tag")),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "ServiceGroup",
        location: Location::Vsys("service-group"),
        fields: &[
            field("name", Source::Name),
            field("value", Source::Members("members")),
            field("tag", Source::Members("tag")),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "Tag",
        location: Location::Vsys("tag"),
        fields: &[
            field("name", Source::Name),
            field("color", Source::Text("color")),
            field("comments", Source::Text("comments")),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "ApplicationGroup",
        location: Location::Vsys("application-group"),
        fields: &[
            field("name", Source::Name),
            field("value", Source::Members("members")),
            field("tag", Source::Members("tag")),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "Zone",
        location: Location::Vsys("zone"),
        fields: &[
            field("name", Source::Name),
            field("mode", Source::ChoiceTag("network", ZONE_MODES)),
            field("interface", Source::FirstMembers(ZONE_MODE_PATHS)),
            field(
                "zone_profile",
                Source::Text("network/zone-protection-profile"),
            ),
            field("log_setting", Source::Text("network/log-setting")),
            field(
                "enable_user_identification",
                Source::YesNo("enable-user-identification"),
            ),
            field("include_acl", Source::Members("user-acl/include-list")),
            field("exclude_acl", Source::Members("user-acl/exclude-list")),
        ],
        children: &[],
    },
    // Policies
    TypeDescriptor {
        name: "SecurityRule",
        location: Location::Rulebase("security/rules"),
        fields: &[
            field("name", Source::Name),
            field("uuid", Source::Attr("uuid")),
            field("fromzone", Source::Members("from")),
            field("tozone", Source::Members("to")),
            field("source", Source::Members("source")),
            field("source_user", Source::Members("source-user")),
            field("hip_profiles", Source::Members("hip-profiles")),
            field("destination", Source::Members("destination")),
            field("application", Source::Members("application")),
            field("service", Source::Members("service")),
            field("category", Source::Members("category")),
            field("action", Source::Text("action")),
            field("log_setting", Source::Text("log-setting")),
            field("log_start", Source::YesNo("log-start")),
            field("log_end", Source::YesNo("log-end")),
            field("description", Source::Text("description")),
            field("type", Source::Text("rule-type")),
            field("tag", Source::Members("tag")),
            field("negate_source", Source::YesNo("negate-source")),
            field("negate_destination", Source::YesNo("negate-destination")),
            field("disabled", Source::YesNo("disabled")),
            field("schedule", Source::Text("schedule")),
            field("icmp_unreachable", Source::YesNo("icmp-unreachable")),
            field(
                "disable_server_response_inspection",
                Source::YesNo("option/disable-server-response-inspection"),
            ),
            field("group", Source::Members("profile-setting/group")),
            field("virus", Source::Members("profile-setting/profiles/virus")),
            field("spyware", Source::Members("profile-setting/profiles/spyware")),
            field(
                "vulnerability",
                Source::Members("profile-setting/profiles/vulnerability"),
            ),
            field(
                "url_filtering",
                Source::Members("profile-setting/profiles/url-filtering"),
            ),
            field(
                "file_blocking",
                Source::Members("profile-setting/profiles/file-blocking"),
            ),
            field(
                "wildfire_analysis",
                Source::Members("profile-setting/profiles/wildfire-analysis"),
            ),
            field(
                "data_filtering",
                Source::Members("profile-setting/profiles/data-filtering"),
            ),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "NatRule",
        location: Location::Rulebase("nat/rules"),
        fields: &[
            field("name", Source::Name),
            field("uuid", Source::Attr("uuid")),
            field("description", Source::Text("description")),
            field("nat_type", Source::Text("nat-type")),
            field("fromzone", Source::Members("from")),
            field("tozone", Source::Members("to")),
            field("to_interface", Source::Text("to-interface")),
            field("service", Source::Text("service")),
            field("source", Source::Members("source")),
            field("destination", Source::Members("destination")),
            field(
                "source_translation_type",
                Source::ChoiceTag(
                    "source-translation",
                    &["dynamic-ip-and-port", "dynamic-ip", "static-ip"],
                ),
            ),
            field(
                "source_translation_address_type",
                Source::ChoiceTag(
                    "source-translation/dynamic-ip-and-port",
                    &["translated-address", "interface-address"],
                ),
            ),
            field(
                "source_translation_translated_addresses",
                Source::FirstMembers(&[
                    "source-translation/dynamic-ip-and-port/translated-address",
                    "source-translation/dynamic-ip/translated-address",
                ]),
            ),
            field(
                "source_translation_interface",
                Source::Text("source-translation/dynamic-ip-and-port/interface-address/interface"),
            ),
            field(
                "source_translation_static_translated_address",
                Source::Text("source-translation/static-ip/translated-address"),
            ),
            field(
                "source_translation_static_bi_directional",
                Source::YesNo("source-translation/static-ip/bi-directional"),
            ),
            field(
                "destination_translated_address",
                Source::Text("destination-translation/translated-address"),
            ),
            field(
                "destination_translated_port",
                Source::Int("destination-translation/translated-port"),
            ),
            field("disabled", Source::YesNo("disabled")),
            field("tag", Source::Members("tag")),
        ],
        children: &[],
    },
    // Log forwarding
    TypeDescriptor {
        name: "LogForwardingProfile",
        location: Location::Vsys("log-settings/profiles"),
        fields: &[
            field("name", Source::Name),
            field("description", Source::Text("description")),
            field(
                "enhanced_logging",
                Source::YesNo("enhanced-application-logging"),
            ),
        ],
        children: &["LogForwardingProfileMatchList"],
    },
    TypeDescriptor {
        name: "LogForwardingProfileMatchList",
        location: Location::Child("match-list"),
        fields: &[
            field("name", Source::Name),
            field("description", Source::Text("action-desc")),
            field("log_type", Source::Text("log-type")),
            field("filter", Source::Text("filter")),
            field("send_to_panorama", Source::YesNo("send-to-panorama")),
            field("snmp_profiles", Source::Members("send-snmptrap")),
            field("email_profiles", Source::Members("send-email")),
            field("syslog_profiles", Source::Members("send-syslog")),
            field("http_profiles", Source::Members("send-http")),
        ],
        children: &[],
    },
    // Network
    TypeDescriptor {
        name: "VirtualRouter",
        location: Location::Device("network/virtual-router"),
        fields: &[
            field("name", Source::Name),
            field("interface", Source::Members("interface")),
            field("ecmp_enable", Source::YesNo("ecmp/enable")),
            field("ad_static", Source::Int("admin-dists/static")),
            field("ad_static_ipv6", Source::Int("admin-dists/static-ipv6")),
            field("ad_ospf_int", Source::Int("admin-dists/ospf-int")),
            field("ad_ospf_ext", Source::Int("admin-dists/ospf-ext")),
            field("ad_ibgp", Source::Int("admin-dists/ibgp")),
            field("ad_ebgp", Source::Int("admin-dists/ebgp")),
        ],
        children: &["StaticRoute"],
    },
    TypeDescriptor {
        name: "StaticRoute",
        location: Location::Child("routing-table/ip/static-route"),
        fields: &[
            field("name", Source::Name),
            field("destination", Source::Text("destination")),
            field(
                "nexthop_type",
                Source::ChoiceTag("nexthop", &["ip-address", "discard", "next-vr", "fqdn"]),
            ),
            field(
                "nexthop",
                Source::Choice(&["nexthop/ip-address", "nexthop/next-vr", "nexthop/fqdn"]),
            ),
            field("interface", Source::Text("interface")),
            field("admin_dist", Source::Int("admin-dist")),
            field("metric", Source::Int("metric")),
        ],
        children: &[],
    },
    TypeDescriptor {
        name: "EthernetInterface",
        location: Location::Device("network/interface/ethernet"),
        fields: &[
            field("name", Source::Name),
            field("mode", Source::ChoiceTag("", INTERFACE_MODES)),
            field("ip", Source::Entries("layer3/ip")),
            field("ipv6_enabled", Source::YesNo("layer3/ipv6/enabled")),
            field(
                "management_profile",
                Source::Text("layer3/interface-management-profile"),
            ),
            field("mtu", Source::Int("layer3/mtu")),
            field("adjust_tcp_mss", Source::YesNo("layer3/adjust-tcp-mss/enable")),
            field("netflow_profile", Source::Text("layer3/netflow-profile")),
            field("aggregate_group", Source::Text("aggregate-group")),
            field("link_speed", Source::Text("link-speed")),
            field("link_duplex", Source::Text("link-duplex")),
            field("link_state", Source::Text("link-state")),
            field("comment", Source::Text("comment")),
        ],
        children: &["Layer3Subinterface"],
    },
    TypeDescriptor {
        name: "Layer3Subinterface",
        location: Location::Child("layer3/units"),
        fields: &[
            field("name", Source::Name),
            field("tag", Source::Int("tag")),
            field("ip", Source::Entries("ip")),
            field(
                "management_profile",
                Source::Text("interface-management-profile"),
            ),
            field("mtu", Source::Int("mtu")),
            field("comment", Source::Text("comment")),
        ],
        children: &[],
    },
    // Device
    TypeDescriptor {
        name: "Vsys",
        location: Location::Device("vsys"),
        fields: &[
            field("name", Source::Name),
            field("display_name", Source::Text("display-name")),
            field("interface", Source::Members("import/network/interface")),
            field("visible_vsys", Source::Members("import/visible-vsys")),
            field("dns_proxy", Source::Text("import/dns-proxy")),
        ],
        children: &[],
    },
];
