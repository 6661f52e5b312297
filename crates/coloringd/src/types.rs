//! Type definitions for coloringd.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Packet header field a switch color can be encoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Source MAC address
    DlSrc,
    /// Destination MAC address
    DlDst,
    /// Source IPv4 address
    NwSrc,
    /// Destination IPv4 address
    NwDst,
    /// Ingress port
    InPort,
    /// VLAN id
    DlVlan,
    /// Transport source port
    TpSrc,
    /// Transport destination port
    TpDst,
    /// IP type of service
    NwTos,
    /// IP protocol number
    NwProto,
}

impl FieldKind {
    /// Field name as used in flow match dictionaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::DlSrc => "dl_src",
            FieldKind::DlDst => "dl_dst",
            FieldKind::NwSrc => "nw_src",
            FieldKind::NwDst => "nw_dst",
            FieldKind::InPort => "in_port",
            FieldKind::DlVlan => "dl_vlan",
            FieldKind::TpSrc => "tp_src",
            FieldKind::TpDst => "tp_dst",
            FieldKind::NwTos => "nw_tos",
            FieldKind::NwProto => "nw_proto",
        }
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "dl_src" => FieldKind::DlSrc,
            "dl_dst" => FieldKind::DlDst,
            "nw_src" => FieldKind::NwSrc,
            "nw_dst" => FieldKind::NwDst,
            "in_port" => FieldKind::InPort,
            "dl_vlan" => FieldKind::DlVlan,
            "tp_src" => FieldKind::TpSrc,
            "tp_dst" => FieldKind::TpDst,
            "nw_tos" => FieldKind::NwTos,
            "nw_proto" => FieldKind::NwProto,
            other => return Err(format!("unknown color field '{}'", other)),
        })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A color encoded for a specific match field: textual for address-like
/// fields (MAC, IPv4), numeric for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Rendered address ("ee:ee:ee:ee:01:2c", "10.0.0.1")
    Text(String),
    /// Masked integer value
    Number(u64),
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorValue::Text(s) => f.write_str(s),
            ColorValue::Number(n) => write!(f, "{}", n),
        }
    }
}

/// OpenFlow protocol version of a switch, as advertised by the controller.
///
/// Selects the flow-encoding strategy and the controller-port sentinel.
/// Switches with an unsupported version are skipped by the reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfVersion {
    /// OpenFlow 1.0 ("0x01")
    Of10,
    /// OpenFlow 1.3 ("0x04")
    Of13,
    /// Any version tag we do not understand
    Unsupported,
}

impl OfVersion {
    /// Parses a controller version tag ("0x01", "0x04").
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "0x01" => OfVersion::Of10,
            "0x04" => OfVersion::Of13,
            _ => OfVersion::Unsupported,
        }
    }

    /// The OFPP_CONTROLLER sentinel for this version, or `None` when the
    /// version is unsupported and no flow should be attempted.
    pub fn controller_port(&self) -> Option<u32> {
        match self {
            OfVersion::Of10 => Some(0xfffd),
            OfVersion::Of13 => Some(0xffff_fffd),
            OfVersion::Unsupported => None,
        }
    }
}

/// A single action in a flow descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum FlowAction {
    /// Forward matching packets out of a port.
    Output {
        /// Destination port number.
        port: u32,
    },
}

/// A forwarding rule ready to be pushed to a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDescriptor {
    /// Flow table the rule is installed into.
    pub table_id: u8,
    /// Rule priority; probe flows must outrank ordinary traffic rules.
    pub priority: u16,
    /// Match dictionary, field name to encoded color.
    #[serde(rename = "match")]
    pub match_fields: BTreeMap<String, ColorValue>,
    /// Actions applied to matching packets.
    pub actions: Vec<FlowAction>,
}

/// Opaque handle identifying a flow acknowledged by the flow manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowHandle(pub String);

impl fmt::Display for FlowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An undirected link between two switches. Both endpoints may be the same
/// switch (self-link).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Datapath id of the first endpoint.
    pub endpoint_a: String,
    /// Datapath id of the second endpoint.
    pub endpoint_b: String,
}

impl Link {
    /// Creates a link between two datapath ids.
    pub fn new(endpoint_a: impl Into<String>, endpoint_b: impl Into<String>) -> Self {
        Self {
            endpoint_a: endpoint_a.into(),
            endpoint_b: endpoint_b.into(),
        }
    }
}

/// A switch known to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchInfo {
    /// Datapath id.
    pub dpid: String,
    /// OpenFlow version advertised for this switch.
    #[serde(with = "of_version_tag")]
    pub of_version: OfVersion,
}

impl SwitchInfo {
    /// Creates switch info from a dpid and a version tag.
    pub fn new(dpid: impl Into<String>, version_tag: &str) -> Self {
        Self {
            dpid: dpid.into(),
            of_version: OfVersion::from_tag(version_tag),
        }
    }
}

/// One consistent view of the topology: the controller's switch registry
/// plus the current link list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyView {
    /// Currently known switches.
    pub switches: Vec<SwitchInfo>,
    /// Current links.
    pub links: Vec<Link>,
}

mod of_version_tag {
    use super::OfVersion;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &OfVersion, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(match v {
            OfVersion::Of10 => "0x01",
            OfVersion::Of13 => "0x04",
            OfVersion::Unsupported => "unsupported",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<OfVersion, D::Error> {
        let tag = String::deserialize(de)?;
        Ok(OfVersion::from_tag(&tag))
    }
}
