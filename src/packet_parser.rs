//! Link-layer detection for captured frames.
//!
//! Captures may hand us Ethernet frames (optionally 802.1Q tagged), bare IP
//! packets (tunnels, some pcaps) or BSD loopback frames with a 4-byte NULL
//! header. Each is tried in turn.
use pnet::packet::ethernet::{EtherType, EtherTypes, EthernetPacket};
use pnet::packet::ipv4::Ipv4Packet;
use pnet::packet::ipv6::Ipv6Packet;
use pnet::packet::vlan::VlanPacket;

const ETHERNET_HEADER_LEN: usize = 14;
/// 802.1Q tag: priority/VLAN id plus the inner EtherType
const VLAN_HEADER_LEN: usize = 4;
const NULL_HEADER_LEN: usize = 4;
const MIN_IPV4_LEN: usize = 20;

/// IP layer of a captured frame
#[derive(Debug)]
pub enum IpPacket<'a> {
    Ipv4(Ipv4Packet<'a>),
    Ipv6(Ipv6Packet<'a>),
}

/// Link-layer framing the IP packet was found under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatalinkFormat {
    Ethernet,
    RawIp,
    Null,
}

/// Locate the IP packet inside a captured frame.
pub fn parse_frame(frame: &[u8]) -> Option<(DatalinkFormat, IpPacket<'_>)> {
    if let Some(ip) = ethernet_payload(frame) {
        return Some((DatalinkFormat::Ethernet, ip));
    }
    if let Some(ip) = ip_by_version(frame) {
        return Some((DatalinkFormat::RawIp, ip));
    }
    null_payload(frame).map(|ip| (DatalinkFormat::Null, ip))
}

fn ethernet_payload(frame: &[u8]) -> Option<IpPacket<'_>> {
    let ethernet = EthernetPacket::new(frame)?;
    visit_ethernet(ethernet.get_ethertype(), frame.get(ETHERNET_HEADER_LEN..)?)
}

fn visit_ethernet(ethertype: EtherType, data: &[u8]) -> Option<IpPacket<'_>> {
    match ethertype {
        // stacked tags are peeled one at a time
        EtherTypes::Vlan | EtherTypes::PBridge | EtherTypes::QinQ => {
            let vlan = VlanPacket::new(data)?;
            visit_ethernet(vlan.get_ethertype(), data.get(VLAN_HEADER_LEN..)?)
        }
        EtherTypes::Ipv4 if ip_version(data) == Some(4) => {
            Ipv4Packet::new(data).map(IpPacket::Ipv4)
        }
        EtherTypes::Ipv6 if ip_version(data) == Some(6) => {
            Ipv6Packet::new(data).map(IpPacket::Ipv6)
        }
        _ => None,
    }
}

fn null_payload(frame: &[u8]) -> Option<IpPacket<'_>> {
    match frame {
        [0x1e, 0x00, ..] | [0x02, 0x00, ..] => ip_by_version(frame.get(NULL_HEADER_LEN..)?),
        _ => None,
    }
}

fn ip_by_version(data: &[u8]) -> Option<IpPacket<'_>> {
    if data.len() < MIN_IPV4_LEN {
        return None;
    }
    match ip_version(data)? {
        4 => Ipv4Packet::new(data).map(IpPacket::Ipv4),
        6 => Ipv6Packet::new(data).map(IpPacket::Ipv6),
        _ => None,
    }
}

fn ip_version(data: &[u8]) -> Option<u8> {
    data.first().map(|b| b >> 4)
}
