use crate::error::{DropReason, Ja3Error};
use crate::filter::PortFilter;
use crate::ja3::Ja3Fingerprint;
use crate::output::{FingerprintRecord, FlowMeta, IpPort};
use crate::packet_parser::{parse_frame, IpPacket};
use crate::tls::{is_tls_traffic, split_records};
use pnet::packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet::packet::tcp::TcpPacket;
use pnet::packet::Packet;
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use tracing::debug;

/// Everything one captured frame produced
#[derive(Debug, Default)]
pub struct PacketOutcome {
    /// Fingerprints of every ClientHello that decoded cleanly
    pub records: Vec<FingerprintRecord>,
    /// Records or payloads that were dropped, one entry each
    pub dropped: Vec<Ja3Error>,
}

impl PacketOutcome {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.dropped.is_empty()
    }
}

/// Fingerprint every ClientHello found in one TCP payload.
///
/// The payload may hold several TLS records. A payload whose record framing is
/// incomplete is dropped as a whole; otherwise each ClientHello record is decoded
/// on its own and a malformed one does not affect its neighbours.
pub fn process_tls_payload(payload: &[u8], flow: &FlowMeta) -> PacketOutcome {
    let mut outcome = PacketOutcome::default();

    let records = match split_records(payload) {
        Ok(records) => records,
        Err(e) => {
            debug!("Dropping TLS payload {} -> {}: {}", flow.source, flow.destination, e);
            outcome.dropped.push(e);
            return outcome;
        }
    };

    for handshake in records.iter().filter_map(|r| r.client_hello()) {
        match Ja3Fingerprint::from_handshake(handshake) {
            Ok(fingerprint) => {
                outcome.records.push(FingerprintRecord::new(flow.clone(), fingerprint));
            }
            Err(e) => {
                debug!("Dropping ClientHello {} -> {}: {}", flow.source, flow.destination, e);
                outcome.dropped.push(e);
            }
        }
    }

    outcome
}

/// Walk a captured frame down to its TCP payload and fingerprint it.
///
/// Non-IP, non-TCP, filtered-out and non-handshake traffic yields an empty outcome.
pub fn process_frame(frame: &[u8], timestamp: f64, filter: &PortFilter) -> PacketOutcome {
    match parse_frame(frame) {
        Some((_, IpPacket::Ipv4(ipv4))) => process_ip(
            IpAddr::V4(ipv4.get_source()),
            IpAddr::V4(ipv4.get_destination()),
            ipv4.get_next_level_protocol(),
            ipv4.payload(),
            timestamp,
            filter,
        ),
        Some((_, IpPacket::Ipv6(ipv6))) => process_ip(
            IpAddr::V6(ipv6.get_source()),
            IpAddr::V6(ipv6.get_destination()),
            ipv6.get_next_header(),
            ipv6.payload(),
            timestamp,
            filter,
        ),
        None => PacketOutcome::default(),
    }
}

fn process_ip(
    src_ip: IpAddr,
    dst_ip: IpAddr,
    protocol: IpNextHeaderProtocol,
    ip_payload: &[u8],
    timestamp: f64,
    filter: &PortFilter,
) -> PacketOutcome {
    if protocol != IpNextHeaderProtocols::Tcp {
        return PacketOutcome::default();
    }
    let Some(tcp) = TcpPacket::new(ip_payload) else {
        debug!("Could not parse TCP from IP payload (len={})", ip_payload.len());
        return PacketOutcome::default();
    };

    let src_port = tcp.get_source();
    let dst_port = tcp.get_destination();
    if !filter.matches(src_port, dst_port) {
        return PacketOutcome::default();
    }

    let payload = tcp.payload();
    if !is_tls_traffic(payload) {
        return PacketOutcome::default();
    }

    let flow = FlowMeta {
        source: IpPort::new(src_ip, src_port),
        destination: IpPort::new(dst_ip, dst_port),
        timestamp,
    };
    process_tls_payload(payload, &flow)
}

/// Running counters kept by the analyzer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Frames seen
    pub packets: u64,
    /// Fingerprints produced
    pub fingerprints: u64,
    /// Dropped records by reason
    pub dropped: BTreeMap<DropReason, u64>,
}

impl DecodeStats {
    pub fn record(&mut self, outcome: &PacketOutcome) {
        self.packets = self.packets.saturating_add(1);
        self.fingerprints = self
            .fingerprints
            .saturating_add(outcome.records.len() as u64);
        for error in &outcome.dropped {
            let count = self.dropped.entry(error.kind()).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &DecodeStats) {
        self.packets = self.packets.saturating_add(other.packets);
        self.fingerprints = self.fingerprints.saturating_add(other.fingerprints);
        for (reason, count) in &other.dropped {
            let total = self.dropped.entry(*reason).or_insert(0);
            *total = total.saturating_add(*count);
        }
    }

    pub fn total_dropped(&self) -> u64 {
        self.dropped.values().sum()
    }
}

impl fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "packets={}, fingerprints={}, dropped={}",
            self.packets,
            self.fingerprints,
            self.total_dropped()
        )?;
        for (reason, count) in &self.dropped {
            write!(f, ", {reason}={count}")?;
        }
        Ok(())
    }
}
