use crate::ja3::Ja3Fingerprint;
use crate::tls::TlsVersion;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fmt::Formatter;
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq)]
pub struct IpPort {
    pub ip: IpAddr,
    pub port: u16,
}

impl IpPort {
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }
}

impl fmt::Display for IpPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.ip, self.port)
    }
}

/// Where and when a ClientHello was observed. Passed through untouched by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMeta {
    pub source: IpPort,
    pub destination: IpPort,
    /// Capture time in seconds since the Unix epoch
    pub timestamp: f64,
}

/// Fingerprint of one ClientHello together with the flow it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintRecord {
    pub flow: FlowMeta,
    pub fingerprint: Ja3Fingerprint,
}

impl FingerprintRecord {
    pub fn new(flow: FlowMeta, fingerprint: Ja3Fingerprint) -> Self {
        Self { flow, fingerprint }
    }

    pub fn version(&self) -> TlsVersion {
        TlsVersion::from(self.fingerprint.version)
    }

    pub fn ja3(&self) -> &str {
        &self.fingerprint.ja3
    }

    pub fn ja3_digest(&self) -> &str {
        &self.fingerprint.digest
    }

    /// One-line summary: `[dst:port] JA3: <ja3> --> <digest>`
    pub fn summary(&self) -> String {
        format!(
            "[{}:{}] JA3: {} --> {}",
            self.flow.destination.ip,
            self.flow.destination.port,
            self.fingerprint.ja3,
            self.fingerprint.digest
        )
    }
}

/// Flat JSON view expected by existing JA3 consumers
#[derive(Serialize)]
struct JsonRecord<'a> {
    source_ip: String,
    destination_ip: String,
    source_port: u16,
    destination_port: u16,
    ja3: &'a str,
    ja3_digest: &'a str,
    server_name: String,
    timestamp: f64,
}

impl Serialize for FingerprintRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JsonRecord {
            source_ip: self.flow.source.ip.to_string(),
            destination_ip: self.flow.destination.ip.to_string(),
            source_port: self.flow.source.port,
            destination_port: self.flow.destination.port,
            ja3: &self.fingerprint.ja3,
            ja3_digest: &self.fingerprint.digest,
            server_name: self.fingerprint.server_name_lossy().unwrap_or_default(),
            timestamp: self.flow.timestamp,
        }
        .serialize(serializer)
    }
}

impl fmt::Display for FingerprintRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            ".-[ {} -> {} (ja3) ]-\n\
            |\n\
            | client     = {}\n\
            | version    = {}\n\
            | ja3        = {}\n\
            | ja3_digest = {}\n\
            | sni        = {}\n\
            `----\n",
            self.flow.source,
            self.flow.destination,
            self.flow.source,
            self.version(),
            self.fingerprint.ja3,
            self.fingerprint.digest,
            self.fingerprint.server_name_lossy().as_deref().unwrap_or("none"),
        )
    }
}
