#![forbid(unsafe_code)]

//! Passive JA3 fingerprinting of TLS clients.
//!
//! The decoding core turns one ClientHello handshake message into the five JA3
//! segments, the canonical comma-joined string and its MD5 digest. Around it sit
//! a TLS record splitter, a frame walker for Ethernet/IP/TCP captures, pcap and
//! live capture sources and a worker pool for batch processing.

pub mod capture;
pub mod client_hello;
pub mod cursor;
pub mod error;
pub mod extensions;
pub mod filter;
pub mod grease;
pub mod ja3;
pub mod output;
pub mod packet_parser;
pub mod parallel;
pub mod process;
pub mod segment;
pub mod tls;

// Re-exports
pub use capture::PcapFrames;
pub use client_hello::{decode_client_hello, parse_client_hello, ClientHelloFields};
pub use error::{DropReason, Ja3Error};
pub use filter::PortFilter;
pub use ja3::{ja3_digest, Ja3Fingerprint, Ja3Segments};
pub use output::{FingerprintRecord, FlowMeta, IpPort};
pub use process::{process_frame, process_tls_payload, DecodeStats, PacketOutcome};
pub use tls::TlsVersion;

use pnet::datalink;
use pnet::datalink::Config;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error};

/// JA3 analyzer over a stream of captured frames.
///
/// Frames are fingerprinted one at a time; every ClientHello that decodes cleanly
/// is sent to the caller's channel and every rejected one is counted in [`DecodeStats`].
#[derive(Debug, Default)]
pub struct Ja3Analyzer {
    filter: PortFilter,
    stats: DecodeStats,
}

impl Ja3Analyzer {
    /// Analyzer watching TCP port 443
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the port filter.
    pub fn with_filter(mut self, filter: PortFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> &PortFilter {
        &self.filter
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Fingerprint a single captured frame.
    pub fn analyze_frame(&mut self, frame: &[u8], timestamp: f64) -> Vec<FingerprintRecord> {
        let outcome = process_frame(frame, timestamp, &self.filter);
        self.stats.record(&outcome);
        outcome.records
    }

    fn process_with<F>(
        &mut self,
        mut frame_fn: F,
        sender: Sender<FingerprintRecord>,
        cancel_signal: Option<Arc<AtomicBool>>,
    ) -> Result<(), Ja3Error>
    where
        F: FnMut() -> Option<Result<(Vec<u8>, f64), Ja3Error>>,
    {
        while let Some(frame_result) = frame_fn() {
            if let Some(ref cancel) = cancel_signal {
                if cancel.load(Ordering::Relaxed) {
                    debug!("Cancellation signal received, stopping frame processing");
                    break;
                }
            }

            match frame_result {
                Ok((frame, timestamp)) => {
                    for record in self.analyze_frame(&frame, timestamp) {
                        if sender.send(record).is_err() {
                            error!("Receiver dropped, stopping frame processing");
                            return Ok(());
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to read frame: {}", e);
                }
            }
        }
        debug!("Frame processing finished: {}", self.stats);
        Ok(())
    }

    /// Captures and fingerprints frames on the specified network interface.
    ///
    /// # Errors
    /// - If the network interface cannot be found or a channel cannot be created.
    pub fn analyze_network(
        &mut self,
        interface_name: &str,
        sender: Sender<FingerprintRecord>,
        cancel_signal: Option<Arc<AtomicBool>>,
    ) -> Result<(), Ja3Error> {
        let interface = datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == interface_name)
            .ok_or_else(|| {
                Ja3Error::Misconfiguration(format!(
                    "Could not find network interface: {interface_name}"
                ))
            })?;

        debug!("Using network interface: {}", interface.name);

        let config = Config { promiscuous: true, ..Config::default() };

        let (_tx, mut rx) = match datalink::channel(&interface, config) {
            Ok(datalink::Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => {
                return Err(Ja3Error::Misconfiguration("Unhandled channel type".to_string()))
            }
            Err(e) => {
                return Err(Ja3Error::Misconfiguration(format!("Unable to create channel: {e}")))
            }
        };

        self.process_with(
            move || match rx.next() {
                Ok(frame) => Some(Ok((frame.to_vec(), now_seconds()))),
                Err(e) => Some(Err(Ja3Error::Misconfiguration(format!(
                    "Error receiving frame: {e}"
                )))),
            },
            sender,
            cancel_signal,
        )
    }

    /// Fingerprints frames from a pcap file.
    ///
    /// # Errors
    /// - If the pcap file cannot be opened or its header is invalid.
    pub fn analyze_pcap<P: AsRef<Path>>(
        &mut self,
        pcap_path: P,
        sender: Sender<FingerprintRecord>,
        cancel_signal: Option<Arc<AtomicBool>>,
    ) -> Result<(), Ja3Error> {
        let mut frames = PcapFrames::open(pcap_path)?;
        self.process_with(move || frames.next(), sender, cancel_signal)
    }
}

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
