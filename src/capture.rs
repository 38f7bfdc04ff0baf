use crate::error::Ja3Error;
use pcap_file::pcap::PcapReader;
use std::fs::File;
use std::path::Path;

/// Frames and capture timestamps read from a legacy pcap file.
///
/// A read error is yielded once and ends the iteration, since the reader is left
/// in the middle of a record.
pub struct PcapFrames {
    reader: PcapReader<File>,
    failed: bool,
}

impl PcapFrames {
    /// Open a pcap file and validate its global header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Ja3Error> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Ja3Error::Misconfiguration(format!("Failed to open PCAP file {}: {e}", path.display()))
        })?;
        let reader = PcapReader::new(file).map_err(|e| {
            Ja3Error::Misconfiguration(format!("File doesn't appear to be a PCAP: {e}"))
        })?;
        Ok(Self { reader, failed: false })
    }
}

impl Iterator for PcapFrames {
    type Item = Result<(Vec<u8>, f64), Ja3Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.next_packet()? {
            Ok(packet) => Some(Ok((packet.data.to_vec(), packet.timestamp.as_secs_f64()))),
            Err(e) => {
                self.failed = true;
                Some(Err(Ja3Error::Parse(format!("Error reading PCAP packet: {e}"))))
            }
        }
    }
}
