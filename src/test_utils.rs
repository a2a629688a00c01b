//! Test utilities for building SVSI frames and classic pcap captures in memory
//!
//! Shared by unit tests, integration tests and benchmarks so that no binary
//! fixtures need to live in the repository.

#![cfg(any(test, feature = "benchmark"))]

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::level_filters::LevelFilter;

/// Default number of payload bytes following the SVSI header
const DEFAULT_PAYLOAD_LEN: usize = 16;

/// Length of the SVSI header up to and including the rolling counter
const SVSI_HEADER_LEN: usize = 10;

/// Builder for one Ethernet/IPv4/UDP frame carrying an SVSI header
///
/// With default settings the SVSI header starts at byte 42, the signature is
/// `SVSI` and the rolling counter is zero.
#[derive(Debug, Clone)]
pub struct SvsiFrameBuilder {
    group: [u8; 4],
    rolling: u8,
    ip_header_words: u8,
    signature: [u8; 4],
    payload_len: usize,
}

impl SvsiFrameBuilder {
    /// Frame addressed to the multicast `group`
    pub fn new(group: [u8; 4]) -> Self {
        Self {
            group,
            rolling: 0,
            ip_header_words: 5,
            signature: *b"SVSI",
            payload_len: DEFAULT_PAYLOAD_LEN,
        }
    }

    pub fn rolling(mut self, rolling: u8) -> Self {
        self.rolling = rolling;
        self
    }

    /// IPv4 header length in 32-bit words (5 to 15)
    pub fn ip_header_words(mut self, words: u8) -> Self {
        self.ip_header_words = words.clamp(5, 15);
        self
    }

    pub fn signature(mut self, signature: [u8; 4]) -> Self {
        self.signature = signature;
        self
    }

    /// Bytes of media payload after the SVSI header
    pub fn payload_len(mut self, len: usize) -> Self {
        self.payload_len = len;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let ip_header_len = usize::from(self.ip_header_words) * 4;
        let udp_len = 8 + SVSI_HEADER_LEN + self.payload_len;
        let mut frame = Vec::with_capacity(14 + ip_header_len + udp_len);

        // Ethernet: IPv4 multicast MAC carries the low 23 bits of the group
        let [_, g1, g2, g3] = self.group;
        frame.extend_from_slice(&[0x01, 0x00, 0x5e, g1 & 0x7f, g2, g3]);
        frame.extend_from_slice(&[0x00, 0x19, 0x0b, 0x80, 0x12, 0x34]);
        frame.extend_from_slice(&[0x08, 0x00]);

        // IPv4
        let total_len = (ip_header_len + udp_len) as u16;
        frame.push(0x40 | self.ip_header_words);
        frame.push(0x00);
        frame.extend_from_slice(&total_len.to_be_bytes());
        frame.extend_from_slice(&[0x00, 0x00, 0x40, 0x00]);
        frame.push(16); // ttl
        frame.push(17); // udp
        frame.extend_from_slice(&[0x00, 0x00]);
        frame.extend_from_slice(&[192, 168, 1, 20]);
        frame.extend_from_slice(&self.group);
        // Options: NOP padding
        frame.resize(14 + ip_header_len, 0x01);

        // UDP
        frame.extend_from_slice(&50_100u16.to_be_bytes());
        frame.extend_from_slice(&50_100u16.to_be_bytes());
        frame.extend_from_slice(&(udp_len as u16).to_be_bytes());
        frame.extend_from_slice(&[0x00, 0x00]);

        // SVSI header
        frame.extend_from_slice(&[0x00, 0x01]);
        frame.extend_from_slice(&self.signature);
        frame.extend_from_slice(&[0x00, 0x00, 0x00]);
        frame.push(self.rolling);

        frame.extend((0..self.payload_len).map(|i| (i % 251) as u8 + 1));
        frame
    }
}

/// Builder for a classic libpcap capture held in memory
#[derive(Debug, Clone)]
pub struct PcapBuilder {
    snap_len: u32,
    big_endian: bool,
    nanosecond: bool,
    timestamp: Duration,
    records: Vec<(Duration, Vec<u8>)>,
}

impl Default for PcapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PcapBuilder {
    pub fn new() -> Self {
        Self {
            snap_len: 65535,
            big_endian: false,
            nanosecond: false,
            timestamp: Duration::ZERO,
            records: Vec::new(),
        }
    }

    /// Snap length written to the global header; longer frames are cut to it
    pub fn snap_len(mut self, snap_len: u32) -> Self {
        self.snap_len = snap_len;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn nanosecond(mut self) -> Self {
        self.nanosecond = true;
        self
    }

    /// Timestamp applied to frames added after this call
    pub fn timestamp(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn frame(mut self, data: Vec<u8>) -> Self {
        self.records.push((self.timestamp, data));
        self
    }

    pub fn frames<I: IntoIterator<Item = Vec<u8>>>(mut self, frames: I) -> Self {
        for data in frames {
            self.records.push((self.timestamp, data));
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let magic: u32 = if self.nanosecond { 0xa1b2_3c4d } else { 0xa1b2_c3d4 };

        let mut out = Vec::new();
        self.put_u32(&mut out, magic);
        self.put_u16(&mut out, 2);
        self.put_u16(&mut out, 4);
        self.put_u32(&mut out, 0); // thiszone
        self.put_u32(&mut out, 0); // sigfigs
        self.put_u32(&mut out, self.snap_len);
        self.put_u32(&mut out, 1); // Ethernet

        for (timestamp, data) in &self.records {
            let fraction = if self.nanosecond {
                timestamp.subsec_nanos()
            } else {
                timestamp.subsec_micros()
            };
            let captured = data.len().min(self.snap_len as usize);

            self.put_u32(&mut out, timestamp.as_secs() as u32);
            self.put_u32(&mut out, fraction);
            self.put_u32(&mut out, captured as u32);
            self.put_u32(&mut out, data.len() as u32);
            out.extend_from_slice(&data[..captured]);
        }

        out
    }

    fn put_u32(&self, out: &mut Vec<u8>, value: u32) {
        if self.big_endian {
            out.extend_from_slice(&value.to_be_bytes());
        } else {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }

    fn put_u16(&self, out: &mut Vec<u8>, value: u16) {
        if self.big_endian {
            out.extend_from_slice(&value.to_be_bytes());
        } else {
            out.extend_from_slice(&value.to_le_bytes());
        }
    }
}

struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return everything it logged
/// at `level` or above, without ANSI colours
pub fn capture_logs<F: FnOnce()>(level: LevelFilter, f: F) -> String {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(move || SharedBuf(Arc::clone(&sink)))
        .with_ansi(false)
        .finish();

    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.lock().expect("log buffer lock").clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
