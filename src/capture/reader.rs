//! Classic libpcap capture reader
//!
//! Decodes capture files into [`RawFrame`]s so they can be fed through the
//! same pipeline as any other frame source.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use svsi_analyser::capture::CaptureReader;
//!
//! fn read_frames() -> svsi_analyser::Result<()> {
//!     let mut reader = CaptureReader::open("multicast.pcap")?;
//!     println!("Snap length: {}", reader.header().snap_len);
//!
//!     while let Some(frame) = reader.read_next_frame()? {
//!         println!("Frame {} with {} bytes", frame.index, frame.data.len());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Notes
//!
//! - Frames are streamed from disk through a fixed-size buffer; the file is
//!   never loaded whole
//! - Both byte orders and both timestamp resolutions are accepted
//! - pcapng files are rejected with [`AnalyzerError::Capture`]

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{
    LegacyPcapBlock, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapHeader,
};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::svsi::MIN_SNAP_LEN;
use crate::types::RawFrame;
use crate::{AnalyzerError, Result};

/// Buffer size for the pcap decoder; holds the largest record a 256 KiB snap
/// length can produce
const READER_CAPACITY: usize = 1 << 19;

/// Metadata from the capture's global header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureHeader {
    pub version_major: u16,
    pub version_minor: u16,
    /// Maximum bytes captured per frame
    pub snap_len: u32,
    /// Link-layer type (1 = Ethernet)
    pub link_type: i32,
    /// Timestamps carry nanoseconds instead of microseconds
    pub nanosecond: bool,
    pub big_endian: bool,
}

impl CaptureHeader {
    fn from_pcap(header: &PcapHeader) -> Self {
        Self {
            version_major: header.version_major,
            version_minor: header.version_minor,
            snap_len: header.snaplen,
            link_type: header.network.0,
            nanosecond: header.is_nanosecond_precision(),
            big_endian: header.is_bigendian(),
        }
    }

    /// Whether frames start with an Ethernet II header
    pub fn is_ethernet(&self) -> bool {
        self.link_type == Linktype::ETHERNET.0
    }
}

enum Block {
    Header(CaptureHeader),
    Frame(RawFrame),
}

/// Sequential reader over a classic pcap capture
pub struct CaptureReader<R: Read> {
    reader: LegacyPcapReader<R>,
    path: PathBuf,
    header: CaptureHeader,
    frames_read: u64,
}

impl CaptureReader<BufReader<File>> {
    /// Open a capture file for reading
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|e| AnalyzerError::file_error(path.to_path_buf(), e))?;

        Self::from_reader(BufReader::new(file), path.to_path_buf())
    }
}

impl CaptureReader<Cursor<Vec<u8>>> {
    /// Create a reader over an in-memory capture (for testing)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data), PathBuf::from("<memory>"))
    }
}

impl<R: Read> CaptureReader<R> {
    /// Create a reader over any byte source, using `path` for diagnostics
    pub fn from_reader(reader: R, path: PathBuf) -> Result<Self> {
        let reader = LegacyPcapReader::new(READER_CAPACITY, reader).map_err(|e| match e {
            PcapError::HeaderNotRecognized => AnalyzerError::capture(
                "Capture header",
                "not a classic pcap file (pcapng captures are not supported)",
            ),
            other => AnalyzerError::capture("Capture header", format!("{other:?}")),
        })?;

        let mut capture = Self {
            reader,
            path,
            header: CaptureHeader {
                version_major: 0,
                version_minor: 0,
                snap_len: 0,
                link_type: Linktype::ETHERNET.0,
                nanosecond: false,
                big_endian: false,
            },
            frames_read: 0,
        };

        match capture.next_block()? {
            Some(Block::Header(header)) => capture.header = header,
            _ => {
                return Err(AnalyzerError::capture(
                    "Capture header",
                    "capture does not start with a global header",
                ));
            }
        }

        let header = capture.header;
        debug!(
            "Parsed capture header for {}: version={}.{}, snap_len={}, link_type={}",
            capture.path.display(),
            header.version_major,
            header.version_minor,
            header.snap_len,
            header.link_type
        );

        if (header.snap_len as usize) < MIN_SNAP_LEN {
            warn!(
                "Capture snap length {} is below the {} bytes needed to read SVSI rolling counters",
                header.snap_len, MIN_SNAP_LEN
            );
        }

        if !header.is_ethernet() {
            warn!(
                "Capture link type {} is not Ethernet; no frame is likely to qualify",
                header.link_type
            );
        }

        Ok(capture)
    }

    /// Read the next frame, or `None` at end of capture
    pub fn read_next_frame(&mut self) -> Result<Option<RawFrame>> {
        loop {
            match self.next_block()? {
                Some(Block::Frame(frame)) => return Ok(Some(frame)),
                Some(Block::Header(_)) => {
                    debug!("Ignoring repeated capture header in {}", self.path.display());
                }
                None => return Ok(None),
            }
        }
    }

    /// Global header metadata
    pub fn header(&self) -> &CaptureHeader {
        &self.header
    }

    /// Number of frames returned so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Path the reader was opened from
    pub fn file_path(&self) -> &Path {
        &self.path
    }

    fn next_block(&mut self) -> Result<Option<Block>> {
        loop {
            match self.reader.next() {
                Ok((offset, block)) => {
                    let parsed = match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            Block::Header(CaptureHeader::from_pcap(&header))
                        }
                        PcapBlockOwned::Legacy(packet) => {
                            self.frames_read += 1;
                            Block::Frame(frame_from_packet(
                                &packet,
                                self.frames_read,
                                self.header.nanosecond,
                            ))
                        }
                        PcapBlockOwned::NG(_) => {
                            return Err(AnalyzerError::capture(
                                "Capture record",
                                "unexpected pcapng block in a classic pcap file",
                            ));
                        }
                    };
                    self.reader.consume(offset);
                    return Ok(Some(parsed));
                }
                Err(PcapError::Eof) => {
                    trace!("End of capture after {} frames", self.frames_read);
                    return Ok(None);
                }
                Err(PcapError::Incomplete(_)) => {
                    if self.reader.reader_exhausted() {
                        return Err(AnalyzerError::capture(
                            "Capture record",
                            format!(
                                "capture ends in the middle of the record after frame {}",
                                self.frames_read
                            ),
                        ));
                    }
                    if let Err(e) = self.reader.refill() {
                        return Err(AnalyzerError::capture("Capture refill", format!("{e:?}")));
                    }
                }
                Err(e) => {
                    return Err(AnalyzerError::capture(
                        format!("Capture record after frame {}", self.frames_read),
                        format!("{e:?}"),
                    ));
                }
            }
        }
    }
}

fn frame_from_packet(packet: &LegacyPcapBlock<'_>, index: u64, nanosecond: bool) -> RawFrame {
    let fraction = if nanosecond {
        Duration::from_nanos(u64::from(packet.ts_usec))
    } else {
        Duration::from_micros(u64::from(packet.ts_usec))
    };
    let timestamp = Duration::from_secs(u64::from(packet.ts_sec)) + fraction;

    RawFrame::new(packet.data.to_vec(), index, timestamp, packet.origlen as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{PcapBuilder, SvsiFrameBuilder};
    use anyhow::{Context, Result, ensure};

    #[test]
    fn reads_frames_in_capture_order() -> Result<()> {
        let capture = PcapBuilder::new()
            .frame(SvsiFrameBuilder::new([239, 0, 0, 1]).rolling(1).build())
            .frame(SvsiFrameBuilder::new([239, 0, 0, 1]).rolling(2).build())
            .frame(vec![0u8; 60])
            .build();

        let mut reader = CaptureReader::from_bytes(capture).context("Opening capture")?;
        ensure!(reader.header().is_ethernet(), "Builder writes Ethernet captures");
        ensure!(reader.header().snap_len == 65535, "Default snap length");

        let mut indices = Vec::new();
        while let Some(frame) = reader.read_next_frame().context("Reading frame")? {
            indices.push(frame.index);
        }

        ensure!(indices == vec![1, 2, 3], "Frames out of order: {:?}", indices);
        ensure!(reader.frames_read() == 3, "Frame counter mismatch");
        ensure!(reader.read_next_frame()?.is_none(), "EOF must be sticky");
        Ok(())
    }

    #[test]
    fn header_only_capture_has_no_frames() -> Result<()> {
        let mut reader = CaptureReader::from_bytes(PcapBuilder::new().build())?;
        ensure!(reader.read_next_frame()?.is_none(), "Expected no frames");
        Ok(())
    }

    #[test]
    fn decodes_timestamps_and_truncation() -> Result<()> {
        let frame = SvsiFrameBuilder::new([239, 0, 0, 1]).build();
        let capture = PcapBuilder::new()
            .snap_len(48)
            .timestamp(Duration::new(1_700_000_000, 250_000))
            .frame(frame.clone())
            .build();

        let mut reader = CaptureReader::from_bytes(capture)?;
        let raw = reader.read_next_frame()?.context("Expected one frame")?;

        ensure!(
            raw.timestamp == Duration::new(1_700_000_000, 250_000),
            "Timestamp {:?}",
            raw.timestamp
        );
        ensure!(raw.data.len() == 48, "Captured length should honour snap length");
        ensure!(raw.original_len == frame.len(), "Original length lost");
        ensure!(raw.is_truncated(), "Frame should be marked truncated");
        Ok(())
    }

    #[test]
    fn big_endian_nanosecond_capture() -> Result<()> {
        let capture = PcapBuilder::new()
            .big_endian()
            .nanosecond()
            .timestamp(Duration::new(5, 123_456_789))
            .frame(SvsiFrameBuilder::new([239, 0, 0, 1]).build())
            .build();

        let mut reader = CaptureReader::from_bytes(capture)?;
        ensure!(reader.header().big_endian, "Expected big-endian header");
        ensure!(reader.header().nanosecond, "Expected nanosecond resolution");

        let raw = reader.read_next_frame()?.context("Expected one frame")?;
        ensure!(raw.timestamp == Duration::new(5, 123_456_789), "Timestamp {:?}", raw.timestamp);
        Ok(())
    }

    #[test]
    fn rejects_pcapng() {
        // Section header block magic
        let data = vec![0x0a, 0x0d, 0x0d, 0x0a, 0x1c, 0, 0, 0, 0x4d, 0x3c, 0x2b, 0x1a];
        let result = CaptureReader::from_bytes(data);
        assert!(matches!(result, Err(AnalyzerError::Capture { .. })));
    }

    #[test]
    fn truncated_record_is_an_error() -> Result<()> {
        let mut capture = PcapBuilder::new()
            .frame(SvsiFrameBuilder::new([239, 0, 0, 1]).build())
            .build();
        capture.truncate(capture.len() - 10);

        let mut reader = CaptureReader::from_bytes(capture)?;
        let result = reader.read_next_frame();
        ensure!(
            matches!(result, Err(AnalyzerError::Capture { .. })),
            "Expected capture error, got {:?}",
            result.map(|frame| frame.map(|f| f.index))
        );
        Ok(())
    }

    #[test]
    fn missing_file_reports_path() {
        let result = CaptureReader::open("/definitely/not/here.pcap");
        match result {
            Err(AnalyzerError::File { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.pcap"));
            }
            Err(other) => panic!("unexpected error {other:?}"),
            Ok(_) => panic!("opening a missing file must fail"),
        }
    }
}
