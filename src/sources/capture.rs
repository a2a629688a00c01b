//! Frame source backed by a capture file

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, trace};

use crate::Result;
use crate::capture::{CaptureHeader, CaptureReader};
use crate::source::FrameSource;
use crate::types::RawFrame;

/// Frame source that reads a classic pcap capture as fast as it can
pub struct CaptureSource<R: Read = BufReader<File>> {
    reader: CaptureReader<R>,
    finished: bool,
}

impl CaptureSource {
    /// Open a capture file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = CaptureReader::open(path)?;
        info!(
            "Opened capture {} (snap length {}, link type {})",
            reader.file_path().display(),
            reader.header().snap_len,
            reader.header().link_type
        );
        Ok(Self::from_reader(reader))
    }
}

impl<R: Read> CaptureSource<R> {
    /// Wrap an already opened reader
    pub fn from_reader(reader: CaptureReader<R>) -> Self {
        Self { reader, finished: false }
    }

    /// Capture global header metadata
    pub fn header(&self) -> &CaptureHeader {
        self.reader.header()
    }

    /// Frames delivered so far
    pub fn frames_read(&self) -> u64 {
        self.reader.frames_read()
    }
}

#[async_trait::async_trait]
impl<R: Read + Send + 'static> FrameSource for CaptureSource<R> {
    async fn next_frame(&mut self) -> Result<Option<RawFrame>> {
        if self.finished {
            return Ok(None);
        }

        match self.reader.read_next_frame()? {
            Some(frame) => {
                trace!("Frame {}: {} bytes", frame.index, frame.data.len());
                Ok(Some(frame))
            }
            None => {
                debug!("Reached end of capture after {} frames", self.reader.frames_read());
                self.finished = true;
                Ok(None)
            }
        }
    }

    fn describe(&self) -> String {
        self.reader.file_path().display().to_string()
    }
}
