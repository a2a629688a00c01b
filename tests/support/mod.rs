//! Capture fixtures written to temporary directories

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Capture file that is removed together with its directory on drop
pub struct CaptureFixture {
    _dir: TempDir,
    path: PathBuf,
}

impl CaptureFixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Ethernet/IPv4/UDP frame with an SVSI header at byte 42
pub fn svsi_frame(group: [u8; 4], rolling: u8) -> Vec<u8> {
    let mut frame = vec![0x01, 0x00, 0x5e, group[1] & 0x7f, group[2], group[3]];
    frame.extend_from_slice(&[0x00, 0x19, 0x0b, 0x80, 0x12, 0x34, 0x08, 0x00]);
    frame.extend_from_slice(&[0x45, 0x00, 0x00, 0x32, 0x00, 0x00, 0x40, 0x00, 16, 17, 0, 0]);
    frame.extend_from_slice(&[192, 168, 1, 20]);
    frame.extend_from_slice(&group);
    frame.extend_from_slice(&[0xc3, 0xb4, 0xc3, 0xb4, 0x00, 0x1e, 0x00, 0x00]);
    frame.extend_from_slice(&[0x00, 0x01, b'S', b'V', b'S', b'I', 0x00, 0x00, 0x00, rolling]);
    frame.extend_from_slice(&[0xaa; 12]);
    frame
}

/// The same layout sent to a unicast MAC address
pub fn unicast_frame(rolling: u8) -> Vec<u8> {
    let mut frame = svsi_frame([10, 0, 0, 5], rolling);
    frame[..6].copy_from_slice(&[0x00, 0x1b, 0x21, 0x3a, 0x4f, 0x10]);
    frame
}

/// Write a little-endian microsecond pcap file into a fresh temp directory
pub fn write_capture(name: &str, snap_len: u32, frames: &[Vec<u8>]) -> CaptureFixture {
    let mut out = 0xa1b2_c3d4u32.to_le_bytes().to_vec();
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    for value in [0u32, 0, snap_len, 1] {
        out.extend_from_slice(&value.to_le_bytes());
    }

    for (i, frame) in frames.iter().enumerate() {
        let captured = frame.len().min(snap_len as usize);
        for value in [i as u32, 0, captured as u32, frame.len() as u32] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&frame[..captured]);
    }

    let dir = tempfile::tempdir().expect("create fixture directory");
    let path = dir.path().join(format!("{name}.pcap"));
    std::fs::write(&path, out).expect("write capture fixture");
    CaptureFixture { _dir: dir, path }
}
