//! SVSI frame layout, filtering and field extraction
//!
//! SVSI media travels as UDP datagrams sent to IPv4 multicast groups over
//! Ethernet. The analyser never decodes the full protocol stack; it reads a
//! handful of bytes at fixed offsets:
//!
//! ```text
//! 0            14                  14+IHL          14+IHL+8
//! | Ethernet   | IPv4 (IHL bytes)  | UDP (8 bytes) | SVSI header ...
//! | dst MAC    |   ... dst addr    |               | ?? 'S' 'V' 'S' 'I' ?? ?? ?? rolling
//! | 01:00:5e.. |   @ 30..34        |               | +0 +2           +6       +9
//! ```
//!
//! [`filter`] decides whether a frame carries SVSI and locates the SVSI header;
//! [`extract`] then reads the stream key and the rolling counter.

mod extract;
mod filter;

pub use extract::{TruncatedFrame, extract};
pub use filter::{HeaderOffset, filter};

/// IPv4 multicast MAC prefix (`01:00:5e`)
pub const MULTICAST_MAC_PREFIX: [u8; 3] = [0x01, 0x00, 0x5e];

/// Length of the Ethernet II header preceding the IPv4 header
pub const ETHERNET_HEADER_LEN: usize = 14;

/// Length of the UDP header preceding the SVSI header
pub const UDP_HEADER_LEN: usize = 8;

/// Protocol signature carried inside the SVSI header
pub const SVSI_SIGNATURE: &[u8; 4] = b"SVSI";

/// Displacement of the signature from the start of the SVSI header
pub const SIGNATURE_OFFSET: usize = 2;

/// Displacement of the rolling counter from the start of the SVSI header
pub const ROLLING_OFFSET: usize = 9;

/// Absolute offset of the IPv4 destination address
pub const STREAM_KEY_OFFSET: usize = 30;

/// Length of the stream key (an IPv4 address)
pub const STREAM_KEY_LEN: usize = 4;

/// Smallest frame the filter can inspect: Ethernet header plus the first IPv4
/// byte, which holds the header length
pub const MIN_DECODABLE_LEN: usize = ETHERNET_HEADER_LEN + 1;

/// Smallest per-frame capture length that holds every field the analyser reads
/// for a frame with a standard 20-byte IPv4 header
pub const MIN_SNAP_LEN: usize = ETHERNET_HEADER_LEN + 20 + UDP_HEADER_LEN + ROLLING_OFFSET + 1;
