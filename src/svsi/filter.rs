//! Frame filter: decides whether a captured frame carries SVSI

use super::{
    ETHERNET_HEADER_LEN, MIN_DECODABLE_LEN, MULTICAST_MAC_PREFIX, SIGNATURE_OFFSET,
    SVSI_SIGNATURE, UDP_HEADER_LEN,
};

/// Absolute byte offset of the SVSI header inside a frame
pub type HeaderOffset = usize;

/// Returns the SVSI header offset when `frame` carries SVSI traffic.
///
/// Rejection is silent and expected: frames not sent to an IPv4 multicast MAC,
/// frames whose payload lacks the `SVSI` signature, and frames too short to be
/// inspected all yield `None`.
pub fn filter(frame: &[u8]) -> Option<HeaderOffset> {
    if frame.len() < MIN_DECODABLE_LEN {
        return None;
    }

    if frame[..MULTICAST_MAC_PREFIX.len()] != MULTICAST_MAC_PREFIX {
        return None;
    }

    // IHL counts 32-bit words
    let ip_header_len = usize::from(frame[ETHERNET_HEADER_LEN] & 0x0f) * 4;
    let offset = ETHERNET_HEADER_LEN + ip_header_len + UDP_HEADER_LEN;

    let signature = frame.get(offset + SIGNATURE_OFFSET..offset + SIGNATURE_OFFSET + 4)?;
    if signature != SVSI_SIGNATURE {
        return None;
    }

    Some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SvsiFrameBuilder;

    #[test]
    fn accepts_svsi_multicast_frame() {
        let frame = SvsiFrameBuilder::new([239, 1, 1, 1]).build();
        assert_eq!(filter(&frame), Some(42));
    }

    #[test]
    fn honours_ip_options() {
        // IHL of 6 words adds 4 bytes of options
        let frame = SvsiFrameBuilder::new([239, 1, 1, 1]).ip_header_words(6).build();
        assert_eq!(filter(&frame), Some(46));
    }

    #[test]
    fn rejects_unicast_destination() {
        let mut frame = SvsiFrameBuilder::new([239, 1, 1, 1]).build();
        frame[0] = 0x00;
        frame[2] = 0x00;
        assert_eq!(filter(&frame), None);
    }

    #[test]
    fn rejects_missing_signature() {
        let frame = SvsiFrameBuilder::new([239, 1, 1, 1]).signature(*b"RTPX").build();
        assert_eq!(filter(&frame), None);
    }

    #[test]
    fn rejects_frames_too_short_to_inspect() {
        assert_eq!(filter(&[]), None);
        assert_eq!(filter(&[0x01, 0x00, 0x5e]), None);

        let frame = SvsiFrameBuilder::new([239, 1, 1, 1]).build();
        assert_eq!(filter(&frame[..MIN_DECODABLE_LEN]), None);
        // Signature cut in half
        assert_eq!(filter(&frame[..46]), None);
    }
}
