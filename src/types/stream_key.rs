//! Stream identity

use std::fmt;
use std::net::Ipv4Addr;

/// Identity of one SVSI stream: its destination IPv4 address
///
/// Equality is byte-wise. Ordering is octet by octet, which agrees with the
/// natural ordering of the dotted label ("10.0.0.2" sorts before "10.0.0.10").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey([u8; 4]);

impl StreamKey {
    /// Create a key from the four raw address bytes
    pub const fn new(octets: [u8; 4]) -> Self {
        Self(octets)
    }

    /// Raw address bytes
    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// Human-readable dotted rendering ("a.b.c.d")
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl From<[u8; 4]> for StreamKey {
    fn from(octets: [u8; 4]) -> Self {
        Self(octets)
    }
}

impl From<Ipv4Addr> for StreamKey {
    fn from(addr: Ipv4Addr) -> Self {
        Self(addr.octets())
    }
}

impl From<StreamKey> for Ipv4Addr {
    fn from(key: StreamKey) -> Self {
        Ipv4Addr::from(key.0)
    }
}

impl fmt::Display for StreamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_dotted_quad() {
        let key = StreamKey::new([239, 1, 2, 30]);
        assert_eq!(key.label(), "239.1.2.30");
        assert_eq!(Ipv4Addr::from(key), Ipv4Addr::new(239, 1, 2, 30));
    }

    #[test]
    fn ordering_is_numeric_per_octet() {
        let two = StreamKey::from(Ipv4Addr::new(10, 0, 0, 2));
        let ten = StreamKey::from(Ipv4Addr::new(10, 0, 0, 10));
        assert!(two < ten);
        assert!(two.label() > ten.label(), "plain string order would disagree");
    }
}
