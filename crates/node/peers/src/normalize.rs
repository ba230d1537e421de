//! Normalization of raw dial and transport errors.
//!
//! The network stack reports connection failures as free-form text. Exported
//! metrics only care about a small, closed set of failure categories, so every
//! raw error is classified by [`ErrorKind::classify`] before it is stored on a
//! [`crate::Peer`].

use core::fmt;
use serde::{Deserialize, Serialize};

/// The closed set of connection failure categories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The dialed peer turned out to be the local host.
    DialToSelf,
    /// The dial was suppressed by the dialer's backoff.
    DialBackoff,
    /// The remote actively refused the connection.
    ConnectionRefused,
    /// The remote reset the connection.
    ConnectionReset,
    /// No route to the remote host or network.
    Unreachable,
    /// The remote presented a different peer id than the one dialed.
    PeerIdMismatch,
    /// The dial or handshake timed out.
    Timeout,
    /// No address was known for the peer.
    NoAddresses,
    /// Transport, security or multiplexer negotiation failed.
    ProtocolMismatch,
    /// Any error not covered by the patterns. Keeps the raw text for diagnostics.
    Other(String),
}

/// Ordered classification table. The first pattern contained in the
/// lowercased raw error wins, so more specific patterns come first.
const PATTERNS: [(&str, ErrorKind); 19] = [
    ("dial to self", ErrorKind::DialToSelf),
    ("matches the local peer", ErrorKind::DialToSelf),
    ("dial backoff", ErrorKind::DialBackoff),
    ("connection refused", ErrorKind::ConnectionRefused),
    ("connection reset", ErrorKind::ConnectionReset),
    ("broken pipe", ErrorKind::ConnectionReset),
    ("no route to host", ErrorKind::Unreachable),
    ("network is unreachable", ErrorKind::Unreachable),
    ("host is unreachable", ErrorKind::Unreachable),
    ("unreachable network", ErrorKind::Unreachable),
    ("peer id mismatch", ErrorKind::PeerIdMismatch),
    ("unexpected peer id", ErrorKind::PeerIdMismatch),
    ("timed out", ErrorKind::Timeout),
    ("timeout", ErrorKind::Timeout),
    ("deadline exceeded", ErrorKind::Timeout),
    ("no addresses", ErrorKind::NoAddresses),
    ("protocol not supported", ErrorKind::ProtocolMismatch),
    ("failed to negotiate", ErrorKind::ProtocolMismatch),
    ("multistream", ErrorKind::ProtocolMismatch),
];

impl ErrorKind {
    /// Classifies a raw error string.
    ///
    /// Matching is case-insensitive and deterministic: patterns are tried in
    /// table order and the first one contained in `raw` decides the category.
    /// Unmatched text maps to [`ErrorKind::Other`] carrying `raw` unchanged.
    pub fn classify(raw: &str) -> Self {
        let lowered = raw.to_lowercase();
        PATTERNS
            .iter()
            .find(|(pattern, _)| lowered.contains(pattern))
            .map_or_else(|| Self::Other(raw.to_string()), |(_, kind)| kind.clone())
    }

    /// Returns the export label of the category.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DialToSelf => "Dial to self attempted",
            Self::DialBackoff => "Dial backoff",
            Self::ConnectionRefused => "Connection refused",
            Self::ConnectionReset => "Connection reset by peer",
            Self::Unreachable => "Peer unreachable",
            Self::PeerIdMismatch => "Peer ID mismatch",
            Self::Timeout => "Timeout",
            Self::NoAddresses => "No addresses",
            Self::ProtocolMismatch => "Protocol mismatch",
            Self::Other(_) => "Other",
        }
    }

    /// Returns the raw error text retained by [`ErrorKind::Other`].
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Other(raw) => Some(raw),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Dial error: dial to self attempted", ErrorKind::DialToSelf)]
    #[case("The peer identity obtained on the connection matches the local peer.", ErrorKind::DialToSelf)]
    #[case("dial backoff", ErrorKind::DialBackoff)]
    #[case(
        "Failed to negotiate transport protocol(s): [(/ip4/1.2.3.4/tcp/9000: : Connection refused (os error 111))]",
        ErrorKind::ConnectionRefused
    )]
    #[case("Connection reset by peer (os error 104)", ErrorKind::ConnectionReset)]
    #[case("No route to host (os error 113)", ErrorKind::Unreachable)]
    #[case("Network is unreachable (os error 101)", ErrorKind::Unreachable)]
    #[case("Dial error: Unexpected peer ID 16Uiu2 at Dialer", ErrorKind::PeerIdMismatch)]
    #[case("i/o timeout", ErrorKind::Timeout)]
    #[case("context deadline exceeded", ErrorKind::Timeout)]
    #[case("Dial error: no addresses for peer.", ErrorKind::NoAddresses)]
    #[case("Failed to negotiate transport protocol(s): []", ErrorKind::ProtocolMismatch)]
    #[case("protocol not supported", ErrorKind::ProtocolMismatch)]
    fn test_classify(#[case] raw: &str, #[case] expected: ErrorKind) {
        assert_eq!(ErrorKind::classify(raw), expected);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // Contains both a refusal and a timeout; the refusal is earlier in the table.
        let raw = "connection refused after timeout";
        assert_eq!(ErrorKind::classify(raw), ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(ErrorKind::classify("CONNECTION REFUSED"), ErrorKind::ConnectionRefused);
    }

    #[test]
    fn test_unmatched_retains_raw_text() {
        let raw = "Handshake failed: Invalid Noise signature";
        let kind = ErrorKind::classify(raw);
        assert_eq!(kind, ErrorKind::Other(raw.to_string()));
        assert_eq!(kind.raw(), Some(raw));
        assert_eq!(kind.to_string(), "Other");
    }

    #[test]
    fn test_labels() {
        assert_eq!(ErrorKind::Timeout.to_string(), "Timeout");
        assert_eq!(ErrorKind::ConnectionReset.label(), "Connection reset by peer");
        assert_eq!(ErrorKind::Timeout.raw(), None);
    }
}
