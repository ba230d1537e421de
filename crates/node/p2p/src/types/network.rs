//! Network identification types.

use core::{fmt, str::FromStr};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The consensus-layer network the crawler is joining.
#[derive(Debug, Display, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Ethereum mainnet.
    #[default]
    #[display("mainnet")]
    Mainnet,
    /// The Sepolia testnet.
    #[display("sepolia")]
    Sepolia,
    /// The Holesky testnet.
    #[display("holesky")]
    Holesky,
    /// The Hoodi testnet.
    #[display("hoodi")]
    Hoodi,
    /// A local or ephemeral devnet.
    #[display("devnet")]
    Devnet,
}

/// An unrecognized [`NetworkKind`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetworkError(pub String);

impl FromStr for NetworkKind {
    type Err = UnknownNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "sepolia" => Ok(Self::Sepolia),
            "holesky" => Ok(Self::Holesky),
            "hoodi" => Ok(Self::Hoodi),
            "devnet" => Ok(Self::Devnet),
            _ => Err(UnknownNetworkError(s.to_string())),
        }
    }
}

/// The 4-byte fork digest that scopes eth2 gossip topics.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ForkDigest(pub [u8; 4]);

impl ForkDigest {
    /// The mainnet Deneb fork digest.
    pub const MAINNET_DENEB: Self = Self([0x6a, 0x95, 0xa1, 0xa9]);
}

impl Default for ForkDigest {
    fn default() -> Self {
        Self::MAINNET_DENEB
    }
}

impl fmt::Display for ForkDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ForkDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForkDigest({self})")
    }
}

/// An error parsing a [`ForkDigest`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForkDigestError {
    /// The digest is not valid hex.
    #[error("fork digest is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// The digest is not exactly 4 bytes long.
    #[error("fork digest must be 4 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for ForkDigest {
    type Err = ForkDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        let digest: [u8; 4] =
            bytes.as_slice().try_into().map_err(|_| ForkDigestError::InvalidLength(bytes.len()))?;
        Ok(Self(digest))
    }
}

impl TryFrom<String> for ForkDigest {
    type Error = ForkDigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ForkDigest> for String {
    fn from(value: ForkDigest) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mainnet", NetworkKind::Mainnet)]
    #[case("Sepolia", NetworkKind::Sepolia)]
    #[case("HOLESKY", NetworkKind::Holesky)]
    #[case("hoodi", NetworkKind::Hoodi)]
    #[case("devnet", NetworkKind::Devnet)]
    fn test_network_kind_from_str(#[case] name: &str, #[case] expected: NetworkKind) {
        assert_eq!(name.parse::<NetworkKind>().unwrap(), expected);
        assert_eq!(expected.to_string(), name.to_lowercase());
    }

    #[test]
    fn test_unknown_network() {
        let err = "ropsten".parse::<NetworkKind>().unwrap_err();
        assert_eq!(err, UnknownNetworkError("ropsten".to_string()));
    }

    #[test]
    fn test_fork_digest_parse() {
        assert_eq!("6a95a1a9".parse::<ForkDigest>().unwrap(), ForkDigest::MAINNET_DENEB);
        assert_eq!("0xb5303f2a".parse::<ForkDigest>().unwrap(), ForkDigest([0xb5, 0x30, 0x3f, 0x2a]));
        assert_eq!(ForkDigest::default().to_string(), "6a95a1a9");
    }

    #[test]
    fn test_fork_digest_invalid() {
        assert_eq!("6a95a1".parse::<ForkDigest>().unwrap_err(), ForkDigestError::InvalidLength(3));
        assert!(matches!(
            "zz95a1a9".parse::<ForkDigest>().unwrap_err(),
            ForkDigestError::InvalidHex(_)
        ));
        assert_eq!(
            "0x6a9".parse::<ForkDigest>().unwrap_err(),
            ForkDigestError::InvalidHex(hex::FromHexError::OddLength)
        );
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&ForkDigest::MAINNET_DENEB).unwrap();
        assert_eq!(json, "\"6a95a1a9\"");
        assert_eq!(serde_json::from_str::<ForkDigest>(&json).unwrap(), ForkDigest::MAINNET_DENEB);
        assert_eq!(serde_json::to_string(&NetworkKind::Hoodi).unwrap(), "\"hoodi\"");
    }
}
