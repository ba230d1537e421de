//! Loading of the secp256k1 host keypair.

use libp2p_identity::{Keypair, secp256k1};
use std::{io, path::Path};
use thiserror::Error;

/// An error loading a secp256k1 [`Keypair`].
#[derive(Debug, Error)]
pub enum KeypairError {
    /// The key is not valid hex.
    #[error("invalid hex secret key: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// The bytes are not a valid secp256k1 secret key.
    #[error("invalid secp256k1 secret key: {0}")]
    InvalidSecretKey(String),
    /// The keypair is not a secp256k1 keypair.
    #[error("keypair is not secp256k1")]
    NotSecp256k1,
    /// Reading or writing the key file failed.
    #[error("key file error: {0}")]
    Io(#[from] io::Error),
}

/// Parses a hex encoded secp256k1 secret key, with or without a `0x` prefix.
pub fn parse_secret_key(secret: &str) -> Result<Keypair, KeypairError> {
    let secret = secret.trim();
    let mut bytes = hex::decode(secret.strip_prefix("0x").unwrap_or(secret))?;
    let secret_key = secp256k1::SecretKey::try_from_bytes(&mut bytes)
        .map_err(|e| KeypairError::InvalidSecretKey(e.to_string()))?;
    Ok(secp256k1::Keypair::from(secret_key).into())
}

/// Hex encodes the secret key of a secp256k1 [`Keypair`].
pub fn encode_secret_key(keypair: &Keypair) -> Result<String, KeypairError> {
    let keypair = keypair.clone().try_into_secp256k1().map_err(|_| KeypairError::NotSecp256k1)?;
    Ok(hex::encode(keypair.secret().to_bytes()))
}

/// Loads the host keypair from a file, generating and persisting a new one when the file does not
/// exist. Keeps the crawler's peer id stable across restarts.
#[derive(Debug, Clone, Copy)]
pub struct SecretKeyLoader;

impl SecretKeyLoader {
    /// Loads the keypair stored at `path`, creating it if absent.
    pub fn load(path: &Path) -> Result<Keypair, KeypairError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => parse_secret_key(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let keypair = Keypair::generate_secp256k1();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, encode_secret_key(&keypair)?)?;
                tracing::info!(target: "cli", path = %path.display(), "Generated new secret key");
                Ok(keypair)
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const SECRET: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[rstest]
    #[case(SECRET)]
    #[case("0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")]
    #[case(" 4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318\n")]
    fn test_parse_secret_key(#[case] secret: &str) {
        let keypair = parse_secret_key(secret).unwrap();
        assert_eq!(encode_secret_key(&keypair).unwrap(), SECRET);
    }

    #[test]
    fn test_parse_secret_key_stable_peer_id() {
        let a = parse_secret_key(SECRET).unwrap();
        let b = parse_secret_key(SECRET).unwrap();
        assert_eq!(a.public().to_peer_id(), b.public().to_peer_id());
    }

    #[rstest]
    #[case("zz")]
    #[case("abc")]
    fn test_parse_invalid_hex(#[case] secret: &str) {
        assert!(matches!(parse_secret_key(secret), Err(KeypairError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_invalid_key() {
        let zero = "00".repeat(32);
        assert!(matches!(parse_secret_key(&zero), Err(KeypairError::InvalidSecretKey(_))));
        assert!(matches!(parse_secret_key("0102"), Err(KeypairError::InvalidSecretKey(_))));
    }

    #[test]
    fn test_loader_generates_then_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("secret");

        let generated = SecretKeyLoader::load(&path).unwrap();
        assert!(path.exists());
        let loaded = SecretKeyLoader::load(&path).unwrap();
        assert_eq!(generated.public().to_peer_id(), loaded.public().to_peer_id());
    }
}
