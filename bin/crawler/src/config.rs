//! Loading of the TOML configuration file.

use anyhow::Context;
use ethcrawl_service::CrawlerConfig;
use std::path::Path;

/// Reads and deserializes a [`CrawlerConfig`] from the TOML file at `path`.
pub(crate) fn load_config(path: &Path) -> anyhow::Result<CrawlerConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethcrawl_p2p::NetworkKind;

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ethcrawl.toml");
        std::fs::write(
            &path,
            r#"
            ip = "127.0.0.1"
            network = "sepolia"
            aggregator_workers = 4

            [export]
            path = "/tmp/sepolia.csv"
            "#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.ip, "127.0.0.1");
        assert_eq!(config.network, NetworkKind::Sepolia);
        assert_eq!(config.aggregator_workers, 4);
        assert_eq!(config.export.path, Path::new("/tmp/sepolia.csv"));
        assert_eq!(config.port, ethcrawl_service::DEFAULT_PORT);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn test_load_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "port = \"not a port\"").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }
}
