//! Integration tests for the crawler service.

use ethcrawl_p2p::HostBuilder;
use ethcrawl_service::{Crawler, CrawlerConfig, ExportConfig};
use libp2p_identity::Keypair;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_crawler_exports_dialed_peer() {
    ethcrawl_cli::init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let export_path = dir.path().join("peers.csv");

    let target = HostBuilder::new()
        .with_ip("127.0.0.1")
        .with_port(19441)
        .with_keypair(Keypair::generate_secp256k1())
        .with_user_agent("Lighthouse/v5.1.3-3058b96/x86_64-linux")
        .build()
        .unwrap();
    let target_id = target.peer_id().to_string();
    let target_addr = target.full_multiaddr().to_string();
    let target_handle = target.start();

    let config = CrawlerConfig {
        ip: "127.0.0.1".to_string(),
        port: 19442,
        bootnodes: vec![target_addr],
        export: ExportConfig { path: export_path.clone(), interval_secs: 1 },
        ..Default::default()
    };
    let crawler = Crawler::new(config, Keypair::generate_secp256k1());
    let registry = crawler.registry();
    let cancellation = crawler.cancellation_token();
    let task = tokio::spawn(crawler.start());

    tokio::time::timeout(Duration::from_secs(20), async {
        while !registry.get(&target_id).is_some_and(|peer| peer.metadata_succeeded) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await
    .expect("target was never identified");

    let peer = registry.get(&target_id).unwrap();
    assert!(peer.attempted());
    assert!(peer.succeeded);
    assert!(peer.is_connected);
    assert_eq!(peer.error, None);
    assert_eq!(peer.user_agent, "Lighthouse/v5.1.3-3058b96/x86_64-linux");
    assert_eq!(peer.client.name.as_deref(), Some("Lighthouse"));
    assert_eq!(peer.ip, "127.0.0.1");
    assert!(!peer.pubkey.is_empty());

    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let exported = tokio::fs::read_to_string(&export_path).await.unwrap_or_default();
            if exported.contains(&target_id) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .expect("target was never exported");

    cancellation.cancel();
    tokio::time::timeout(Duration::from_secs(10), task).await.unwrap().unwrap().unwrap();
    target_handle.shutdown().await;
}
