//! Shared code for integration tests.

use ethcrawl_p2p::{HostBuilder, HostManager};
use libp2p::identity::Keypair;
use std::time::Duration;

/// Helper function to create a new host listening on localhost.
pub(crate) fn host(port: u16) -> HostManager {
    ethcrawl_cli::init_test_tracing();
    HostBuilder::new()
        .with_ip("127.0.0.1")
        .with_port(port)
        .with_keypair(Keypair::generate_secp256k1())
        .with_user_agent(format!("ethcrawl-test/{port}"))
        .with_idle_timeout(Duration::from_secs(30))
        .build()
        .expect("builds host")
}

/// Receives from the queue, failing the test after a few seconds.
pub(crate) async fn recv<T>(receiver: &async_channel::Receiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), receiver.recv())
        .await
        .expect("event within timeout")
        .expect("queue open")
}
