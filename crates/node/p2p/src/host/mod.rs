//! The crawler host: swarm construction, notification translation and event queues.

mod builder;
pub use builder::{DEFAULT_IDLE_TIMEOUT, HostBuilder, default_user_agent};

mod error;
pub use error::HostBuilderError;

mod handle;
pub use handle::{HostHandle, HostStoppedError};

mod manager;
pub use manager::HostManager;

mod queue;
pub use queue::{NOTIFICATION_QUEUE_SIZE, NotificationQueue};

mod utils;
pub use utils::{multiaddr_ip, multiaddr_peer_id};
