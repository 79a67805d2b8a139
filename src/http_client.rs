use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Shared HTTP client; one connection is reused across all frames of a run
pub static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("mockup3d/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(180)) // a single frame can take minutes
        .connect_timeout(Duration::from_secs(15))
        .pool_max_idle_per_host(2)
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .expect("Failed to create HTTP client")
});
