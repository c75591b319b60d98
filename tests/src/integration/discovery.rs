//! # Address Discovery Over Loopback
//!
//! The native STUN connector against an in-process responder and against a
//! server that never answers, plus the outcome report posted to the
//! discovery log endpoint.

#[cfg(test)]
mod tests {
    use crate::support::TestApi;
    use shared_types::DiscoveryOutcome;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tokio::net::UdpSocket;
    use wc_01_address_discovery::testing::StunResponder;
    use wc_01_address_discovery::{
        AddressDiscovery, DiscoveryConfig, DiscoveryError, RendezvousServer, StunPeerConnector,
    };

    fn loopback_discovery(server: RendezvousServer, timeout: Duration) -> AddressDiscovery {
        let connector = StunPeerConnector::new().with_bind_addr("127.0.0.1:0".parse().unwrap());
        let config = DiscoveryConfig::default()
            .with_server(server)
            .with_timeout(timeout)
            .with_initial_rto(Duration::from_millis(100));
        AddressDiscovery::new(Arc::new(connector), config)
    }

    #[tokio::test]
    async fn test_reflexive_address_from_responder() {
        let responder = StunResponder::spawn().await.unwrap();
        let discovery = loopback_discovery(responder.server(), Duration::from_secs(7));

        let address = discovery.discover().await.unwrap();
        assert_eq!(address.as_str(), "127.0.0.1");
    }

    #[tokio::test]
    async fn test_silent_server_is_blocked_within_timeout() {
        // Bound but never read: binding requests go unanswered.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();
        let server = RendezvousServer::new(addr.ip().to_string(), addr.port());
        let discovery = loopback_discovery(server, Duration::from_secs(2));

        let started = Instant::now();
        let result = discovery.discover().await;
        assert_eq!(result, Err(DiscoveryError::BlockedOrUnavailable));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_unresolvable_server_is_blocked() {
        let server = RendezvousServer::new("stun.invalid", 3478);
        let discovery = loopback_discovery(server, Duration::from_secs(2));
        assert_eq!(
            discovery.discover().await,
            Err(DiscoveryError::BlockedOrUnavailable)
        );
    }

    #[tokio::test]
    async fn test_aborted_discovery_is_cancelled() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = silent.local_addr().unwrap();
        let server = RendezvousServer::new(addr.ip().to_string(), addr.port());
        let handle = loopback_discovery(server, Duration::from_secs(7)).spawn();

        handle.abort();
        assert_eq!(handle.wait().await, Err(DiscoveryError::Cancelled));
    }

    #[tokio::test]
    async fn test_outcome_reported_to_discovery_log() {
        let responder = StunResponder::spawn().await.unwrap();
        let api = TestApi::spawn().await;
        let discovery = loopback_discovery(responder.server(), Duration::from_secs(7));

        let outcome = match discovery.discover().await {
            Ok(address) => DiscoveryOutcome::found(address.into_inner()),
            Err(e) => DiscoveryOutcome::failed(e.to_string()),
        };
        let ack = api.client().report_discovery(&outcome).await.unwrap();

        assert!(ack.ok);
        assert_eq!(ack.received, serde_json::json!({"ok": true, "ip": "127.0.0.1"}));
    }
}
