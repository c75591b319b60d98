//! # Address Discovery Service
//!
//! Wires the candidate domain to a [`PeerConnector`]. One call runs one
//! bounded negotiation:
//!
//! ```text
//! is_available? ──no──► Unsupported
//!      │
//!    open ─► data channel ─► offer ──err──► OfferFailed
//!                              │
//!                  candidate events ──► CandidateSet
//!                              │
//!          end-of-candidates | timeout ─► close ─► first srflx address
//! ```

use crate::domain::{CandidateSet, DiscoveryConfig, DiscoveryError, ReflexiveAddress};
use crate::ports::{AddressDiscoveryApi, CandidateEvent, PeerConnector, PeerSession};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument};

/// Reflexive-address discovery over an injected connector.
#[derive(Clone)]
pub struct AddressDiscovery {
    connector: Arc<dyn PeerConnector>,
    config: DiscoveryConfig,
}

impl std::fmt::Debug for AddressDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressDiscovery")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AddressDiscovery {
    pub fn new(connector: Arc<dyn PeerConnector>, config: DiscoveryConfig) -> Self {
        Self { connector, config }
    }

    /// Discovery through the native STUN connector.
    #[cfg(feature = "network")]
    pub fn stun(config: DiscoveryConfig) -> Self {
        Self::new(Arc::new(crate::adapters::StunPeerConnector::new()), config)
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Run one discovery to completion.
    #[instrument(name = "address_discovery", skip(self), fields(server = %self.config.server))]
    pub async fn discover(&self) -> Result<ReflexiveAddress, DiscoveryError> {
        if !self.connector.is_available() {
            info!("Peer negotiation unavailable");
            return Err(DiscoveryError::Unsupported);
        }

        let deadline = Instant::now() + self.config.timeout;
        let mut session = match timeout_at(deadline, self.connector.open(&self.config)).await {
            Ok(opened) => opened.map_err(|e| DiscoveryError::OfferFailed(e.to_string()))?,
            Err(_) => {
                info!("Timed out opening peer session");
                return Err(DiscoveryError::BlockedOrUnavailable);
            }
        };

        let gathered = self.negotiate(session.as_mut(), deadline).await;
        session.close();

        let candidates = gathered?;
        match candidates.first() {
            Some(address) => {
                debug!(address, retained = candidates.len(), "Reflexive address found");
                Ok(ReflexiveAddress::new(address))
            }
            None => {
                info!("No reflexive candidate gathered");
                Err(DiscoveryError::BlockedOrUnavailable)
            }
        }
    }

    /// Start a discovery in the background.
    pub fn spawn(&self) -> DiscoveryHandle {
        let this = self.clone();
        DiscoveryHandle {
            task: tokio::spawn(async move { this.discover().await }),
        }
    }

    async fn negotiate(
        &self,
        session: &mut dyn PeerSession,
        deadline: Instant,
    ) -> Result<CandidateSet, DiscoveryError> {
        session
            .create_data_channel(&self.config.data_channel_label)
            .map_err(|e| DiscoveryError::OfferFailed(e.to_string()))?;

        let mut events = match timeout_at(deadline, session.create_offer()).await {
            Ok(Ok(events)) => events,
            Ok(Err(e)) => {
                debug!(error = %e, "Offer creation failed");
                return Err(DiscoveryError::OfferFailed(e.to_string()));
            }
            Err(_) => {
                debug!("Timed out creating offer");
                return Ok(CandidateSet::new());
            }
        };

        let mut candidates = CandidateSet::new();
        if timeout_at(deadline, collect(&mut events, &mut candidates))
            .await
            .is_err()
        {
            debug!(retained = candidates.len(), "Candidate gathering timed out");
        }
        Ok(candidates)
    }
}

/// Fold events into the set until gathering completes.
async fn collect(events: &mut mpsc::Receiver<CandidateEvent>, candidates: &mut CandidateSet) {
    while let Some(event) = events.recv().await {
        match event {
            CandidateEvent::Candidate(line) if line.is_empty() => break,
            CandidateEvent::Candidate(line) => {
                if candidates.observe(&line) {
                    debug!(candidate = %line, "Retained reflexive candidate");
                }
            }
            CandidateEvent::EndOfCandidates => break,
        }
    }
}

#[async_trait]
impl AddressDiscoveryApi for AddressDiscovery {
    async fn discover(&self) -> Result<ReflexiveAddress, DiscoveryError> {
        AddressDiscovery::discover(self).await
    }
}

/// A discovery running in the background.
#[derive(Debug)]
pub struct DiscoveryHandle {
    task: JoinHandle<Result<ReflexiveAddress, DiscoveryError>>,
}

impl DiscoveryHandle {
    /// Await the result. An aborted discovery yields
    /// [`DiscoveryError::Cancelled`].
    pub async fn wait(self) -> Result<ReflexiveAddress, DiscoveryError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(DiscoveryError::Cancelled),
            Err(e) => Err(DiscoveryError::OfferFailed(e.to_string())),
        }
    }

    /// Cancel the discovery; its session is dropped and released.
    pub fn abort(&self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedConnector;
    use std::time::Duration;

    const SRFLX_A: &str = "candidate:2 1 udp 1694498815 203.0.113.7 40000 typ srflx raddr 10.0.0.2 rport 40000";
    const SRFLX_B: &str = "candidate:3 1 udp 1694498815 198.51.100.2 40001 typ srflx raddr 10.0.0.3 rport 40001";
    const HOST: &str = "candidate:1 1 udp 2130706431 10.0.0.2 40000 typ host";

    fn discovery(connector: &ScriptedConnector) -> AddressDiscovery {
        AddressDiscovery::new(Arc::new(connector.clone()), DiscoveryConfig::default())
    }

    #[tokio::test]
    async fn test_unsupported_skips_negotiation() {
        let connector = ScriptedConnector::unavailable();
        let result = discovery(&connector).discover().await;
        assert_eq!(result, Err(DiscoveryError::Unsupported));
        assert_eq!(connector.sessions_opened(), 0);
    }

    #[tokio::test]
    async fn test_first_srflx_wins() {
        let connector = ScriptedConnector::new()
            .with_candidates([HOST, SRFLX_A, SRFLX_B])
            .with_event(CandidateEvent::EndOfCandidates);
        let address = discovery(&connector).discover().await.unwrap();
        assert_eq!(address.as_str(), "203.0.113.7");
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_host_only_is_blocked() {
        let connector = ScriptedConnector::new()
            .with_candidates([HOST])
            .with_event(CandidateEvent::EndOfCandidates);
        assert_eq!(
            discovery(&connector).discover().await,
            Err(DiscoveryError::BlockedOrUnavailable)
        );
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_empty_candidate_ends_gathering() {
        let connector = ScriptedConnector::new()
            .with_candidates([HOST, "", SRFLX_A])
            .holding_open();
        assert_eq!(
            discovery(&connector).discover().await,
            Err(DiscoveryError::BlockedOrUnavailable)
        );
    }

    #[tokio::test]
    async fn test_offer_failure_is_terminal() {
        let connector = ScriptedConnector::new()
            .with_candidates([SRFLX_A])
            .with_offer_error("no codecs");
        let result = discovery(&connector).discover().await;
        assert!(matches!(result, Err(DiscoveryError::OfferFailed(ref r)) if r.contains("no codecs")));
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_open_failure_reported_as_offer_failure() {
        let connector = ScriptedConnector::new().with_open_error("bind denied");
        let result = discovery(&connector).discover().await;
        assert!(matches!(result, Err(DiscoveryError::OfferFailed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolves_at_timeout_without_events() {
        let connector = ScriptedConnector::new().holding_open();
        let started = Instant::now();
        let result = discovery(&connector).discover().await;
        assert_eq!(result, Err(DiscoveryError::BlockedOrUnavailable));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(7) && elapsed < Duration::from_secs(8));
        assert_eq!(connector.sessions_closed(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_open_resolves_at_timeout() {
        let connector = ScriptedConnector::new()
            .with_candidates([SRFLX_A])
            .with_open_delay(Duration::from_secs(60));
        let started = Instant::now();
        let result = discovery(&connector).discover().await;
        assert_eq!(result, Err(DiscoveryError::BlockedOrUnavailable));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(7) && elapsed < Duration::from_secs(8));
        assert_eq!(connector.sessions_opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_keeps_already_retained_address() {
        let connector = ScriptedConnector::new()
            .with_candidates([SRFLX_B])
            .holding_open();
        let address = discovery(&connector).discover().await.unwrap();
        assert_eq!(address.as_str(), "198.51.100.2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_cancels_handle() {
        let connector = ScriptedConnector::new().holding_open();
        let handle = discovery(&connector).spawn();
        tokio::task::yield_now().await;
        handle.abort();
        assert_eq!(handle.wait().await, Err(DiscoveryError::Cancelled));
    }

    #[tokio::test]
    async fn test_spawned_discovery_resolves() {
        let connector = ScriptedConnector::new()
            .with_candidates([SRFLX_A])
            .with_event(CandidateEvent::EndOfCandidates);
        let handle = discovery(&connector).spawn();
        assert_eq!(handle.wait().await.unwrap().as_str(), "203.0.113.7");
    }

    #[cfg(feature = "network")]
    #[tokio::test]
    async fn test_stun_discovery_against_loopback_responder() {
        let responder = crate::testing::StunResponder::spawn().await.unwrap();
        let connector = crate::adapters::StunPeerConnector::new()
            .with_bind_addr("127.0.0.1:0".parse().unwrap());
        let config = DiscoveryConfig::default()
            .with_server(responder.server())
            .with_initial_rto(Duration::from_millis(100));
        let discovery = AddressDiscovery::new(Arc::new(connector), config);

        let address = discovery.discover().await.unwrap();
        assert_eq!(address.as_str(), "127.0.0.1");
    }
}
