//! # Native STUN Connector
//!
//! Implements the peer-session ports with a tokio UDP socket. Gathering is the
//! minimal ICE sequence for one UDP component:
//!
//! 1. emit a `host` candidate for the local interface address
//! 2. send a Binding Request to the rendezvous server, retransmitting with a
//!    timeout that starts at `initial_rto` and doubles, at most
//!    `max_transmissions` times
//! 3. on a matching Binding Success Response emit an `srflx` candidate
//! 4. emit end-of-candidates
//!
//! An unresolvable server or an unanswered request simply ends gathering
//! without a reflexive candidate.

use super::stun_codec::{decode_binding_response, encode_binding_request, new_transaction_id};
use crate::domain::{format_candidate, CandidateType, DiscoveryConfig, RendezvousServer};
use crate::ports::{CandidateEvent, NegotiationError, PeerConnector, PeerSession};
use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

const EVENT_BUFFER: usize = 8;
const RECV_BUFFER: usize = 1500;

/// Foundations only need to differ between candidate types here.
const HOST_FOUNDATION: u32 = 1;
const SRFLX_FOUNDATION: u32 = 2;

/// Opens [`StunPeerSession`]s on an ephemeral UDP port.
#[derive(Debug, Clone)]
pub struct StunPeerConnector {
    bind_addr: SocketAddr,
}

impl Default for StunPeerConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl StunPeerConnector {
    /// Connector binding the IPv4 wildcard address.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        }
    }

    /// Builder-style method to set the local bind address.
    #[must_use]
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }
}

#[async_trait]
impl PeerConnector for StunPeerConnector {
    fn is_available(&self) -> bool {
        std::net::UdpSocket::bind(self.bind_addr).is_ok()
    }

    async fn open(
        &self,
        config: &DiscoveryConfig,
    ) -> Result<Box<dyn PeerSession>, NegotiationError> {
        let socket = UdpSocket::bind(self.bind_addr)
            .await
            .map_err(|e| NegotiationError::Transport(e.to_string()))?;
        debug!(local = ?socket.local_addr().ok(), server = %config.server, "Opened STUN session");

        Ok(Box::new(StunPeerSession {
            socket: Some(socket),
            server: config.server.clone(),
            initial_rto: config.initial_rto,
            max_transmissions: config.max_transmissions,
            has_data_channel: false,
            gatherer: None,
        }))
    }
}

/// A single-use gathering session.
pub struct StunPeerSession {
    socket: Option<UdpSocket>,
    server: RendezvousServer,
    initial_rto: Duration,
    max_transmissions: u32,
    has_data_channel: bool,
    gatherer: Option<JoinHandle<()>>,
}

#[async_trait]
impl PeerSession for StunPeerSession {
    fn create_data_channel(&mut self, label: &str) -> Result<(), NegotiationError> {
        if self.socket.is_none() {
            return Err(NegotiationError::Closed);
        }
        trace!(label, "Data channel created");
        self.has_data_channel = true;
        Ok(())
    }

    async fn create_offer(&mut self) -> Result<mpsc::Receiver<CandidateEvent>, NegotiationError> {
        let socket = self.socket.take().ok_or(NegotiationError::Closed)?;
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        if !self.has_data_channel {
            // Nothing to negotiate: gathering completes immediately.
            let _ = tx.try_send(CandidateEvent::EndOfCandidates);
            return Ok(rx);
        }

        let gatherer = Gatherer {
            socket,
            server: self.server.clone(),
            initial_rto: self.initial_rto,
            max_transmissions: self.max_transmissions,
            events: tx,
        };
        self.gatherer = Some(tokio::spawn(gatherer.run()));
        Ok(rx)
    }

    fn close(&mut self) {
        self.socket = None;
        if let Some(task) = self.gatherer.take() {
            task.abort();
        }
    }
}

impl Drop for StunPeerSession {
    fn drop(&mut self) {
        self.close();
    }
}

struct Gatherer {
    socket: UdpSocket,
    server: RendezvousServer,
    initial_rto: Duration,
    max_transmissions: u32,
    events: mpsc::Sender<CandidateEvent>,
}

impl Gatherer {
    async fn run(self) {
        let server_addr = self.resolve_server().await;

        if let Some(base) = self.host_address(server_addr).await {
            let line = format_candidate(HOST_FOUNDATION, CandidateType::Host, base, None);
            if self.events.send(CandidateEvent::Candidate(line)).await.is_err() {
                return;
            }
        }

        if let Some(server_addr) = server_addr {
            if let Some(mapped) = self.binding_transaction(server_addr).await {
                let base = self.socket.local_addr().ok();
                let line =
                    format_candidate(SRFLX_FOUNDATION, CandidateType::ServerReflexive, mapped, base);
                if self.events.send(CandidateEvent::Candidate(line)).await.is_err() {
                    return;
                }
            }
        }

        let _ = self.events.send(CandidateEvent::EndOfCandidates).await;
    }

    /// First resolved address in the socket's family.
    async fn resolve_server(&self) -> Option<SocketAddr> {
        let want_v4 = self.socket.local_addr().map(|a| a.is_ipv4()).unwrap_or(true);
        match tokio::net::lookup_host((self.server.host.as_str(), self.server.port)).await {
            Ok(mut addrs) => {
                let addr = addrs.find(|a| a.is_ipv4() == want_v4);
                if addr.is_none() {
                    debug!(server = %self.server, "Rendezvous server has no address in socket family");
                }
                addr
            }
            Err(e) => {
                debug!(server = %self.server, error = %e, "Rendezvous server did not resolve");
                None
            }
        }
    }

    /// Local address to advertise. A wildcard bind is replaced by the
    /// interface address the OS would route the server through.
    async fn host_address(&self, route_to: Option<SocketAddr>) -> Option<SocketAddr> {
        let local = self.socket.local_addr().ok()?;
        if !local.ip().is_unspecified() {
            return Some(local);
        }
        let target = route_to?;
        let probe = UdpSocket::bind(SocketAddr::new(local.ip(), 0)).await.ok()?;
        probe.connect(target).await.ok()?;
        let routed = probe.local_addr().ok()?;
        Some(SocketAddr::new(routed.ip(), local.port()))
    }

    /// Send Binding Requests until a matching success response arrives or
    /// the transmissions run out.
    async fn binding_transaction(&self, server_addr: SocketAddr) -> Option<SocketAddr> {
        let txn = new_transaction_id();
        let request = encode_binding_request(&txn);
        let mut rto = self.initial_rto;
        let mut buf = [0u8; RECV_BUFFER];

        for attempt in 1..=self.max_transmissions {
            if let Err(e) = self.socket.send_to(&request, server_addr).await {
                debug!(error = %e, "Binding request send failed");
                return None;
            }
            trace!(attempt, rto_ms = rto.as_millis() as u64, "Binding request sent");

            let wait = async {
                loop {
                    let (len, from) = self.socket.recv_from(&mut buf).await.ok()?;
                    if from != server_addr {
                        continue;
                    }
                    match decode_binding_response(&buf[..len]) {
                        Ok(response) if response.transaction_id == txn => {
                            return Some(response.mapped_address)
                        }
                        Ok(_) => trace!("Ignoring response for another transaction"),
                        Err(e) => trace!(error = %e, "Ignoring undecodable datagram"),
                    }
                }
            };

            if let Ok(result) = tokio::time::timeout(rto, wait).await {
                return result;
            }
            rto *= 2;
        }

        debug!(server = %server_addr, "Binding request unanswered");
        None
    }
}
