//! Test utilities for address discovery.
//!
//! Enable with the `test-utils` feature flag.
//!
//! - [`ScriptedConnector`]: replays a fixed list of candidate events
//! - [`StunResponder`]: in-process STUN server on loopback (`network` feature)

use crate::domain::DiscoveryConfig;
use crate::ports::{CandidateEvent, NegotiationError, PeerConnector, PeerSession};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Connector whose sessions replay scripted events.
#[derive(Debug, Clone)]
pub struct ScriptedConnector {
    available: bool,
    open_error: Option<String>,
    open_delay: Option<Duration>,
    offer_error: Option<String>,
    events: Vec<CandidateEvent>,
    hold_open: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl Default for ScriptedConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedConnector {
    #[must_use]
    pub fn new() -> Self {
        Self {
            available: true,
            open_error: None,
            open_delay: None,
            offer_error: None,
            events: Vec::new(),
            hold_open: false,
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A runtime without peer negotiation.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Replay these candidate lines, in order.
    #[must_use]
    pub fn with_candidates<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events
            .extend(lines.into_iter().map(|l| CandidateEvent::Candidate(l.into())));
        self
    }

    #[must_use]
    pub fn with_event(mut self, event: CandidateEvent) -> Self {
        self.events.push(event);
        self
    }

    #[must_use]
    pub fn with_open_error(mut self, reason: impl Into<String>) -> Self {
        self.open_error = Some(reason.into());
        self
    }

    /// Take this long to open each session.
    #[must_use]
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn with_offer_error(mut self, reason: impl Into<String>) -> Self {
        self.offer_error = Some(reason.into());
        self
    }

    /// Keep the event stream open after the script, so gathering never
    /// completes on its own.
    #[must_use]
    pub fn holding_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerConnector for ScriptedConnector {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn open(
        &self,
        _config: &DiscoveryConfig,
    ) -> Result<Box<dyn PeerSession>, NegotiationError> {
        if let Some(delay) = self.open_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.open_error {
            return Err(NegotiationError::Transport(reason.clone()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.clone(),
            data_channel: false,
            held: None,
            closed: false,
        }))
    }
}

struct ScriptedSession {
    script: ScriptedConnector,
    data_channel: bool,
    held: Option<mpsc::Sender<CandidateEvent>>,
    closed: bool,
}

#[async_trait]
impl PeerSession for ScriptedSession {
    fn create_data_channel(&mut self, _label: &str) -> Result<(), NegotiationError> {
        self.data_channel = true;
        Ok(())
    }

    async fn create_offer(&mut self) -> Result<mpsc::Receiver<CandidateEvent>, NegotiationError> {
        if let Some(reason) = &self.script.offer_error {
            return Err(NegotiationError::Offer(reason.clone()));
        }
        let (tx, rx) = mpsc::channel(self.script.events.len() + 1);
        if !self.data_channel {
            let _ = tx.try_send(CandidateEvent::EndOfCandidates);
            return Ok(rx);
        }
        for event in &self.script.events {
            let _ = tx.try_send(event.clone());
        }
        if self.script.hold_open {
            self.held = Some(tx);
        }
        Ok(rx)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.held = None;
            self.script.closed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(feature = "network")]
pub use responder::{ResponderScript, StunResponder, DECOY_MAPPED_ADDRESS};

#[cfg(feature = "network")]
mod responder {
    use crate::adapters::stun_codec::{
        decode_binding_request, encode_binding_success, new_transaction_id,
    };
    use crate::domain::RendezvousServer;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::net::UdpSocket;
    use tokio::task::JoinHandle;

    /// Mapped address carried by every decoy reply.
    pub const DECOY_MAPPED_ADDRESS: &str = "198.51.100.9:3478";

    /// How a [`StunResponder`] treats incoming Binding Requests.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ResponderScript {
        /// Requests silently dropped before the first answer.
        pub drop_first: usize,
        /// Before each real answer, send a success for another transaction
        /// and a matching success from a different source port, both
        /// carrying [`DECOY_MAPPED_ADDRESS`].
        pub decoy_replies: bool,
    }

    /// Loopback STUN server answering Binding Requests with the requester's
    /// own address.
    pub struct StunResponder {
        addr: SocketAddr,
        requests: Arc<AtomicUsize>,
        task: JoinHandle<()>,
    }

    impl StunResponder {
        /// Answer every request.
        pub async fn spawn() -> std::io::Result<Self> {
            Self::spawn_with(ResponderScript::default()).await
        }

        pub async fn spawn_with(script: ResponderScript) -> std::io::Result<Self> {
            let socket = UdpSocket::bind("127.0.0.1:0").await?;
            let stray = UdpSocket::bind("127.0.0.1:0").await?;
            let addr = socket.local_addr()?;
            let requests = Arc::new(AtomicUsize::new(0));
            let seen = Arc::clone(&requests);

            let task = tokio::spawn(async move {
                let decoy: SocketAddr = match DECOY_MAPPED_ADDRESS.parse() {
                    Ok(addr) => addr,
                    Err(_) => return,
                };
                let mut buf = [0u8; 1500];
                while let Ok((len, from)) = socket.recv_from(&mut buf).await {
                    let Ok(txn) = decode_binding_request(&buf[..len]) else {
                        continue;
                    };
                    if seen.fetch_add(1, Ordering::SeqCst) < script.drop_first {
                        continue;
                    }
                    if script.decoy_replies {
                        let other = encode_binding_success(&new_transaction_id(), decoy);
                        let _ = socket.send_to(&other, from).await;
                        let _ = stray.send_to(&encode_binding_success(&txn, decoy), from).await;
                    }
                    let _ = socket.send_to(&encode_binding_success(&txn, from), from).await;
                }
            });
            Ok(Self {
                addr,
                requests,
                task,
            })
        }

        pub fn addr(&self) -> SocketAddr {
            self.addr
        }

        pub fn server(&self) -> RendezvousServer {
            RendezvousServer::new(self.addr.ip().to_string(), self.addr.port())
        }

        /// Binding Requests received so far, dropped ones included.
        pub fn requests_seen(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl Drop for StunResponder {
        fn drop(&mut self) {
            self.task.abort();
        }
    }
}
