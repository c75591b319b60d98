//! # Candidate Descriptors
//!
//! Negotiation metadata arrives as SDP `candidate:` attribute lines:
//!
//! ```text
//! candidate:842163049 1 udp 1677729535 203.0.113.7 51734 typ srflx raddr 192.168.1.20 rport 51734
//!     1             2 3   4          5           6     7   8
//! ```
//!
//! Field 5 is the address and field 8 the candidate type. Only server
//! reflexive (`srflx`) candidates say anything about the NAT-external address,
//! so everything else is ignored.

use std::fmt;
use std::net::SocketAddr;

/// Type marker of a server reflexive candidate.
pub const REFLEXIVE_MARKER: &str = "srflx";

/// Zero-based position of the address field.
const ADDRESS_FIELD: usize = 4;
/// Zero-based position of the candidate type field.
const TYPE_FIELD: usize = 7;

/// RFC 8445 type preferences.
const HOST_TYPE_PREFERENCE: u32 = 126;
const SRFLX_TYPE_PREFERENCE: u32 = 100;
const LOCAL_PREFERENCE: u32 = 65_535;
const RTP_COMPONENT: u32 = 1;

/// ICE candidate classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateType {
    Host,
    ServerReflexive,
    PeerReflexive,
    Relay,
    Other,
}

impl CandidateType {
    pub fn parse(marker: &str) -> Self {
        match marker {
            "host" => Self::Host,
            REFLEXIVE_MARKER => Self::ServerReflexive,
            "prflx" => Self::PeerReflexive,
            "relay" => Self::Relay,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::ServerReflexive => REFLEXIVE_MARKER,
            Self::PeerReflexive => "prflx",
            Self::Relay => "relay",
            Self::Other => "unknown",
        }
    }

    fn type_preference(&self) -> u32 {
        match self {
            Self::Host => HOST_TYPE_PREFERENCE,
            Self::PeerReflexive => 110,
            Self::ServerReflexive => SRFLX_TYPE_PREFERENCE,
            Self::Relay | Self::Other => 0,
        }
    }
}

impl fmt::Display for CandidateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two fields of a descriptor that discovery cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateDescriptor<'a> {
    pub address: &'a str,
    pub kind: CandidateType,
}

impl<'a> CandidateDescriptor<'a> {
    /// Split on single spaces; `None` when field 8 is missing.
    ///
    /// Consecutive spaces yield empty fields rather than being collapsed, so a
    /// malformed line cannot shift a different token into the address slot.
    pub fn parse(line: &'a str) -> Option<Self> {
        let mut fields = line.split(' ');
        let address = fields.nth(ADDRESS_FIELD)?;
        let kind = fields.nth(TYPE_FIELD - ADDRESS_FIELD - 1)?;
        Some(Self {
            address,
            kind: CandidateType::parse(kind),
        })
    }
}

/// Address of a server reflexive descriptor, `None` for any other line.
pub fn reflexive_address(line: &str) -> Option<&str> {
    CandidateDescriptor::parse(line)
        .filter(|d| d.kind == CandidateType::ServerReflexive && !d.address.is_empty())
        .map(|d| d.address)
}

/// RFC 8445 section 5.1.2.1 priority for a single-component UDP candidate.
pub fn candidate_priority(kind: CandidateType) -> u32 {
    (kind.type_preference() << 24) + (LOCAL_PREFERENCE << 8) + (256 - RTP_COMPONENT)
}

/// Render a UDP candidate line in SDP attribute form.
pub fn format_candidate(
    foundation: u32,
    kind: CandidateType,
    address: SocketAddr,
    related: Option<SocketAddr>,
) -> String {
    let mut line = format!(
        "candidate:{foundation} {RTP_COMPONENT} udp {} {} {} typ {kind}",
        candidate_priority(kind),
        address.ip(),
        address.port(),
    );
    if let Some(base) = related {
        line.push_str(&format!(" raddr {} rport {}", base.ip(), base.port()));
    }
    line
}

/// Order-preserving set of retained addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    addresses: Vec<String>,
}

impl CandidateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the address was already present.
    pub fn insert(&mut self, address: &str) -> bool {
        if self.addresses.iter().any(|a| a == address) {
            return false;
        }
        self.addresses.push(address.to_string());
        true
    }

    /// Record the address of a descriptor line if it is server reflexive.
    pub fn observe(&mut self, line: &str) -> bool {
        match reflexive_address(line) {
            Some(address) => self.insert(address),
            None => false,
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.addresses.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.addresses.iter().map(String::as_str)
    }
}

/// An approximate public address harvested from a reflexive candidate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReflexiveAddress(String);

impl ReflexiveAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReflexiveAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
