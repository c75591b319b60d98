//! # STUN Binding Codec (RFC 5389)
//!
//! Only what reflexive discovery needs: Binding Request encoding and Binding
//! Success Response decoding, with `XOR-MAPPED-ADDRESS` preferred over the
//! legacy `MAPPED-ADDRESS`.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |0 0|     STUN Message Type     |         Message Length        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                         Magic Cookie                          |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                     Transaction ID (96 bits)                  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use thiserror::Error;

pub const MAGIC_COOKIE: u32 = 0x2112_A442;
pub const HEADER_LEN: usize = 20;

const BINDING_REQUEST: u16 = 0x0001;
const BINDING_SUCCESS: u16 = 0x0101;
const ATTR_MAPPED_ADDRESS: u16 = 0x0001;
const ATTR_XOR_MAPPED_ADDRESS: u16 = 0x0020;
const FAMILY_IPV4: u8 = 0x01;
const FAMILY_IPV6: u8 = 0x02;

/// 96-bit transaction identifier.
pub type TransactionId = [u8; 12];

/// Decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StunError {
    #[error("message too short: {0} bytes")]
    TooShort(usize),

    #[error("not a STUN message")]
    NotStun,

    #[error("unexpected message type 0x{0:04x}")]
    UnexpectedType(u16),

    #[error("attribute overruns message")]
    Truncated,

    #[error("unsupported address family 0x{0:02x}")]
    UnsupportedFamily(u8),

    #[error("response carries no mapped address")]
    NoMappedAddress,
}

/// A decoded Binding Success Response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingResponse {
    pub transaction_id: TransactionId,
    pub mapped_address: SocketAddr,
}

/// Fresh random transaction id.
pub fn new_transaction_id() -> TransactionId {
    rand::random()
}

fn header(message_type: u16, body_len: usize, txn: &TransactionId) -> Vec<u8> {
    let mut msg = Vec::with_capacity(HEADER_LEN + body_len);
    msg.extend_from_slice(&message_type.to_be_bytes());
    msg.extend_from_slice(&(body_len as u16).to_be_bytes());
    msg.extend_from_slice(&MAGIC_COOKIE.to_be_bytes());
    msg.extend_from_slice(txn);
    msg
}

/// Binding Request with no attributes.
pub fn encode_binding_request(txn: &TransactionId) -> Vec<u8> {
    header(BINDING_REQUEST, 0, txn)
}

/// Binding Success Response carrying `XOR-MAPPED-ADDRESS`.
pub fn encode_binding_success(txn: &TransactionId, mapped: SocketAddr) -> Vec<u8> {
    let value = xor_address(mapped, txn);
    let mut msg = header(BINDING_SUCCESS, 4 + value.len(), txn);
    msg.extend_from_slice(&ATTR_XOR_MAPPED_ADDRESS.to_be_bytes());
    msg.extend_from_slice(&(value.len() as u16).to_be_bytes());
    msg.extend_from_slice(&value);
    msg
}

/// Validate a STUN header and return `(type, body length, transaction id)`.
fn decode_header(data: &[u8]) -> Result<(u16, usize, TransactionId), StunError> {
    if data.len() < HEADER_LEN {
        return Err(StunError::TooShort(data.len()));
    }
    // The two most significant bits of every STUN message are zero.
    if data[0] & 0xC0 != 0 {
        return Err(StunError::NotStun);
    }
    let cookie = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
    if cookie != MAGIC_COOKIE {
        return Err(StunError::NotStun);
    }

    let message_type = u16::from_be_bytes([data[0], data[1]]);
    let body_len = u16::from_be_bytes([data[2], data[3]]) as usize;
    if data.len() < HEADER_LEN + body_len {
        return Err(StunError::Truncated);
    }
    let mut txn = [0u8; 12];
    txn.copy_from_slice(&data[8..HEADER_LEN]);
    Ok((message_type, body_len, txn))
}

/// Transaction id of a Binding Request.
pub fn decode_binding_request(data: &[u8]) -> Result<TransactionId, StunError> {
    match decode_header(data)? {
        (BINDING_REQUEST, _, txn) => Ok(txn),
        (other, _, _) => Err(StunError::UnexpectedType(other)),
    }
}

/// Decode a Binding Success Response.
pub fn decode_binding_response(data: &[u8]) -> Result<BindingResponse, StunError> {
    let (message_type, body_len, txn) = decode_header(data)?;
    if message_type != BINDING_SUCCESS {
        return Err(StunError::UnexpectedType(message_type));
    }

    let end = HEADER_LEN + body_len;
    let mut pos = HEADER_LEN;
    let mut mapped = None;
    let mut xor_mapped = None;

    while pos + 4 <= end {
        let attr_type = u16::from_be_bytes([data[pos], data[pos + 1]]);
        let attr_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;
        if pos + attr_len > end {
            return Err(StunError::Truncated);
        }
        let value = &data[pos..pos + attr_len];

        match attr_type {
            ATTR_XOR_MAPPED_ADDRESS => xor_mapped = Some(parse_xor_address(value, &txn)?),
            ATTR_MAPPED_ADDRESS => mapped = Some(parse_address(value)?),
            _ => {}
        }
        // Attribute values are padded to a multiple of four bytes.
        pos += (attr_len + 3) & !3;
    }

    let mapped_address = xor_mapped.or(mapped).ok_or(StunError::NoMappedAddress)?;
    Ok(BindingResponse {
        transaction_id: txn,
        mapped_address,
    })
}

/// XOR mask for the address bytes: the cookie, then the transaction id.
fn xor_mask(txn: &TransactionId) -> [u8; 16] {
    let mut mask = [0u8; 16];
    mask[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    mask[4..].copy_from_slice(txn);
    mask
}

fn xor_address(addr: SocketAddr, txn: &TransactionId) -> Vec<u8> {
    let mask = xor_mask(txn);
    let port = addr.port() ^ (MAGIC_COOKIE >> 16) as u16;
    let (family, octets): (u8, Vec<u8>) = match addr.ip() {
        IpAddr::V4(ip) => (FAMILY_IPV4, ip.octets().to_vec()),
        IpAddr::V6(ip) => (FAMILY_IPV6, ip.octets().to_vec()),
    };

    let mut value = vec![0, family];
    value.extend_from_slice(&port.to_be_bytes());
    value.extend(octets.iter().zip(mask.iter()).map(|(b, m)| b ^ m));
    value
}

fn parse_address(value: &[u8]) -> Result<SocketAddr, StunError> {
    if value.len() < 8 {
        return Err(StunError::Truncated);
    }
    let port = u16::from_be_bytes([value[2], value[3]]);
    let ip = match value[1] {
        FAMILY_IPV4 => IpAddr::V4(Ipv4Addr::new(value[4], value[5], value[6], value[7])),
        FAMILY_IPV6 => {
            let octets: [u8; 16] = value
                .get(4..20)
                .and_then(|s| s.try_into().ok())
                .ok_or(StunError::Truncated)?;
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        family => return Err(StunError::UnsupportedFamily(family)),
    };
    Ok(SocketAddr::new(ip, port))
}

fn parse_xor_address(value: &[u8], txn: &TransactionId) -> Result<SocketAddr, StunError> {
    let masked = parse_address(value)?;
    let mask = xor_mask(txn);
    let port = masked.port() ^ (MAGIC_COOKIE >> 16) as u16;
    let ip = match masked.ip() {
        IpAddr::V4(ip) => {
            let mut octets = ip.octets();
            octets.iter_mut().zip(mask.iter()).for_each(|(b, m)| *b ^= m);
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        IpAddr::V6(ip) => {
            let mut octets = ip.octets();
            octets.iter_mut().zip(mask.iter()).for_each(|(b, m)| *b ^= m);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    };
    Ok(SocketAddr::new(ip, port))
}
