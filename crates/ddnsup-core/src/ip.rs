//! IPv4 parsing at the text boundaries
//!
//! Addresses arrive as text from two different services. They are always
//! parsed before comparison so that two spellings of the same address are
//! treated as equal.

use crate::error::{Error, Result};
use std::net::{IpAddr, Ipv4Addr};

/// Parse an IPv4 address from boundary text
///
/// Accepts, in addition to the canonical dotted quad:
/// - surrounding whitespace
/// - octets with superfluous leading zeros (read as decimal)
/// - IPv4-mapped IPv6 text such as `::ffff:1.2.3.4`
///
/// Anything else is a decode error.
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(Error::decode("empty IP address"));
    }

    match trimmed.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => return Ok(ip),
        Ok(IpAddr::V6(ip)) => {
            return ip
                .to_ipv4_mapped()
                .ok_or_else(|| Error::decode(format!("expected an IPv4 address, got: {}", ip)));
        }
        Err(_) => {}
    }

    parse_padded_quad(trimmed)
        .ok_or_else(|| Error::decode(format!("invalid IPv4 address: {:?}", trimmed)))
}

/// Dotted quad whose octets may carry leading zeros
fn parse_padded_quad(text: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');

    for octet in octets.iter_mut() {
        let part = parts.next()?;
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let significant = part.trim_start_matches('0');
        *octet = if significant.is_empty() {
            0
        } else {
            significant.parse().ok()?
        };
    }

    if parts.next().is_some() {
        return None;
    }

    Some(Ipv4Addr::from(octets))
}
