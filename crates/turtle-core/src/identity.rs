//! Network-derived actor identity.
//!
//! An actor is whoever sends from a given IPv4 address. The first
//! IPv4-shaped token of the proxy `X-Forwarded-For` header wins; without
//! one the socket peer address is used (IPv4-mapped IPv6 peers included).
//! Clients sharing a NAT or proxy collapse into one actor.

use std::net::{Ipv4Addr, SocketAddr};

use turtle_types::ActorId;

/// Failure to derive an identity from a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Neither the forwarded header nor the peer address held an IPv4
    /// address.
    #[error("no IPv4 address found in forwarded header or peer address")]
    NoIpv4,
}

/// Where a request came from, as seen by the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    /// Raw value of the `X-Forwarded-For` header, if any.
    pub forwarded_for: Option<String>,
    /// Socket peer address, if the transport exposes it.
    pub peer: Option<SocketAddr>,
}

impl RequestOrigin {
    /// Resolve the actor identity for this origin.
    pub fn resolve(&self) -> Result<ActorId, IdentityError> {
        self.forwarded_for
            .as_deref()
            .and_then(first_ipv4_token)
            .or_else(|| self.peer.and_then(peer_ipv4))
            .map(ActorId::from)
            .ok_or(IdentityError::NoIpv4)
    }
}

/// Find the first dotted-quad IPv4 address in `text`.
pub fn first_ipv4_token(text: &str) -> Option<Ipv4Addr> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|token| !token.is_empty())
        .find_map(|token| token.parse::<Ipv4Addr>().ok())
}

/// The IPv4 form of a peer address, unwrapping IPv4-mapped IPv6.
fn peer_ipv4(peer: SocketAddr) -> Option<Ipv4Addr> {
    match peer {
        SocketAddr::V4(addr) => Some(*addr.ip()),
        SocketAddr::V6(addr) => addr.ip().to_ipv4_mapped(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn first_token_of_forwarded_chain_wins() {
        let origin = RequestOrigin {
            forwarded_for: Some("203.0.113.7, 10.0.0.1".to_owned()),
            peer: Some("127.0.0.1:5000".parse().unwrap()),
        };
        assert_eq!(origin.resolve().unwrap().as_str(), "203.0.113.7");
    }

    #[test]
    fn ipv6_only_header_falls_back_to_peer() {
        let origin = RequestOrigin {
            forwarded_for: Some("2001:db8::1".to_owned()),
            peer: Some("192.168.1.20:40000".parse().unwrap()),
        };
        assert_eq!(origin.resolve().unwrap().as_str(), "192.168.1.20");
    }

    #[test]
    fn mapped_ipv6_peer_is_unwrapped() {
        let origin = RequestOrigin {
            forwarded_for: None,
            peer: Some("[::ffff:10.1.2.3]:8008".parse().unwrap()),
        };
        assert_eq!(origin.resolve().unwrap().as_str(), "10.1.2.3");
    }

    #[test]
    fn pure_ipv6_peer_is_unresolvable() {
        let origin = RequestOrigin {
            forwarded_for: None,
            peer: Some("[2001:db8::2]:8008".parse().unwrap()),
        };
        assert_eq!(origin.resolve(), Err(IdentityError::NoIpv4));
    }

    #[test]
    fn no_origin_is_unresolvable() {
        assert_eq!(RequestOrigin::default().resolve(), Err(IdentityError::NoIpv4));
    }

    #[test]
    fn token_scan_skips_garbage() {
        assert_eq!(first_ipv4_token("unknown"), None);
        assert_eq!(first_ipv4_token("999.1.1.1"), None);
        assert_eq!(
            first_ipv4_token("for=\"1.2.3.4:80\""),
            Some(Ipv4Addr::new(1, 2, 3, 4))
        );
    }
}
