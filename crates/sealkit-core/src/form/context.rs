use std::net::IpAddr;

use chrono::Utc;

/// The request a form is being signed for or verified against.
///
/// Signing and verification read the clock and the client address through
/// this trait instead of ambient globals.
pub trait RequestContext {
    /// Current time in Unix seconds.
    fn now(&self) -> i64;

    /// Address of the client that made the request.
    fn remote_addr(&self) -> IpAddr;
}

/// A live request: the system clock and a known client address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemRequest {
    remote_addr: IpAddr,
}

impl SystemRequest {
    pub fn new(remote_addr: IpAddr) -> Self {
        Self { remote_addr }
    }
}

impl RequestContext for SystemRequest {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn remote_addr(&self) -> IpAddr {
        self.remote_addr
    }
}

/// A request with a pinned clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRequest {
    pub now: i64,
    pub remote_addr: IpAddr,
}

impl FixedRequest {
    pub fn new(now: i64, remote_addr: IpAddr) -> Self {
        Self { now, remote_addr }
    }

    /// Same client, different time.
    pub fn at(self, now: i64) -> Self {
        Self { now, ..self }
    }

    /// Same time, different client.
    pub fn from_addr(self, remote_addr: IpAddr) -> Self {
        Self {
            remote_addr,
            ..self
        }
    }
}

impl RequestContext for FixedRequest {
    fn now(&self) -> i64 {
        self.now
    }

    fn remote_addr(&self) -> IpAddr {
        self.remote_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_fixed_request() {
        let request = FixedRequest::new(100, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(request.now(), 100);
        assert_eq!(request.at(200).now(), 200);

        let moved = request.from_addr("10.0.0.1".parse().unwrap());
        assert_eq!(moved.remote_addr().to_string(), "10.0.0.1");
        assert_eq!(moved.now(), 100);
    }

    #[test]
    fn test_system_request_uses_clock() {
        let request = SystemRequest::new(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let before = Utc::now().timestamp();
        let now = request.now();
        assert!(now >= before);
        assert!(now - before < 5);
    }
}
