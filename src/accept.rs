use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};

#[must_use]
pub fn socket_addr_127_0_0_1_any_port() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
}

#[must_use]
pub fn socket_addr_127_0_0_1(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

#[must_use]
pub fn socket_addr_all_interfaces(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port)
}

/// Binds `addr` and puts the listener in non-blocking mode, so workers can
/// drain it with non-blocking accepts.
///
/// # Errors
/// Returns an error when we fail to bind to the address.
pub fn listen_non_blocking(addr: SocketAddr) -> Result<TcpListener, std::io::Error> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    Ok(listener)
}

/// Classified outcome of one non-blocking accept call.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum AcceptResult {
    Ok(TcpStream, SocketAddr),
    /// No connection is waiting.  The normal way a drain loop ends.
    WouldBlock,
    TooManyOpenFiles,
    Err(std::io::Error),
}
impl AcceptResult {
    #[must_use]
    pub fn new(res: Result<(TcpStream, SocketAddr), std::io::Error>) -> Self {
        match res {
            Ok((stream, addr)) => AcceptResult::Ok(stream, addr),
            Err(e) if e.kind() == ErrorKind::WouldBlock => AcceptResult::WouldBlock,
            // On Unix, std translates errno EMFILE (Too many open files) into
            // ErrorKind::Other (stable) or ErrorKind::Uncategorized (unstable).
            // The docs say that we shouldn't use either of these.
            // So we check for the POSIX errno EMFILE value: 24.
            Err(e) if e.raw_os_error() == Some(24) => AcceptResult::TooManyOpenFiles,
            Err(e) => AcceptResult::Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AcceptResult, listen_non_blocking, socket_addr_127_0_0_1_any_port};
    use std::io::ErrorKind;

    #[test]
    fn drained_listener_reports_would_block() {
        let listener = listen_non_blocking(socket_addr_127_0_0_1_any_port()).unwrap();
        assert!(matches!(
            AcceptResult::new(listener.accept()),
            AcceptResult::WouldBlock
        ));
    }

    #[test]
    fn bind_conflict_is_an_error() {
        let listener = listen_non_blocking(socket_addr_127_0_0_1_any_port()).unwrap();
        let addr = listener.local_addr().unwrap();
        assert!(listen_non_blocking(addr).is_err());
    }

    #[test]
    fn classify_errors() {
        assert!(matches!(
            AcceptResult::new(Err(std::io::Error::from_raw_os_error(24))),
            AcceptResult::TooManyOpenFiles
        ));
        assert!(matches!(
            AcceptResult::new(Err(std::io::Error::new(ErrorKind::WouldBlock, "wb"))),
            AcceptResult::WouldBlock
        ));
        assert!(matches!(
            AcceptResult::new(Err(std::io::Error::new(ErrorKind::ConnectionAborted, "ca"))),
            AcceptResult::Err(..)
        ));
    }
}
