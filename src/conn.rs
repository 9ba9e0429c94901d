use crate::clock::DateClock;
use crate::response::Response;
use crate::router::{RouteResult, Router};
use fixed_buffer::FixedBuf;
use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

/// Capacity of the per-connection read buffer.
/// A request line longer than this closes the connection.
pub const READ_BUF_LEN: usize = 1024;

/// A socket that a [`Connection`] can drive without blocking.
///
/// Implementations must return [`ErrorKind::WouldBlock`] instead of
/// suspending the calling thread.  Implemented for non-blocking
/// [`TcpStream`].  Tests implement it with scripted fakes.
pub trait Transport: Read + Write {
    /// Tries to finalize connection establishment.
    ///
    /// Returns `Ok(true)` once the socket is connected and `Ok(false)`
    /// when it is not connected yet; the caller retries on its next poll.
    ///
    /// # Errors
    /// Returns an error when the connection cannot be established.
    fn finish_connect(&mut self) -> Result<bool, std::io::Error>;
}
impl Transport for TcpStream {
    fn finish_connect(&mut self) -> Result<bool, std::io::Error> {
        // Sockets from `TcpListener::accept` are already connected, so
        // this passes on the first poll.
        match self.peer_addr() {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(false),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Lifecycle phase of a [`Connection`].  Transitions only move forward,
/// except that `Reading` and `Writing` repeat while waiting for the socket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Connecting,
    Reading,
    Routing,
    Writing,
    Closed,
}

/// A resumable per-socket state machine.
///
/// Exactly one worker owns a connection; no locking.  Each
/// [`advance`](Connection::advance) call performs at most one read or
/// write attempt so that one connection cannot monopolize a worker pass.
/// Every I/O fault except would-block closes only this connection.
pub struct Connection<T: Transport = TcpStream> {
    transport: T,
    buf: FixedBuf<READ_BUF_LEN>,
    response: Vec<u8>,
    num_written: usize,
    phase: Phase,
}
impl<T: Transport> Connection<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            buf: FixedBuf::new(),
            response: Vec::new(),
            num_written: 0,
            phase: Phase::Connecting,
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advances the state machine one step.  Never blocks.
    pub fn advance(&mut self, router: &Router, clock: &DateClock) {
        match self.phase {
            Phase::Connecting => self.finish_connecting(),
            Phase::Reading => self.read_request(router, clock),
            Phase::Routing => {
                // Bookkeeping only, no syscall this poll.
                self.num_written = 0;
                self.phase = Phase::Writing;
            }
            Phase::Writing => self.write_response(),
            Phase::Closed => {}
        }
    }

    fn close(&mut self) {
        // The socket closes when the worker drops this connection.
        self.phase = Phase::Closed;
    }

    fn finish_connecting(&mut self) {
        match self.transport.finish_connect() {
            Ok(true) => self.phase = Phase::Reading,
            Ok(false) => {}
            Err(_) => self.close(),
        }
    }

    fn read_request(&mut self, router: &Router, clock: &DateClock) {
        if self.buf.writable().is_empty() {
            // The routing outcome was still inconclusive with the buffer
            // full, so this request can never complete.
            self.close();
            return;
        }
        match self.transport.read(self.buf.writable()) {
            // Peer closed before sending a complete request.
            Ok(0) => self.close(),
            Ok(num_read) => {
                self.buf.wrote(num_read);
                match router.route(self.buf.readable()) {
                    RouteResult::Incomplete => {}
                    RouteResult::NotFound => self.set_response(&Response::not_found_404(), clock),
                    RouteResult::Response(response) => self.set_response(&response, clock),
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(_) => self.close(),
        }
    }

    fn set_response(&mut self, response: &Response, clock: &DateClock) {
        self.response = response.serialize(&clock.current());
        self.phase = Phase::Routing;
    }

    fn write_response(&mut self) {
        match self.transport.write(&self.response[self.num_written..]) {
            Ok(0) => self.close(),
            Ok(num_written) => {
                self.num_written += num_written;
                if self.num_written == self.response.len() {
                    self.close();
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(_) => self.close(),
        }
    }
}
