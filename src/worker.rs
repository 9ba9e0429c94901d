use crate::accept::AcceptResult;
use crate::clock::DateClock;
use crate::conn::{Connection, Phase};
use crate::router::Router;
use permit::Permit;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

/// Pause between passes when the worker has nothing to do.
const IDLE_SLEEP: Duration = Duration::from_micros(500);
/// Back-off after running out of file descriptors; dropped connections
/// must finish before accepting can succeed again.
const EMFILE_BACKOFF: Duration = Duration::from_millis(10);

/// Drives a private set of connections to completion without ever
/// blocking on any single one.
///
/// Workers share the listening socket; the OS hands each waiting
/// connection to exactly one of the concurrent non-blocking accepts.
/// No worker ever touches another worker's connections, so there is no
/// cross-worker locking.  Load may spread unevenly; that is accepted.
pub(crate) struct Worker {
    listener: TcpListener,
    router: Arc<Router>,
    clock: DateClock,
    permit: Permit,
    connections: Vec<Connection>,
}
impl Worker {
    pub fn new(
        listener: TcpListener,
        router: Arc<Router>,
        clock: DateClock,
        permit: Permit,
    ) -> Self {
        Self {
            listener,
            router,
            clock,
            permit,
            connections: Vec::new(),
        }
    }

    /// Runs until the permit is revoked.  Open connections are dropped at
    /// that point.
    pub fn run(mut self) {
        while !self.permit.is_revoked() {
            let accepted = self.accept_connections();
            for conn in &mut self.connections {
                // `advance` contains every per-connection fault; one bad
                // socket cannot affect its siblings or this loop.
                conn.advance(&self.router, &self.clock);
            }
            self.connections.retain(|conn| conn.phase() != Phase::Closed);
            if !accepted && self.connections.is_empty() {
                std::thread::sleep(IDLE_SLEEP);
            }
        }
    }

    /// Drains the listener.  Returns true when it accepted anything.
    fn accept_connections(&mut self) -> bool {
        let mut accepted = false;
        loop {
            match AcceptResult::new(self.listener.accept()) {
                AcceptResult::Ok(stream, _addr) => {
                    if stream.set_nonblocking(true).is_ok() {
                        self.connections.push(Connection::new(stream));
                        accepted = true;
                    }
                }
                AcceptResult::WouldBlock => return accepted,
                AcceptResult::TooManyOpenFiles => {
                    std::thread::sleep(EMFILE_BACKOFF);
                    return accepted;
                }
                AcceptResult::Err(e) => {
                    eprintln!("ERROR accepting connection: {e}");
                    std::thread::sleep(EMFILE_BACKOFF);
                    return accepted;
                }
            }
        }
    }
}
