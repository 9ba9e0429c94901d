//! spinserv
//! ========
//! [![crates.io version](https://img.shields.io/crates/v/spinserv.svg)](https://crates.io/crates/spinserv)
//! [![license: Apache 2.0](https://raw.githubusercontent.com/mleonhard/spinserv/main/license-apache-2.0.svg)](http://www.apache.org/licenses/LICENSE-2.0)
//! [![unsafe forbidden](https://raw.githubusercontent.com/mleonhard/spinserv/main/unsafe-forbidden-success.svg)](https://github.com/rust-secure-code/safety-dance/)
//!
//! A minimal non-blocking TCP request/response server in Rust.
//!
//! Worker threads poll non-blocking sockets in a tight loop.  Each
//! connection is a small resumable state machine that a worker advances
//! one step at a time.  Requests are matched by comparing the buffer's
//! leading bytes against an ordered table of route prefixes, which works
//! correctly even when only part of the request has arrived.
//!
//! # Features
//! - `forbid(unsafe_code)`
//! - Fixed pool of worker threads, each owning its connections exclusively:
//!   no cross-worker locking
//! - Byte-prefix routing over partially-received input
//! - One read or write attempt per connection per pass, bounding tail
//!   latency for connections sharing a worker
//! - `Date` header refreshed once per second by a shared clock
//! - Graceful shutdown with [`permit`]
//!
//! # Limitations
//! - No keep-alive connections; every response ends with `Connection: close`
//! - No header parsing beyond the request-line prefix
//! - No chunked transfer encoding, no TLS
//! - Routes are fixed once the server starts
//! - Workers busy-poll; integrating an OS readiness mechanism (epoll,
//!   kqueue) is the natural hardening step for idle efficiency
//!
//! # Example
//! ```rust
//! use permit::Permit;
//! use spinserv::{Response, ServerBuilder};
//!
//! let permit = Permit::new();
//! let (addr, stopped_receiver) = ServerBuilder::new()
//!     .route("GET /plaintext", |_req| Response::text(200, "Hello, world!"))
//!     .permit(permit.new_sub())
//!     .spawn()
//!     .unwrap();
//! # let _ = addr;
//! drop(permit); // Tell the server to shut down.
//! stopped_receiver.recv().unwrap(); // Wait for the workers to stop.
//! ```
#![forbid(unsafe_code)]
mod accept;
mod clock;
mod conn;
mod response;
mod router;
mod time;
mod worker;

pub use crate::accept::{
    AcceptResult, listen_non_blocking, socket_addr_127_0_0_1, socket_addr_127_0_0_1_any_port,
    socket_addr_all_interfaces,
};
pub use crate::clock::DateClock;
pub use crate::conn::{Connection, Phase, READ_BUF_LEN, Transport};
pub use crate::response::{Response, SERVER_NAME};
pub use crate::router::{RouteResult, Router};

use crate::worker::Worker;
use permit::Permit;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, sync_channel};

/// Builds a server.
pub struct ServerBuilder {
    listen_addr: SocketAddr,
    num_workers: usize,
    permit: Permit,
    router: Router,
}
impl ServerBuilder {
    /// Makes a new builder with these default settings:
    /// - Listens on 127.0.0.1
    /// - Picks a random port
    /// - 8 workers
    /// - no routes; every complete request gets `404 Not Found`
    #[allow(clippy::new_without_default)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            listen_addr: socket_addr_127_0_0_1_any_port(),
            num_workers: 8,
            permit: Permit::new(),
            router: Router::new(),
        }
    }

    #[must_use]
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Sets the number of worker threads.
    ///
    /// Each worker owns the connections it accepts, so more workers also
    /// means more sets of connections advancing concurrently.
    ///
    /// # Panics
    /// Panics when `n` is zero.
    #[must_use]
    pub fn num_workers(mut self, n: usize) -> Self {
        assert!(n > 0, "refusing to set num_workers to zero");
        self.num_workers = n;
        self
    }

    /// Sets the permit used by the server.
    ///
    /// Revoke the permit to make the server shut down.
    #[must_use]
    pub fn permit(mut self, p: Permit) -> Self {
        self.permit = p;
        self
    }

    /// Registers a route.  Registration order is match priority.
    ///
    /// The handler runs on a worker thread whenever a request's leading
    /// bytes equal `prefix` followed by a space.  It receives the request
    /// bytes received so far and returns the response.
    ///
    /// Do not register a prefix that is a prefix of another route's
    /// prefix; the matcher does not check for ambiguous registrations.
    #[must_use]
    pub fn route<F>(mut self, prefix: impl Into<Vec<u8>>, handler: F) -> Self
    where
        F: Fn(&[u8]) -> Response + Send + Sync + 'static,
    {
        self.router.add_route(prefix, handler);
        self
    }

    /// Binds the listening socket and starts the clock and worker threads.
    ///
    /// Returns `(addr, stopped_receiver)`.
    /// The server is listening on `addr`.
    /// After every worker has stopped, it sends a message on
    /// `stopped_receiver`.
    ///
    /// # Errors
    /// Returns an error when it fails to bind to the
    /// [`listen_addr`](ServerBuilder::listen_addr).  There is no recovery
    /// path from that; callers should abort startup.
    pub fn spawn(self) -> Result<(SocketAddr, Receiver<()>), std::io::Error> {
        let listener = listen_non_blocking(self.listen_addr)?;
        let addr = listener.local_addr()?;
        let clock = DateClock::start(self.permit.new_sub());
        let router = Arc::new(self.router);
        let mut handles = Vec::with_capacity(self.num_workers);
        for _ in 0..self.num_workers {
            let worker = Worker::new(
                listener.try_clone()?,
                Arc::clone(&router),
                clock.clone(),
                self.permit.new_sub(),
            );
            handles.push(std::thread::spawn(move || worker.run()));
        }
        let (sender, receiver) = sync_channel(1);
        let permit = self.permit;
        std::thread::spawn(move || {
            for handle in handles {
                let _ignored = handle.join();
            }
            drop(permit);
            let _ignored = sender.try_send(());
        });
        Ok((addr, receiver))
    }
}
