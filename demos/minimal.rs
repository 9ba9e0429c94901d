//! Minimal Server Example
//! =================
//!
//! Start the server:
//! ```
//! $ cargo run --package spinserv --example minimal
//!     Finished dev [unoptimized + debuginfo] target(s) in 0.04s
//!      Running `target/debug/examples/minimal`
//! ^C
//! ```
//!
//! Make a request to it:
//! ```
//! $ curl http://127.0.0.1:8000/plaintext
//! Hello, world!
//! ```
#![forbid(unsafe_code)]
use spinserv::{Response, ServerBuilder, socket_addr_127_0_0_1};

pub fn main() {
    let (addr, stopped_receiver) = ServerBuilder::new()
        .listen_addr(socket_addr_127_0_0_1(8000))
        .route("GET /plaintext", |_req| Response::text(200, "Hello, world!"))
        .spawn()
        .unwrap();
    println!("INFO listening on {addr}");
    let _ignored = stopped_receiver.recv();
}
