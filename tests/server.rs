
use crate::test_util::{TestServer, assert_ends_with, assert_starts_with, read_to_string};
use spinserv::{Response, ServerBuilder};
use std::io::Write;
use std::time::Duration;

const PLAINTEXT_REQUEST: &[u8] = b"GET /plaintext HTTP/1.1\r\n\r\n";

#[test]
fn plaintext() {
    let server = TestServer::start_plaintext(2).unwrap();
    let response = server.exchange(PLAINTEXT_REQUEST).unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK\nServer: spinserv\nDate: ");
    assert!(response.contains("\nContent-Length: 13\n"), "{response:?}");
    assert!(response.contains("\nContent-Type: text/plain\n"), "{response:?}");
    assert!(response.contains("\nConnection: close\n"), "{response:?}");
    assert_ends_with(&response, "\n\nHello, world!");
}

#[test]
fn split_delivery() {
    let server = TestServer::start_plaintext(2).unwrap();
    let mut tcp_stream = server.connect().unwrap();
    tcp_stream.write_all(b"GET /pla").unwrap();
    std::thread::sleep(Duration::from_millis(100));
    tcp_stream.write_all(b"intext HTTP/1.1\r\n\r\n").unwrap();
    let response = read_to_string(&mut tcp_stream).unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK\n");
    assert!(response.contains("\nContent-Length: 13\n"), "{response:?}");
    assert_ends_with(&response, "\n\nHello, world!");
}

#[test]
fn single_byte_delivery() {
    let server = TestServer::start_plaintext(2).unwrap();
    let mut tcp_stream = server.connect().unwrap();
    for byte in PLAINTEXT_REQUEST {
        tcp_stream.write_all(&[*byte]).unwrap();
    }
    let response = read_to_string(&mut tcp_stream).unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK\n");
    assert_ends_with(&response, "\n\nHello, world!");
}

#[test]
fn not_found() {
    let server = TestServer::start_plaintext(2).unwrap();
    let response = server.exchange(b"GET /missing HTTP/1.1\r\n\r\n").unwrap();
    assert_starts_with(&response, "HTTP/1.1 404 Not Found\n");
    assert!(response.contains("\nContent-Length: 0\n"), "{response:?}");
    assert_ends_with(&response, "\n\n");
}

#[test]
fn date_header_is_rfc1123() {
    let server = TestServer::start_plaintext(1).unwrap();
    let response = server.exchange(PLAINTEXT_REQUEST).unwrap();
    let date_line = response
        .lines()
        .find(|line| line.starts_with("Date: "))
        .unwrap();
    // "Date: Thu, 01 Jan 1970 00:00:00 GMT"
    assert_eq!(6 + 29, date_line.len(), "{date_line:?}");
    assert_ends_with(date_line, " GMT");
    let day = &date_line[6..9];
    assert!(
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"].contains(&day),
        "{date_line:?}"
    );
}

#[test]
fn first_registered_route_wins() {
    let server = TestServer::start(
        ServerBuilder::new()
            .num_workers(1)
            .route("GET /a", |_req| Response::text(200, "first"))
            .route("GET /a", |_req| Response::text(200, "second")),
    )
    .unwrap();
    let response = server.exchange(b"GET /a HTTP/1.1\r\n\r\n").unwrap();
    assert_ends_with(&response, "\n\nfirst");
}

#[test]
fn many_connections_across_workers() {
    let server = TestServer::start_plaintext(8).unwrap();
    let mut join_handles = Vec::new();
    for n in 0..100 {
        let addr = server.addr;
        join_handles.push(std::thread::spawn(move || {
            let mut tcp_stream =
                std::net::TcpStream::connect_timeout(&addr, Duration::from_secs(5))
                    .unwrap_or_else(|e| panic!("conn {n}: {e}"));
            tcp_stream.write_all(PLAINTEXT_REQUEST).unwrap();
            let response = read_to_string(&mut tcp_stream).unwrap();
            assert!(
                response.starts_with("HTTP/1.1 200 OK\n"),
                "conn {n}: {response:?}"
            );
            assert!(
                response.ends_with("\n\nHello, world!"),
                "conn {n}: {response:?}"
            );
        }));
    }
    for join_handle in join_handles {
        join_handle.join().unwrap();
    }
}

#[test]
fn server_shuts_down_when_permit_is_revoked() {
    let server = TestServer::start_plaintext(4).unwrap();
    let response = server.exchange(PLAINTEXT_REQUEST).unwrap();
    assert_starts_with(&response, "HTTP/1.1 200 OK\n");
    drop(server); // panics if the workers do not stop within 5 s
}

#[test]
fn bind_failure_is_startup_fatal() {
    let server = TestServer::start_plaintext(1).unwrap();
    let result = ServerBuilder::new().listen_addr(server.addr).spawn();
    assert!(result.is_err());
}
