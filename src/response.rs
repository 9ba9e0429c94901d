/// Value of the `Server` response header.
pub const SERVER_NAME: &str = "spinserv";

fn reason_phrase(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// A plain-text response.
///
/// Handlers build one of these; the connection serializes it once and then
/// writes the bytes out incrementally.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    code: u16,
    body: String,
}
impl Response {
    #[must_use]
    pub fn new(code: u16) -> Self {
        Self {
            code,
            body: String::new(),
        }
    }

    #[must_use]
    pub fn text(code: u16, body: impl Into<String>) -> Self {
        Self {
            code,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn not_found_404() -> Self {
        Self::new(404)
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Serializes to the wire format, ready to write to the socket.
    ///
    /// `date_line` is the complete `Date: ...` line from
    /// [`DateClock::current`](crate::DateClock::current).
    #[must_use]
    pub fn serialize(&self, date_line: &str) -> Vec<u8> {
        format!(
            "HTTP/1.1 {} {}\nServer: {}\n{}\nContent-Length: {}\nContent-Type: text/plain\nConnection: close\n\n{}",
            self.code,
            reason_phrase(self.code),
            SERVER_NAME,
            date_line,
            self.body.len(),
            self.body
        )
        .into_bytes()
    }
}
